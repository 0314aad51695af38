// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use embassy_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    OneShot,
    Periodic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// The first expiry is not representable.
    DeadlineOverflow,
}

/// A software timer owned by exactly one purpose. It never calls anything itself: the owner polls
/// it with the current time and acts when it reports an expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicTimer {
    period: Duration,
    mode: TimerMode,
    deadline: Option<Instant>,
}

impl Default for PeriodicTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodicTimer {
    pub const fn new() -> Self {
        Self {
            period: Duration::from_ticks(0),
            mode: TimerMode::OneShot,
            deadline: None,
        }
    }

    /// (Re)starts the timer. A running schedule is replaced, never stacked.
    pub fn start(&mut self, now: Instant, period: Duration, mode: TimerMode) -> Result<(), TimerError> {
        let deadline = now.checked_add(period).ok_or(TimerError::DeadlineOverflow)?;
        self.period = period;
        self.mode = mode;
        self.deadline = Some(deadline);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn period(&self) -> Option<Duration> {
        self.deadline.map(|_| self.period)
    }

    /// Reports at most one expiry per call. A periodic timer that fell behind by several periods
    /// skips the missed ticks and is rescheduled one period from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }

        self.deadline = match self.mode {
            TimerMode::OneShot => None,
            TimerMode::Periodic => match deadline.checked_add(self.period) {
                Some(next) if next > now => Some(next),
                _ => now.checked_add(self.period),
            },
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(2000), TimerMode::OneShot).unwrap();

        assert!(!timer.poll(at(1999)));
        assert!(timer.poll(at(2000)));
        assert!(!timer.is_running());
        assert!(!timer.poll(at(5000)));
    }

    #[test]
    fn periodic_keeps_its_cadence() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(1000), TimerMode::Periodic).unwrap();

        assert!(timer.poll(at(1000)));
        assert_eq!(timer.deadline(), Some(at(2000)));
        // late poll does not shift the cadence
        assert!(timer.poll(at(2300)));
        assert_eq!(timer.deadline(), Some(at(3000)));
    }

    #[test]
    fn periodic_skips_missed_ticks() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(1000), TimerMode::Periodic).unwrap();

        assert!(timer.poll(at(4500)));
        assert!(!timer.poll(at(4500)));
        assert_eq!(timer.deadline(), Some(at(5500)));
    }

    #[test]
    fn restart_replaces_schedule() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(10_000), TimerMode::Periodic).unwrap();
        timer.start(at(500), Duration::from_millis(1000), TimerMode::Periodic).unwrap();

        assert_eq!(timer.deadline(), Some(at(1500)));
        assert_eq!(timer.period(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(10), TimerMode::Periodic).unwrap();
        timer.stop();

        assert!(!timer.poll(at(1_000_000)));
        assert_eq!(timer.period(), None);
    }

    #[test]
    fn unrepresentable_deadline_fails_and_keeps_old_schedule() {
        let mut timer = PeriodicTimer::new();
        timer.start(at(0), Duration::from_millis(10), TimerMode::OneShot).unwrap();

        let result = timer.start(Instant::MAX, Duration::from_millis(1), TimerMode::OneShot);
        assert_eq!(result, Err(TimerError::DeadlineOverflow));
        assert_eq!(timer.deadline(), Some(at(10)));
    }
}
