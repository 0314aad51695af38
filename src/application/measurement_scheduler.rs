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

use crate::application::delivery_mode::DeliveryPath;
use crate::application::timer::{PeriodicTimer, TimerError, TimerMode};
use crate::config::ScaleConfig;
use embassy_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    Idle,
    ArmedIndication,
    ArmedAdvertising,
}

/// Owns the measurement timer. Arming for one path cancels whatever was armed before, so at most
/// one measurement cadence is ever live.
pub struct MeasurementScheduler {
    state: SchedulerState,
    timer: PeriodicTimer,
    indication_period: Duration,
    advertising_period: Duration,
}

impl MeasurementScheduler {
    pub fn new(config: &ScaleConfig) -> Self {
        Self {
            state: SchedulerState::Idle,
            timer: PeriodicTimer::new(),
            indication_period: config.indication_period,
            advertising_period: config.advertising_period,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn armed_path(&self) -> Option<DeliveryPath> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::ArmedIndication => Some(DeliveryPath::Notification),
            SchedulerState::ArmedAdvertising => Some(DeliveryPath::Advertisement),
        }
    }

    pub fn period_for(&self, path: DeliveryPath) -> Duration {
        match path {
            DeliveryPath::Notification => self.indication_period,
            DeliveryPath::Advertisement => self.advertising_period,
        }
    }

    /// Period of the live timer, `None` when idle.
    pub fn period(&self) -> Option<Duration> {
        self.timer.period()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// On failure the scheduler is left idle.
    pub fn arm(&mut self, path: DeliveryPath, now: Instant) -> Result<(), TimerError> {
        let period = self.period_for(path);
        if let Err(e) = self.timer.start(now, period, TimerMode::Periodic) {
            self.disarm();
            return Err(e);
        }
        self.state = match path {
            DeliveryPath::Notification => SchedulerState::ArmedIndication,
            DeliveryPath::Advertisement => SchedulerState::ArmedAdvertising,
        };
        Ok(())
    }

    pub fn disarm(&mut self) {
        self.timer.stop();
        self.state = SchedulerState::Idle;
    }

    /// The path to deliver on if the measurement timer expired.
    pub fn poll(&mut self, now: Instant) -> Option<DeliveryPath> {
        if self.timer.poll(now) {
            self.armed_path()
        } else {
            None
        }
    }
}
