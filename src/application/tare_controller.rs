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

use crate::application::timer::{PeriodicTimer, TimerError, TimerMode};
use embassy_time::{Duration, Instant};

/// Turns a tare request into a tare that runs after a fixed delay, giving the operator time to
/// clear the platter.
///
/// Owned by the main loop. Interrupt-side tare presses go through
/// [`InputLatch`](crate::hmi::input_latch::InputLatch) and are forwarded here when drained.
pub struct TareController {
    requested: bool,
    delay: Duration,
    timer: PeriodicTimer,
}

impl TareController {
    pub fn new(delay: Duration) -> Self {
        Self {
            requested: false,
            delay,
            timer: PeriodicTimer::new(),
        }
    }

    /// Requests that arrive before the next `process` collapse into one.
    pub fn request_tare(&mut self) {
        self.requested = true;
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// A delayed tare is armed.
    pub fn is_pending(&self) -> bool {
        self.timer.is_running()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Main-loop step. Consumes a request by (re)starting the delay. If the delay cannot be
    /// started the request stays latched for the next cycle.
    pub fn process(&mut self, now: Instant) -> Result<bool, TimerError> {
        if !core::mem::take(&mut self.requested) {
            return Ok(false);
        }

        match self.timer.start(now, self.delay, TimerMode::OneShot) {
            Ok(()) => {
                debug!("Tare in {} ms", self.delay.as_millis());
                Ok(true)
            }
            Err(e) => {
                self.requested = true;
                Err(e)
            }
        }
    }

    /// True once, when the delay has run out and the tare should be performed.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.timer.poll(now)
    }
}
