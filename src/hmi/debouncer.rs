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

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{ErrorType, InputPin, PinState};
use embedded_hal_async::digital::Wait;

pub type PinError<P> = <P as ErrorType>::Error;

/// Edge-triggered input that only reports a level once it has held for the debounce time.
pub struct Debouncer<P> {
    input: P,
    debounce_time: Duration,
}

impl<P> Debouncer<P>
where
    P: Wait + InputPin,
{
    pub fn new(input: P, debounce: Duration) -> Self {
        Self {
            input,
            debounce_time: debounce,
        }
    }

    fn level(&mut self) -> Result<PinState, PinError<P>> {
        Ok(PinState::from(self.input.is_high()?))
    }

    /// Waits until the input has been quiet for the debounce time and returns its level.
    pub async fn debounce(&mut self) -> Result<PinState, PinError<P>> {
        loop {
            let io_changed = select(self.input.wait_for_any_edge(), Timer::after(self.debounce_time)).await;

            match io_changed {
                Either::First(edge) => {
                    // edge detected, signal not yet stable for time required
                    edge?;
                    continue;
                }
                Either::Second(_) => break self.level(),
            }
        }
    }

    pub async fn wait_for_change_to(&mut self, target_level: PinState) -> Result<(), PinError<P>> {
        loop {
            match target_level {
                PinState::High => self.input.wait_for_rising_edge().await?,
                PinState::Low => self.input.wait_for_falling_edge().await?,
            }

            if self.debounce().await? == target_level {
                return Ok(());
            }
        }
    }
}
