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

use crate::hmi::debouncer::{Debouncer, PinError};
use crate::hmi::input_latch::{InputLatch, InputSource};
use embedded_hal::digital::{InputPin, PinState};
use embedded_hal_async::digital::Wait;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    /// On-demand reading.
    Button0,
    /// Tare.
    Button1,
}

impl ButtonId {
    pub fn source(&self) -> InputSource {
        match self {
            ButtonId::Button0 => InputSource::ReadButton,
            ButtonId::Button1 => InputSource::TareButton,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Button state-changed callback. Only presses are latched.
pub fn on_button_change(latch: &InputLatch, button: ButtonId, state: ButtonState) {
    if state == ButtonState::Pressed {
        latch.signal(button.source());
    }
}

/// Active-low push button feeding the latch.
pub struct ButtonWatcher<P> {
    button: ButtonId,
    debouncer: Debouncer<P>,
}

impl<P> ButtonWatcher<P>
where
    P: Wait + InputPin,
{
    pub fn new(button: ButtonId, debouncer: Debouncer<P>) -> Self {
        Self { button, debouncer }
    }

    /// Waits for one debounced press and latches it.
    pub async fn wait_for_press(&mut self, latch: &InputLatch) -> Result<(), PinError<P>> {
        self.debouncer.wait_for_change_to(PinState::Low).await?;
        debug!("{:?} pressed", self.button);
        on_button_change(latch, self.button, ButtonState::Pressed);
        Ok(())
    }

    pub async fn wait_for_release(&mut self) -> Result<(), PinError<P>> {
        self.debouncer.wait_for_change_to(PinState::High).await
    }

    /// Body of a button task. Pin errors are logged and the watch continues.
    pub async fn run(&mut self, latch: &InputLatch) -> ! {
        loop {
            if self.wait_for_press(latch).await.is_err() {
                warn!("{:?} read failed", self.button);
                continue;
            }
            if self.wait_for_release().await.is_err() {
                warn!("{:?} read failed", self.button);
            }
        }
    }
}
