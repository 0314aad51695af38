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

//! Fakes shared by the unit tests.

use crate::link::{CharacteristicId, ConnectionHandle, TelemetryLink};
use crate::weight::interface::AsyncStrainGaugeInterface;
use core::convert::Infallible;
use embedded_hal::digital::{InputPin, PinState};
use embedded_hal_async::digital::Wait;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GaugeFault {
    InitFailed,
    PowerUpFailed,
    ReadFailed,
}

/// Replays scripted raw conversions. Once the script runs out the last conversion repeats.
#[derive(Default)]
pub struct FakeGauge {
    samples: VecDeque<i32>,
    last_sample: i32,
    pub powered: bool,
    pub initialized: bool,
    pub power_ups: usize,
    pub power_downs: usize,
    pub readings_taken: usize,
    pub fail_power_up: bool,
    pub fail_init: bool,
    pub stall: bool,
    /// Reported ADC width, 24 when unset.
    pub adc_bits: Option<usize>,
    fail_after: Option<(usize, GaugeFault)>,
}

impl FakeGauge {
    pub fn with_samples(samples: &[i32]) -> Self {
        let mut gauge = Self::default();
        gauge.push_samples(samples);
        gauge
    }

    pub fn push_samples(&mut self, samples: &[i32]) {
        self.samples.extend(samples.iter().copied());
    }

    /// Fails the read after `successful` more conversions.
    pub fn fail_after(&mut self, successful: usize, fault: GaugeFault) {
        self.fail_after = Some((self.readings_taken + successful, fault));
    }
}

impl AsyncStrainGaugeInterface for FakeGauge {
    type Error = GaugeFault;

    async fn initialize(&mut self) -> Result<(), Self::Error> {
        if self.fail_init {
            return Err(GaugeFault::InitFailed);
        }
        self.initialized = true;
        self.powered = true;
        Ok(())
    }

    async fn get_next_reading(&mut self) -> Result<i32, Self::Error> {
        if self.stall {
            core::future::pending::<()>().await;
        }
        if let Some((at, fault)) = self.fail_after {
            if self.readings_taken >= at {
                return Err(fault);
            }
        }
        self.powered = true;
        self.readings_taken += 1;
        if let Some(sample) = self.samples.pop_front() {
            self.last_sample = sample;
        }
        Ok(self.last_sample)
    }

    async fn power_down(&mut self) -> Result<(), Self::Error> {
        self.power_downs += 1;
        self.powered = false;
        Ok(())
    }

    async fn power_up(&mut self) -> Result<(), Self::Error> {
        if self.fail_power_up {
            return Err(GaugeFault::PowerUpFailed);
        }
        self.power_ups += 1;
        self.powered = true;
        Ok(())
    }

    fn get_adc_bit_count(&self) -> usize {
        self.adc_bits.unwrap_or(24)
    }
}

#[derive(Debug, PartialEq)]
pub struct LinkRefused;

#[derive(Default)]
pub struct LinkLog {
    pub notifications: Vec<(CharacteristicId, Vec<u8>)>,
    pub advertisements: Vec<Vec<u8>>,
    pub read_responses: Vec<(ConnectionHandle, CharacteristicId, Vec<u8>)>,
    pub refuse: bool,
}

/// Records every call. Clones share one log.
#[derive(Clone, Default)]
pub struct RecordingLink {
    pub log: Rc<RefCell<LinkLog>>,
}

impl RecordingLink {
    pub fn notification_count(&self) -> usize {
        self.log.borrow().notifications.len()
    }

    pub fn advertisement_count(&self) -> usize {
        self.log.borrow().advertisements.len()
    }

    pub fn last_notification(&self) -> Option<i32> {
        self.log
            .borrow()
            .notifications
            .last()
            .map(|(_, payload)| i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]))
    }

    pub fn last_advertisement(&self) -> Option<Vec<u8>> {
        self.log.borrow().advertisements.last().cloned()
    }
}

impl TelemetryLink for RecordingLink {
    type Error = LinkRefused;

    fn notify_all(&mut self, characteristic: CharacteristicId, payload: &[u8]) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        if log.refuse {
            return Err(LinkRefused);
        }
        log.notifications.push((characteristic, payload.to_vec()));
        Ok(())
    }

    fn set_advertisement(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        if log.refuse {
            return Err(LinkRefused);
        }
        log.advertisements.push(payload.to_vec());
        Ok(())
    }

    fn send_read_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: CharacteristicId,
        payload: &[u8],
    ) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        if log.refuse {
            return Err(LinkRefused);
        }
        log.read_responses.push((connection, characteristic, payload.to_vec()));
        Ok(())
    }
}

/// Holds a fixed level. Edges towards that level happen immediately, others never.
pub struct SteadyPin(pub PinState);

impl embedded_hal::digital::ErrorType for SteadyPin {
    type Error = Infallible;
}

impl InputPin for SteadyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0 == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0 == PinState::Low)
    }
}

impl Wait for SteadyPin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        if self.0 == PinState::Low {
            core::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        if self.0 == PinState::High {
            core::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }
}
