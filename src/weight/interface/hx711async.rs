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

use crate::weight::interface::AsyncStrainGaugeInterface;
use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::digital::Wait;

/// Input channel and gain used for the conversion after the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hx711Gain {
    Gain128,
    Gain64,
    Gain32ChannelB,
}

impl Hx711Gain {
    /// 24 data pulses plus the pulses that select the next conversion's gain.
    fn pulse_count(&self) -> usize {
        match self {
            Hx711Gain::Gain128 => 25,
            Hx711Gain::Gain32ChannelB => 26,
            Hx711Gain::Gain64 => 27,
        }
    }
}

// PD_SCK must stay high for more than 60us to enter power down
const POWER_DOWN_HOLD: Duration = Duration::from_micros(60);
const CLK_HALF_PERIOD: Duration = Duration::from_micros(1);
// 10 SPS conversion plus settling after a power up
const DATA_READY_TIMEOUT: Duration = Duration::from_millis(500);
const DATA_BITS: usize = 24;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<ClkE, DataE> {
    ClockPin(ClkE),
    DataPin(DataE),
    /// DOUT never went low.
    NotReady,
}

fn sign_extend(frame: u32) -> i32 {
    ((frame << (32 - DATA_BITS)) as i32) >> (32 - DATA_BITS)
}

/// Bit-banged HX711 on two GPIOs.
pub struct Hx711Async<CLK, DATA> {
    clock_pin: CLK,
    data_pin: DATA,
    gain: Hx711Gain,
    powered_up: bool,
}

impl<CLK, DATA, ClkE, DataE> Hx711Async<CLK, DATA>
where
    CLK: OutputPin<Error = ClkE>,
    DATA: Wait<Error = DataE> + InputPin<Error = DataE>,
{
    pub fn new(clock_pin: CLK, data_pin: DATA, gain: Hx711Gain) -> Self {
        Self {
            clock_pin,
            data_pin,
            gain,
            powered_up: false,
        }
    }

    /// Applies from the conversion after the next one clocked out.
    pub fn set_gain(&mut self, gain: Hx711Gain) {
        self.gain = gain;
    }

    pub fn is_powered_up(&self) -> bool {
        self.powered_up
    }

    async fn wait_for_data_ready(&mut self) -> Result<(), Error<ClkE, DataE>> {
        // DOUT goes low when a conversion is ready
        with_timeout(DATA_READY_TIMEOUT, self.data_pin.wait_for_low())
            .await
            .map_err(|_| Error::NotReady)?
            .map_err(Error::DataPin)
    }

    async fn shift_in(&mut self) -> Result<u32, Error<ClkE, DataE>> {
        let pulses = self.gain.pulse_count();
        let mut frame: u32 = 0;

        for _ in 0..pulses {
            self.clock_pin.set_high().map_err(Error::ClockPin)?;
            Timer::after(CLK_HALF_PERIOD).await;
            self.clock_pin.set_low().map_err(Error::ClockPin)?;
            let bit = self.data_pin.is_high().map_err(Error::DataPin)?;
            frame = (frame << 1) | bit as u32;
            Timer::after(CLK_HALF_PERIOD).await;
        }

        Ok(frame >> (pulses - DATA_BITS))
    }
}

impl<CLK, DATA, ClkE, DataE> AsyncStrainGaugeInterface for Hx711Async<CLK, DATA>
where
    CLK: OutputPin<Error = ClkE>,
    DATA: Wait<Error = DataE> + InputPin<Error = DataE>,
{
    type Error = Error<ClkE, DataE>;

    async fn initialize(&mut self) -> Result<(), Self::Error> {
        // power cycling resets the chip to channel A, gain 128
        self.power_down().await?;
        self.power_up().await?;
        if self.gain != Hx711Gain::Gain128 {
            // clocking out one conversion latches the configured gain
            self.get_next_reading().await?;
        }
        Ok(())
    }

    async fn get_next_reading(&mut self) -> Result<i32, Self::Error> {
        if !self.powered_up {
            self.power_up().await?;
        }

        self.wait_for_data_ready().await?;
        let frame = self.shift_in().await?;
        Ok(sign_extend(frame))
    }

    async fn power_down(&mut self) -> Result<(), Self::Error> {
        self.clock_pin.set_high().map_err(Error::ClockPin)?;
        Timer::after(POWER_DOWN_HOLD).await;
        self.powered_up = false;
        Ok(())
    }

    async fn power_up(&mut self) -> Result<(), Self::Error> {
        self.clock_pin.set_low().map_err(Error::ClockPin)?;
        self.powered_up = true;
        Ok(())
    }

    fn get_adc_bit_count(&self) -> usize {
        DATA_BITS
    }
}
