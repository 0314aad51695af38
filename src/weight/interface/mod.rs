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

pub mod hx711async;

/// Raw access to a load-cell amplifier. Calibration lives above this, in
/// [`SensorSession`](crate::weight::sensor_session::SensorSession).
#[allow(async_fn_in_trait)]
pub trait AsyncStrainGaugeInterface {
    type Error;

    /// Bring the amplifier out of reset with its configured gain. Leaves it powered up.
    async fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Waits for the next conversion and returns it sign-extended. Powers the amplifier up first
    /// if it is down.
    async fn get_next_reading(&mut self) -> Result<i32, Self::Error>;

    async fn power_down(&mut self) -> Result<(), Self::Error>;

    async fn power_up(&mut self) -> Result<(), Self::Error>;

    /// Resolution of the ADC. Conversions at either end of this range are saturated.
    fn get_adc_bit_count(&self) -> usize;
}
