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

pub mod interface;
pub mod sensor_session;

use embassy_time::Instant;

/// An averaged, calibrated mass. Produced once, handed to whichever delivery path consumes it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementReading {
    /// Grams.
    pub mass: f32,
    pub timestamp: Instant,
}

impl MeasurementReading {
    pub fn new(mass: f32, timestamp: Instant) -> Self {
        Self { mass, timestamp }
    }

    /// Whole grams truncated toward zero, as carried by notifications and GATT reads.
    pub fn mass_as_i32(&self) -> i32 {
        self.mass as i32
    }

    pub fn to_le_bytes(&self) -> [u8; 4] {
        self.mass_as_i32().to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_value_truncates_toward_zero() {
        let now = Instant::from_millis(0);
        assert_eq!(MeasurementReading::new(12.9, now).mass_as_i32(), 12);
        assert_eq!(MeasurementReading::new(-12.9, now).mass_as_i32(), -12);
        assert_eq!(MeasurementReading::new(258.0, now).to_le_bytes(), [0x02, 0x01, 0x00, 0x00]);
    }
}
