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

use crate::link::CharacteristicId;
use embassy_time::Duration;

/// Period between notifications while a peer is subscribed.
pub const MEASUREMENT_INTERVAL_INDICATION: Duration = Duration::from_millis(1000);
/// Period between broadcast payload rebuilds while no peer is connected.
pub const MEASUREMENT_INTERVAL_ADVERTISING: Duration = Duration::from_millis(10_000);
/// Time given to the operator to clear the platter before a requested tare runs.
pub const TARE_DELAY: Duration = Duration::from_millis(2000);
pub const AVERAGE_COUNT: usize = 5;
/// Raw counts per gram.
pub const DEFAULT_SCALE: f32 = 375.0;
/// HX711 output settling time at 80 SPS.
pub const SETTLE_TIME: Duration = Duration::from_millis(50);
pub const ACQUISITION_TIMEOUT: Duration = Duration::from_millis(1500);
pub const MASS_CHARACTERISTIC: CharacteristicId = CharacteristicId(0x0015);
pub const DEVICE_NAME: &str = "Mass";

/// Compiled-in operating parameters. Nothing here survives a reboot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleConfig {
    pub indication_period: Duration,
    pub advertising_period: Duration,
    pub tare_delay: Duration,
    pub average_count: usize,
    pub default_scale: f32,
    pub settle_time: Duration,
    pub acquisition_timeout: Duration,
    pub mass_characteristic: CharacteristicId,
    pub device_name: &'static str,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            indication_period: MEASUREMENT_INTERVAL_INDICATION,
            advertising_period: MEASUREMENT_INTERVAL_ADVERTISING,
            tare_delay: TARE_DELAY,
            average_count: AVERAGE_COUNT,
            default_scale: DEFAULT_SCALE,
            settle_time: SETTLE_TIME,
            acquisition_timeout: ACQUISITION_TIMEOUT,
            mass_characteristic: MASS_CHARACTERISTIC,
            device_name: DEVICE_NAME,
        }
    }
}

impl ScaleConfig {
    pub fn with_periods(self, indication_period: Duration, advertising_period: Duration) -> Self {
        Self {
            indication_period,
            advertising_period,
            ..self
        }
    }

    pub fn with_tare_delay(self, tare_delay: Duration) -> Self {
        Self { tare_delay, ..self }
    }

    pub fn with_average_count(self, average_count: usize) -> Self {
        Self {
            average_count,
            ..self
        }
    }

    pub fn with_default_scale(self, default_scale: f32) -> Self {
        Self {
            default_scale,
            ..self
        }
    }

    pub fn with_settle_time(self, settle_time: Duration) -> Self {
        Self { settle_time, ..self }
    }

    pub fn with_acquisition_timeout(self, acquisition_timeout: Duration) -> Self {
        Self {
            acquisition_timeout,
            ..self
        }
    }

    pub fn with_mass_characteristic(self, mass_characteristic: CharacteristicId) -> Self {
        Self {
            mass_characteristic,
            ..self
        }
    }

    pub fn with_device_name(self, device_name: &'static str) -> Self {
        Self {
            device_name,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timing() {
        let config = ScaleConfig::default();
        assert_eq!(config.indication_period.as_millis(), 1000);
        assert_eq!(config.advertising_period.as_millis(), 10_000);
        assert_eq!(config.tare_delay.as_millis(), 2000);
        assert_eq!(config.average_count, 5);
        assert_eq!(config.default_scale, 375.0);
    }

    #[test]
    fn builders_only_touch_their_field() {
        let config = ScaleConfig::default()
            .with_periods(Duration::from_millis(10), Duration::from_millis(20))
            .with_average_count(3);
        assert_eq!(config.indication_period.as_millis(), 10);
        assert_eq!(config.advertising_period.as_millis(), 20);
        assert_eq!(config.average_count, 3);
        assert_eq!(config.tare_delay, TARE_DELAY);
        assert_eq!(config.device_name, DEVICE_NAME);
    }
}
