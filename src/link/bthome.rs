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

//! BTHome v2 broadcast payload carrying the current mass.

use heapless::Vec;

pub const MAX_ADVERTISEMENT_LEN: usize = 31;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_SERVICE_DATA_16: u8 = 0x16;
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
// LE general discoverable, BR/EDR not supported
const ADV_FLAGS: u8 = 0x06;
const BTHOME_UUID: [u8; 2] = [0xD2, 0xFC];
// v2, unencrypted, regular interval
const BTHOME_DEVICE_INFO: u8 = 0x40;
const OBJECT_ID_MASS_KG: u8 = 0x06;

pub type AdvertisementPayload = Vec<u8, MAX_ADVERTISEMENT_LEN>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvertisementError {
    TooLong,
}

/// Mass in grams to the BTHome mass object (kg, factor 0.01). Clamped to the `u16` range.
fn mass_to_object_value(grams: f32) -> u16 {
    // also rejects NaN
    if !(grams > 0.0) {
        return 0;
    }
    let hundredths_of_kg = grams / 10.0 + 0.5;
    if hundredths_of_kg >= u16::MAX as f32 {
        u16::MAX
    } else {
        hundredths_of_kg as u16
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvertisementData {
    name: &'static str,
    mass_grams: Option<f32>,
}

impl AdvertisementData {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            mass_grams: None,
        }
    }

    pub fn with_mass(self, mass_grams: f32) -> Self {
        Self {
            mass_grams: Some(mass_grams),
            ..self
        }
    }

    pub fn mass(&self) -> Option<f32> {
        self.mass_grams
    }

    fn object_bytes(&self) -> Vec<u8, 3> {
        let mut objects = Vec::new();
        if let Some(grams) = self.mass_grams {
            let value = mass_to_object_value(grams).to_le_bytes();
            // capacity is exactly one mass object
            let _ = objects.extend_from_slice(&[OBJECT_ID_MASS_KG, value[0], value[1]]);
        }
        objects
    }

    /// Flags, BTHome service data and the local name, in that order.
    pub fn as_vec(&self) -> Result<AdvertisementPayload, AdvertisementError> {
        let mut buff = AdvertisementPayload::new();
        let objects = self.object_bytes();

        buff.extend_from_slice(&[0x02, AD_TYPE_FLAGS, ADV_FLAGS])
            .map_err(|_| AdvertisementError::TooLong)?;

        // length covers AD type, UUID, device info byte and the objects
        let service_data_len = 1 + BTHOME_UUID.len() + 1 + objects.len();
        buff.extend_from_slice(&[
            service_data_len as u8,
            AD_TYPE_SERVICE_DATA_16,
            BTHOME_UUID[0],
            BTHOME_UUID[1],
            BTHOME_DEVICE_INFO,
        ])
        .map_err(|_| AdvertisementError::TooLong)?;
        buff.extend_from_slice(objects.as_slice())
            .map_err(|_| AdvertisementError::TooLong)?;

        if !self.name.is_empty() {
            let name = self.name.as_bytes();
            if name.len() + 2 > buff.capacity() - buff.len() {
                return Err(AdvertisementError::TooLong);
            }
            buff.extend_from_slice(&[name.len() as u8 + 1, AD_TYPE_COMPLETE_LOCAL_NAME])
                .map_err(|_| AdvertisementError::TooLong)?;
            buff.extend_from_slice(name)
                .map_err(|_| AdvertisementError::TooLong)?;
        }

        Ok(buff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_mass_in_hundredths_of_kilogram() {
        let payload = AdvertisementData::new("Mass").with_mass(1234.0).as_vec().unwrap();
        assert_eq!(
            payload.as_slice(),
            &[
                0x02, 0x01, 0x06, //
                0x07, 0x16, 0xD2, 0xFC, 0x40, 0x06, 0x7B, 0x00, //
                0x05, 0x09, b'M', b'a', b's', b's',
            ]
        );
    }

    #[test]
    fn without_measurement_only_header_is_sent() {
        let payload = AdvertisementData::new("Mass").as_vec().unwrap();
        assert_eq!(&payload[3..8], &[0x04, 0x16, 0xD2, 0xFC, 0x40]);
        assert_eq!(payload.len(), 3 + 5 + 6);
    }

    #[test]
    fn out_of_range_masses_are_clamped() {
        assert_eq!(mass_to_object_value(-20.0), 0);
        assert_eq!(mass_to_object_value(f32::NAN), 0);
        assert_eq!(mass_to_object_value(1.0e9), u16::MAX);
        assert_eq!(mass_to_object_value(5.0), 1);
        assert_eq!(mass_to_object_value(4.9), 0);
    }

    #[test]
    fn name_that_does_not_fit_is_rejected() {
        let data = AdvertisementData::new("A rather long scale name 01").with_mass(1.0);
        assert_eq!(data.as_vec(), Err(AdvertisementError::TooLong));
    }
}
