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

//! Boundary to the wireless stack. The stack delivers [`LinkEvent`]s and the application drives
//! it back through [`TelemetryLink`].

pub mod bthome;

/// GATT attribute handle of a characteristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionHandle(pub u8);

/// Client characteristic configuration written by the peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientConfig {
    Disabled,
    Notification,
    Indication,
    NotificationAndIndication,
}

impl ClientConfig {
    /// Decodes the CCCD value bits. Reserved bits are ignored.
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0x1 => ClientConfig::Notification,
            0x2 => ClientConfig::Indication,
            0x3 => ClientConfig::NotificationAndIndication,
            _ => ClientConfig::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != ClientConfig::Disabled
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressKind {
    Public,
    StaticRandom,
}

/// Identity address, most significant byte first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress {
    pub kind: AddressKind,
    pub bytes: [u8; 6],
}

/// Everything the wireless stack reports to the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Radio is ready. No stack call may be issued before this.
    Booted {
        version: StackVersion,
        address: DeviceAddress,
    },
    Connected(ConnectionHandle),
    Disconnected(ConnectionHandle),
    SubscriptionChanged {
        characteristic: CharacteristicId,
        config: ClientConfig,
    },
    /// The peer reads a characteristic whose value is supplied by the application.
    ReadRequest {
        connection: ConnectionHandle,
        characteristic: CharacteristicId,
    },
}

/// Operations the application issues towards the wireless stack. None of them may block.
pub trait TelemetryLink {
    type Error;

    /// Sends `payload` to every peer subscribed to `characteristic`.
    fn notify_all(&mut self, characteristic: CharacteristicId, payload: &[u8]) -> Result<(), Self::Error>;

    /// Replaces the broadcast advertisement data.
    fn set_advertisement(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Answers a pending [`LinkEvent::ReadRequest`].
    fn send_read_response(
        &mut self,
        connection: ConnectionHandle,
        characteristic: CharacteristicId,
        payload: &[u8],
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_decodes_cccd_bits() {
        assert_eq!(ClientConfig::from_bits(0x0000), ClientConfig::Disabled);
        assert_eq!(ClientConfig::from_bits(0x0001), ClientConfig::Notification);
        assert_eq!(ClientConfig::from_bits(0x0002), ClientConfig::Indication);
        assert_eq!(ClientConfig::from_bits(0x0003), ClientConfig::NotificationAndIndication);
        assert_eq!(ClientConfig::from_bits(0x0004), ClientConfig::Disabled);
    }

    #[test]
    fn only_disabled_is_not_enabled() {
        assert!(!ClientConfig::Disabled.is_enabled());
        assert!(ClientConfig::Notification.is_enabled());
        assert!(ClientConfig::Indication.is_enabled());
        assert!(ClientConfig::NotificationAndIndication.is_enabled());
    }
}
