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

use crate::link::{CharacteristicId, ClientConfig, LinkEvent};

/// How readings leave the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryPath {
    Notification,
    Advertisement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryMode {
    /// No peer; readings go into the broadcast payload.
    Disconnected,
    ConnectedUnsubscribed,
    ConnectedSubscribed,
}

impl DeliveryMode {
    /// The path the measurement timer must feed in this mode, if any.
    pub fn scheduled_path(&self) -> Option<DeliveryPath> {
        match self {
            DeliveryMode::Disconnected => Some(DeliveryPath::Advertisement),
            DeliveryMode::ConnectedUnsubscribed => None,
            DeliveryMode::ConnectedSubscribed => Some(DeliveryPath::Notification),
        }
    }
}

/// Tracks the peer's connection and subscription state.
///
/// Broadcast is the fallback: it needs no peer, so the device starts and ends up there whenever
/// the link goes away.
pub struct DeliveryModeSelector {
    mode: DeliveryMode,
    characteristic: CharacteristicId,
}

impl DeliveryModeSelector {
    pub fn new(characteristic: CharacteristicId) -> Self {
        Self {
            mode: DeliveryMode::Disconnected,
            characteristic,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Stack boot. Always lands in broadcast mode.
    pub fn boot(&mut self) -> DeliveryMode {
        self.mode = DeliveryMode::Disconnected;
        self.mode
    }

    /// Applies one link event. Returns the new mode if the event caused a transition; events that
    /// do not apply to the current mode are ignored.
    pub fn handle(&mut self, event: &LinkEvent) -> Option<DeliveryMode> {
        let next = match (self.mode, event) {
            (DeliveryMode::Disconnected, LinkEvent::Connected(_)) => DeliveryMode::ConnectedUnsubscribed,
            (DeliveryMode::ConnectedUnsubscribed | DeliveryMode::ConnectedSubscribed, LinkEvent::Disconnected(_)) => {
                DeliveryMode::Disconnected
            }
            (
                DeliveryMode::ConnectedUnsubscribed,
                LinkEvent::SubscriptionChanged {
                    characteristic,
                    config,
                },
            ) if *characteristic == self.characteristic && config.is_enabled() => DeliveryMode::ConnectedSubscribed,
            (
                DeliveryMode::ConnectedSubscribed,
                LinkEvent::SubscriptionChanged {
                    characteristic,
                    config: ClientConfig::Disabled,
                },
            ) if *characteristic == self.characteristic => DeliveryMode::ConnectedUnsubscribed,
            _ => return None,
        };

        debug!("Delivery mode {:?} -> {:?}", self.mode, next);
        self.mode = next;
        Some(next)
    }
}
