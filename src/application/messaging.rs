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

use crate::link::LinkEvent;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

const CHANNEL_DEPTH: usize = 8;

/// Carries wireless stack events from the stack's callback into the application loop.
pub type LinkEventChannel = Channel<CriticalSectionRawMutex, LinkEvent, CHANNEL_DEPTH>;
pub type LinkEventReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, LinkEvent, CHANNEL_DEPTH>;
pub type LinkEventSender<'a> = Sender<'a, CriticalSectionRawMutex, LinkEvent, CHANNEL_DEPTH>;

/// Hands an event to the application without blocking. A full queue drops the event.
pub fn post_link_event(sender: &LinkEventSender<'_>, event: LinkEvent) -> bool {
    match sender.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            warn!("Link event queue full, dropped {:?}", event);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ConnectionHandle;

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let channel = LinkEventChannel::new();
        let sender = channel.sender();
        for n in 0..CHANNEL_DEPTH {
            assert!(post_link_event(&sender, LinkEvent::Connected(ConnectionHandle(n as u8))));
        }
        assert!(!post_link_event(&sender, LinkEvent::Disconnected(ConnectionHandle(0))));

        let receiver = channel.receiver();
        assert_eq!(receiver.try_receive(), Ok(LinkEvent::Connected(ConnectionHandle(0))));
    }
}
