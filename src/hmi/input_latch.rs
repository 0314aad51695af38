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

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU8, Ordering};
use strum::{EnumIter, IntoEnumIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InputSource {
    TareButton,
    ReadButton,
}

impl InputSource {
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Sources that were signalled since the previous drain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSources(u8);

impl InputSources {
    pub fn contains(&self, source: InputSource) -> bool {
        self.0 & source.mask() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = InputSource> {
        let set = *self;
        InputSource::iter().filter(move |source| set.contains(*source))
    }
}

/// One pending flag per [`InputSource`], packed in a single atomic word.
///
/// `signal` is safe to call from interrupt context. `drain` reads and clears every flag in one
/// swap, so presses that land between two drains collapse into one.
pub struct InputLatch {
    pending: AtomicU8,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl InputLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
            wake: Signal::new(),
        }
    }

    pub fn signal(&self, source: InputSource) {
        self.pending.fetch_or(source.mask(), Ordering::AcqRel);
        self.wake.signal(());
    }

    pub fn drain(&self) -> InputSources {
        InputSources(self.pending.swap(0, Ordering::AcqRel))
    }

    /// Resolves once something has been signalled since the last wake-up.
    pub async fn wait(&self) {
        self.wake.wait().await
    }
}
