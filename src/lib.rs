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

#![cfg_attr(not(test), no_std)]

//! Control core of a battery powered BLE scale.
//!
//! Samples an HX711 load-cell amplifier on demand, turns the raw counts into a calibrated mass
//! and delivers it either as GATT notifications (peer connected and subscribed) or as a BTHome
//! broadcast advertisement (no peer). The board binding owns the pins, the executor and the
//! wireless stack, and hands them to [`application::application_manager::ApplicationManager`].

// This must go first so the logging macros are visible to every other module.
#[macro_use]
mod fmt;

pub mod application;
pub mod config;
pub mod hmi;
pub mod link;
pub mod weight;

#[cfg(test)]
mod testing;
