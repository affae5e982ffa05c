// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for nest devices.
//!
//! This module provides type-safe representations of the values exchanged
//! with the platform. Wire strings are validated at the boundary so the
//! rest of the library works with closed enums.
//!
//! # Types
//!
//! - [`NestPhase`] - Phase of the simulated laying cycle
//! - [`DoorState`] - Open/Closed access door state
//! - [`OccupantTag`] - RFID tag detected inside the nest
//! - [`LedColor`] - Status LED color (display value only)
//! - [`EggSpecies`] - Species inferred from the configured average weight

mod door;
mod led;
mod occupant;
mod phase;
mod species;

pub use door::DoorState;
pub use led::LedColor;
pub use occupant::OccupantTag;
pub use phase::NestPhase;
pub use species::EggSpecies;
