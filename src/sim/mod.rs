// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nest device simulation.
//!
//! The simulation is split so the deterministic parts stay transport-free:
//!
//! - [`NestState`] is the pure state machine, advanced one tick at a time
//!   with an injected RNG and the current door state.
//! - [`NestControls`] holds the remotely settable fields shared between
//!   the tick loop and the command handler.
//! - [`NestCommand`] parses inbound attribute-update payloads.
//! - [`NestSimulator`] (with the `mqtt` feature) wires the above to a
//!   live device session and runs the telemetry loop.

mod command;
mod controls;
mod nest;
#[cfg(feature = "mqtt")]
mod runner;

pub use command::NestCommand;
pub use controls::{DEFAULT_REPORT_PERIOD, NestControls};
pub use nest::{DWELL_TICKS, EGG_WEIGHT_GRAMS, HEN_WEIGHT_GRAMS, NestState};
#[cfg(feature = "mqtt")]
pub use runner::NestSimulator;
