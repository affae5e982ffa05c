// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `NestoR` Lib - A Rust library for smart nest devices.
//!
//! This library provides both sides of a smart-nest IoT deployment:
//! the device itself (a simulator publishing telemetry over MQTT) and
//! the operator tooling (a REST client managing device attributes).
//!
//! # Supported Features
//!
//! - **Nest simulation**: cyclic laying-cycle state machine with a
//!   remotely controlled door interlock, LED, and report period
//! - **Telemetry**: periodic temperature/humidity/weight/UID snapshots
//! - **Attribute management**: door, alert thresholds, location, and egg
//!   reference weights, with write-then-verify confirmation
//! - **Operator session**: platform login and latest-telemetry reads
//!
//! # Quick Start
//!
//! ## Running a simulated nest (MQTT)
//!
//! ```no_run
//! use nestor_lib::sim::NestSimulator;
//!
//! #[tokio::main]
//! async fn main() -> nestor_lib::Result<()> {
//!     let mut sim = NestSimulator::connect(
//!         "mqtts://iot.example.org:8883",
//!         "hNxbPHZG1A1Rft0LHAVO",
//!         "NEST1",
//!     )
//!     .await?;
//!
//!     sim.run().await
//! }
//! ```
//!
//! ## Managing a nest (HTTP)
//!
//! ```no_run
//! use nestor_lib::client::{DeviceCredentials, NestClient};
//! use nestor_lib::protocol::PlatformClient;
//! use nestor_lib::types::DoorState;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> nestor_lib::Result<()> {
//!     let platform = PlatformClient::new("iot.example.org")?;
//!     let device_id: Uuid = "b5697430-f455-11f0-b5e6-d92120c3d6c8"
//!         .parse()
//!         .expect("valid device id");
//!     let credentials = DeviceCredentials::new(device_id, "hNxbPHZG1A1Rft0LHAVO");
//!     let nest = NestClient::new(platform, credentials);
//!
//!     // Close the door and wait for the change to be observed.
//!     let report = nest.set_door(DoorState::Closed).await;
//!     println!("{report}");
//!
//!     // Composite mutations verify each field independently.
//!     let report = nest.set_location(40.4168, -3.7038).await;
//!     if !report.verified() {
//!         eprintln!("location not fully confirmed: {report}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod attributes;
#[cfg(feature = "http")]
pub mod client;
pub mod error;
pub mod protocol;
pub mod sim;
pub mod telemetry;
pub mod types;

pub use attributes::{
    AttributeScope, AttributeStore, AttributeWrite, CompareMode, CompositeReport, WriteOutcome,
    WriteReport, write_and_verify, write_and_verify_all,
};
#[cfg(feature = "http")]
pub use client::{DeviceCredentials, HumidityLimit, NestClient, TemperatureLimit};
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
#[cfg(feature = "http")]
pub use protocol::{PlatformClient, PlatformConfig};
#[cfg(feature = "mqtt")]
pub use protocol::DeviceLink;
pub use sim::{NestCommand, NestControls, NestState};
#[cfg(feature = "mqtt")]
pub use sim::NestSimulator;
pub use telemetry::TelemetryReading;
pub use types::{DoorState, EggSpecies, LedColor, NestPhase, OccupantTag};
