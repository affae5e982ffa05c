// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport implementations for talking to the IoT platform.
//!
//! - [`DeviceLink`]: the device-side MQTT session (telemetry out,
//!   attribute updates in), available with the `mqtt` feature.
//! - [`PlatformClient`]: the operator-side REST client (login, telemetry
//!   reads, device attribute access), available with the `http` feature.

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mqtt")]
mod mqtt;

#[cfg(feature = "http")]
pub use http::{DeviceAttributes, PlatformClient, PlatformConfig};
#[cfg(feature = "mqtt")]
pub use mqtt::{ATTRIBUTES_TOPIC, DeviceLink, TELEMETRY_TOPIC};
