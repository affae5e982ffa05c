// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device attribute access and the write-verify procedure.
//!
//! Attributes live in a flat, scoped key namespace on the platform
//! ([`AttributeScope`]). Reads and writes go through the [`AttributeStore`]
//! seam; mutations are confirmed with the bounded polling loop in
//! [`write_and_verify`].

mod scope;
mod store;
mod verify;

pub use scope::AttributeScope;
pub use store::AttributeStore;
pub use verify::{
    AttributeWrite, CompareMode, CompositeReport, DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS,
    NUMERIC_TOLERANCE, WriteOutcome, WriteReport, write_and_verify, write_and_verify_all,
};

use serde_json::Value;

/// Coerces a platform value to a float.
///
/// The platform stores attribute values loosely typed; numbers frequently
/// come back as strings. Accepts JSON numbers and numeric strings.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerces a platform value to a string.
///
/// JSON strings are taken verbatim (no quotes); other values use their
/// JSON rendering.
#[must_use]
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
