// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute store abstraction.

use serde_json::Value;

use crate::error::Error;

use super::AttributeScope;

/// A remote key/value store holding one device's attributes.
///
/// This is the seam between the write-verify procedure and the transport.
/// The HTTP platform client implements it per device token; tests provide
/// in-memory fakes with scripted responses.
///
/// The store is eventually consistent: a value read immediately after a
/// write may still be stale, which is exactly why writes are verified by
/// polling.
#[allow(async_fn_in_trait)]
pub trait AttributeStore {
    /// Reads the current value of a single key in the given scope.
    ///
    /// Returns `Ok(None)` when the key is absent from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the read request fails.
    async fn read(&self, scope: AttributeScope, key: &str) -> Result<Option<Value>, Error>;

    /// Writes a flat `{key: value}` object into the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the write request fails.
    async fn write(&self, body: &Value) -> Result<(), Error>;
}
