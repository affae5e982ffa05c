// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute scopes.

use std::fmt;

/// Scope of a device attribute on the platform.
///
/// The platform splits the flat key namespace into two scopes with
/// different writers:
///
/// - **Shared**: written server-side (dashboard/operator), readable by the
///   device. Examples: `door`, `rgb`, `eggs`.
/// - **Client**: configuration-style keys written and read through the
///   device API. Examples: `maxTemp`, `latitude`, `avgWeight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// Server/operator-writable, device-readable attributes.
    Shared,
    /// Configuration attributes on the device side.
    Client,
}

impl AttributeScope {
    /// Query parameter used to filter keys of this scope on reads.
    #[must_use]
    pub const fn query_key(self) -> &'static str {
        match self {
            Self::Shared => "sharedKeys",
            Self::Client => "clientKeys",
        }
    }

    /// Section name under which the platform nests this scope's values in
    /// read responses.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_keys() {
        assert_eq!(AttributeScope::Shared.query_key(), "sharedKeys");
        assert_eq!(AttributeScope::Client.query_key(), "clientKeys");
    }

    #[test]
    fn sections() {
        assert_eq!(AttributeScope::Shared.section(), "shared");
        assert_eq!(AttributeScope::Client.section(), "client");
    }
}
