// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LED color indicator type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Color shown on the nest's status LED.
///
/// The value is a free-form color name set from the dashboard (`"red"`,
/// `"green"`, `"off"`, ...). It is a pure display value: the simulation
/// stores and reports it but never acts on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedColor(String);

impl LedColor {
    /// Returns the LED color used before any command arrives.
    #[must_use]
    pub fn off() -> Self {
        Self("off".to_string())
    }

    /// Returns the color name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LedColor {
    fn default() -> Self {
        Self::off()
    }
}

impl From<&str> for LedColor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LedColor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_off() {
        assert_eq!(LedColor::default().as_str(), "off");
    }

    #[test]
    fn from_str_keeps_value() {
        let color = LedColor::from("green");
        assert_eq!(color.to_string(), "green");
    }
}
