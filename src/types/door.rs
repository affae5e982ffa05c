// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door state type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// State of the nest's access door.
///
/// The door is controlled remotely (dashboard or operator client). A closed
/// door blocks the hen and the farmer from entering the nest, stalling the
/// guarded phase transitions of the simulation.
///
/// # Examples
///
/// ```
/// use nestor_lib::types::DoorState;
///
/// let door: DoorState = "closed".parse().unwrap();
/// assert_eq!(door, DoorState::Closed);
/// assert_eq!(door.as_str(), "closed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DoorState {
    /// The door is open; entry is possible.
    #[default]
    Open,
    /// The door is closed; entry is blocked.
    Closed,
}

impl DoorState {
    /// Returns the wire string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Returns `true` if the door is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DoorState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(ValueError::InvalidDoorState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_state_from_str() {
        assert_eq!("open".parse::<DoorState>().unwrap(), DoorState::Open);
        assert_eq!("CLOSED".parse::<DoorState>().unwrap(), DoorState::Closed);
    }

    #[test]
    fn door_state_from_str_invalid() {
        let result = "ajar".parse::<DoorState>();
        assert!(matches!(result, Err(ValueError::InvalidDoorState(_))));
    }

    #[test]
    fn door_state_display() {
        assert_eq!(DoorState::Open.to_string(), "open");
        assert_eq!(DoorState::Closed.to_string(), "closed");
    }

    #[test]
    fn default_is_open() {
        assert!(DoorState::default().is_open());
    }
}
