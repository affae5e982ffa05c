// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Occupant identification tags.

use std::fmt;

/// RFID tag of whoever is currently detected inside the nest.
///
/// The simulated reader knows two fixed tags, one for the hen and one for
/// the farmer. Telemetry carries the raw UID string, with `"None"` standing
/// for an empty nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OccupantTag {
    /// Nobody is detected.
    #[default]
    None,
    /// The hen's tag is detected.
    Hen,
    /// The farmer's tag is detected.
    Farmer,
}

impl OccupantTag {
    /// UID reported for the hen's tag.
    pub const HEN_UID: &'static str = "9104EE5D";

    /// UID reported for the farmer's tag.
    pub const FARMER_UID: &'static str = "11580C5D";

    /// Returns the UID string carried in telemetry.
    #[must_use]
    pub const fn uid(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Hen => Self::HEN_UID,
            Self::Farmer => Self::FARMER_UID,
        }
    }

    /// Returns `true` if no tag is detected.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for OccupantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uid())
    }
}
