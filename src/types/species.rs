// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Egg species classification.

use std::fmt;

/// Species of egg a nest is configured for.
///
/// The species is not stored anywhere on the platform; it is inferred from
/// the configured `avgWeight` reference attribute by matching against the
/// two known per-species averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EggSpecies {
    /// Hen eggs (average ~63 g).
    Hen,
    /// Quail eggs (average ~11 g).
    Quail,
    /// The configured average matches no known species.
    Unknown,
}

impl EggSpecies {
    /// Reference average weight of a hen egg in grams.
    pub const HEN_AVG_GRAMS: f64 = 63.0;

    /// Reference average weight of a quail egg in grams.
    pub const QUAIL_AVG_GRAMS: f64 = 11.0;

    /// Tolerance used when matching a configured average against the
    /// reference constants.
    pub const MATCH_TOLERANCE: f64 = 1e-3;

    /// Classifies a configured average egg weight.
    ///
    /// # Examples
    ///
    /// ```
    /// use nestor_lib::types::EggSpecies;
    ///
    /// assert_eq!(EggSpecies::from_average_weight(63.0), EggSpecies::Hen);
    /// assert_eq!(EggSpecies::from_average_weight(11.0), EggSpecies::Quail);
    /// assert_eq!(EggSpecies::from_average_weight(40.0), EggSpecies::Unknown);
    /// ```
    #[must_use]
    pub fn from_average_weight(avg_grams: f64) -> Self {
        if (avg_grams - Self::HEN_AVG_GRAMS).abs() < Self::MATCH_TOLERANCE {
            Self::Hen
        } else if (avg_grams - Self::QUAIL_AVG_GRAMS).abs() < Self::MATCH_TOLERANCE {
            Self::Quail
        } else {
            Self::Unknown
        }
    }

    /// Returns the display name of the species.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hen => "Hen",
            Self::Quail => "Quail",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EggSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_within_tolerance() {
        assert_eq!(EggSpecies::from_average_weight(63.0004), EggSpecies::Hen);
        assert_eq!(EggSpecies::from_average_weight(10.9995), EggSpecies::Quail);
    }

    #[test]
    fn classify_outside_tolerance() {
        assert_eq!(EggSpecies::from_average_weight(63.1), EggSpecies::Unknown);
        assert_eq!(EggSpecies::from_average_weight(0.0), EggSpecies::Unknown);
    }

    #[test]
    fn display_names() {
        assert_eq!(EggSpecies::Hen.to_string(), "Hen");
        assert_eq!(EggSpecies::Quail.to_string(), "Quail");
        assert_eq!(EggSpecies::Unknown.to_string(), "Unknown");
    }
}
