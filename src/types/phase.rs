// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nest phase type for the simulated laying cycle.
//!
//! The cycle is strictly cyclic: a hen arrives, lays eggs, a farmer
//! collects them, and the nest waits for the next hen. Each phase is a
//! closed enum variant so phase dispatch is checked at compile time.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// One phase of the nest's physical cycle.
///
/// Phases advance in a fixed cyclic order, wrapping after
/// [`NestPhase::FarmerCollecting`]:
///
/// ```text
/// WaitingForHen -> HenInside -> EggsDeposited -> FarmerCollecting -+
///       ^                                                          |
///       +----------------------------------------------------------+
/// ```
///
/// # Examples
///
/// ```
/// use nestor_lib::types::NestPhase;
///
/// let phase = NestPhase::WaitingForHen;
/// assert_eq!(phase.next(), NestPhase::HenInside);
/// assert_eq!(NestPhase::FarmerCollecting.next(), NestPhase::WaitingForHen);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NestPhase {
    /// The nest is empty, waiting for a hen to enter.
    #[default]
    WaitingForHen,
    /// A hen is inside the nest.
    HenInside,
    /// The hen has left; eggs remain in the nest.
    EggsDeposited,
    /// A farmer is collecting the eggs.
    FarmerCollecting,
}

impl NestPhase {
    /// Returns the phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::WaitingForHen => Self::HenInside,
            Self::HenInside => Self::EggsDeposited,
            Self::EggsDeposited => Self::FarmerCollecting,
            Self::FarmerCollecting => Self::WaitingForHen,
        }
    }

    /// Returns `true` if entering this phase requires the nest door to be
    /// open.
    ///
    /// Both the hen and the farmer pass through the door, so the
    /// `HenInside` and `FarmerCollecting` phases cannot be entered while
    /// the door is closed. The other two phases only involve movement out
    /// of the nest and are never gated.
    #[must_use]
    pub const fn requires_open_door(self) -> bool {
        matches!(self, Self::HenInside | Self::FarmerCollecting)
    }

    /// Returns the wire/log name of this phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForHen => "WAITING_FOR_HEN",
            Self::HenInside => "HEN_INSIDE",
            Self::EggsDeposited => "EGGS_DEPOSITED",
            Self::FarmerCollecting => "FARMER_COLLECTING",
        }
    }
}

impl fmt::Display for NestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NestPhase {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WAITING_FOR_HEN" => Ok(Self::WaitingForHen),
            "HEN_INSIDE" => Ok(Self::HenInside),
            "EGGS_DEPOSITED" => Ok(Self::EggsDeposited),
            "FARMER_COLLECTING" => Ok(Self::FarmerCollecting),
            _ => Err(ValueError::UnknownPhase(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_after_four_steps() {
        let mut phase = NestPhase::WaitingForHen;
        for _ in 0..4 {
            phase = phase.next();
        }
        assert_eq!(phase, NestPhase::WaitingForHen);
    }

    #[test]
    fn guarded_phases() {
        assert!(!NestPhase::WaitingForHen.requires_open_door());
        assert!(NestPhase::HenInside.requires_open_door());
        assert!(!NestPhase::EggsDeposited.requires_open_door());
        assert!(NestPhase::FarmerCollecting.requires_open_door());
    }

    #[test]
    fn phase_from_str() {
        assert_eq!(
            "hen_inside".parse::<NestPhase>().unwrap(),
            NestPhase::HenInside
        );
        assert_eq!(
            "EGGS_DEPOSITED".parse::<NestPhase>().unwrap(),
            NestPhase::EggsDeposited
        );
    }

    #[test]
    fn phase_from_str_invalid() {
        let result = "MOLTING".parse::<NestPhase>();
        assert!(matches!(result, Err(ValueError::UnknownPhase(_))));
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(NestPhase::WaitingForHen.to_string(), "WAITING_FOR_HEN");
        assert_eq!(NestPhase::FarmerCollecting.to_string(), "FARMER_COLLECTING");
    }
}
