// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remotely controlled nest settings.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::types::{DoorState, LedColor};

use super::NestCommand;

/// Default interval between telemetry emissions.
pub const DEFAULT_REPORT_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Fields {
    door: DoorState,
    led: LedColor,
    report_period: Duration,
}

/// The command-settable settings of a running nest.
///
/// Shared between the tick loop and the command handler. Each field is
/// read and written under a short-lived lock, so individual accesses are
/// atomic and the last write wins; there is deliberately no cross-field
/// transaction, matching how attribute updates arrive one key at a time.
///
/// Cloning is cheap and yields a handle to the same settings.
#[derive(Debug, Clone)]
pub struct NestControls {
    inner: Arc<RwLock<Fields>>,
}

impl NestControls {
    /// Creates controls with an open door, LED off, and the given report
    /// period.
    #[must_use]
    pub fn new(report_period: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Fields {
                door: DoorState::Open,
                led: LedColor::off(),
                report_period,
            })),
        }
    }

    /// Returns the current door state.
    #[must_use]
    pub fn door(&self) -> DoorState {
        self.inner.read().door
    }

    /// Sets the door state.
    pub fn set_door(&self, door: DoorState) {
        self.inner.write().door = door;
    }

    /// Returns the current LED color.
    #[must_use]
    pub fn led(&self) -> LedColor {
        self.inner.read().led.clone()
    }

    /// Sets the LED color.
    pub fn set_led(&self, led: LedColor) {
        self.inner.write().led = led;
    }

    /// Returns the current telemetry report period.
    #[must_use]
    pub fn report_period(&self) -> Duration {
        self.inner.read().report_period
    }

    /// Sets the telemetry report period.
    pub fn set_report_period(&self, period: Duration) {
        self.inner.write().report_period = period;
    }

    /// Applies every field present in a parsed command.
    pub fn apply(&self, command: &NestCommand) {
        if let Some(door) = command.door {
            tracing::info!(%door, "door command applied");
            self.set_door(door);
        }
        if let Some(led) = &command.led {
            tracing::info!(%led, "LED command applied");
            self.set_led(led.clone());
        }
        if let Some(period) = command.report_period {
            tracing::info!(?period, "report period command applied");
            self.set_report_period(period);
        }
    }
}

impl Default for NestControls {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_PERIOD)
    }
}
