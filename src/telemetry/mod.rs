// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry records.
//!
//! The device side publishes [`TelemetryReading`] snapshots every report
//! interval. The operator side reads the same keys back through the
//! platform's timeseries API as a [`TimeseriesMap`].

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::OccupantTag;

/// Telemetry keys a nest publishes.
pub const TELEMETRY_KEYS: [&str; 4] = ["temperature", "humidity", "weight", "uid"];

/// Rounds to two decimal places, the precision used on the wire.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One telemetry snapshot published by a nest.
///
/// Ambient temperature and humidity are synthetic readings drawn fresh on
/// every emission; weight and UID reflect the simulation's current phase.
///
/// # Examples
///
/// ```
/// use nestor_lib::telemetry::TelemetryReading;
/// use nestor_lib::types::OccupantTag;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let reading = TelemetryReading::sample(&mut rng, 195.0, OccupantTag::None);
/// assert!((21.0..=24.0).contains(&reading.temperature));
/// assert!((40.0..=60.0).contains(&reading.humidity));
/// assert_eq!(reading.uid, "None");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Ambient temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Sensed mass on the nest floor in grams.
    pub weight: f64,
    /// UID of the detected occupant tag, or `"None"`.
    pub uid: String,
}

impl TelemetryReading {
    /// Ambient temperature range in degrees Celsius.
    pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 21.0..=24.0;

    /// Ambient humidity range in percent.
    pub const HUMIDITY_RANGE: std::ops::RangeInclusive<f64> = 40.0..=60.0;

    /// Samples a snapshot for the given weight and occupant.
    pub fn sample<R: Rng>(rng: &mut R, weight_grams: f64, occupant: OccupantTag) -> Self {
        Self {
            temperature: round2(rng.gen_range(Self::TEMPERATURE_RANGE)),
            humidity: round2(rng.gen_range(Self::HUMIDITY_RANGE)),
            weight: weight_grams,
            uid: occupant.uid().to_string(),
        }
    }
}

/// One point of a timeseries returned by the platform.
///
/// The platform reports values as strings regardless of their original
/// type, so accessors coerce on demand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeseriesPoint {
    /// Server-side timestamp in milliseconds since the Unix epoch.
    pub ts: i64,
    /// Recorded value.
    pub value: serde_json::Value,
}

impl TimeseriesPoint {
    /// Returns the point's timestamp as a UTC datetime.
    ///
    /// Returns `None` if the millisecond timestamp is out of chrono's
    /// representable range.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.ts).single()
    }

    /// Returns the value as a float, coercing numeric strings.
    #[must_use]
    pub fn value_f64(&self) -> Option<f64> {
        crate::attributes::value_as_f64(&self.value)
    }

    /// Returns the value coerced to a string.
    #[must_use]
    pub fn value_string(&self) -> String {
        crate::attributes::value_as_string(&self.value)
    }
}

/// Latest-values timeseries response, keyed by telemetry name.
pub type TimeseriesMap = HashMap<String, Vec<TimeseriesPoint>>;
