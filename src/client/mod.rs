// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level operator client for one nest device.
//!
//! [`NestClient`] pairs a platform REST session with one device's
//! credentials and exposes the typed attribute operations: door control,
//! temperature/humidity thresholds, location, egg reference weights, and
//! the shared read-only values. Every mutation goes through the
//! write-verify procedure and reports whether the new value was actually
//! observed.

use serde_json::Value;
use uuid::Uuid;

use crate::attributes::{
    AttributeScope, AttributeWrite, CompositeReport, WriteReport, value_as_f64, value_as_string,
    write_and_verify, write_and_verify_all,
};
use crate::error::Result;
use crate::protocol::{DeviceAttributes, PlatformClient};
use crate::telemetry::{TELEMETRY_KEYS, TimeseriesMap};
use crate::types::{DoorState, EggSpecies, LedColor};

/// Attribute keys used by nest devices.
mod keys {
    pub const DOOR: &str = "door";
    pub const RGB: &str = "rgb";
    pub const EGGS: &str = "eggs";
    pub const MAX_TEMP: &str = "maxTemp";
    pub const MIN_TEMP: &str = "minTemp";
    pub const MAX_HUM: &str = "maxHum";
    pub const MIN_HUM: &str = "minHum";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const AVG_WEIGHT: &str = "avgWeight";
    pub const MIN_WEIGHT: &str = "minWeight";
}

/// Identity of one registered nest device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCredentials {
    device_id: Uuid,
    access_token: String,
}

impl DeviceCredentials {
    /// Creates credentials from the platform's device ID and access token.
    #[must_use]
    pub fn new(device_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            device_id,
            access_token: access_token.into(),
        }
    }

    /// Returns the platform device ID.
    #[must_use]
    pub fn device_id(&self) -> Uuid {
        self.device_id
    }

    /// Returns the device access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Which temperature threshold to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureLimit {
    /// Upper alert threshold (`maxTemp`).
    Max,
    /// Lower alert threshold (`minTemp`).
    Min,
}

impl TemperatureLimit {
    /// Returns the attribute key for this threshold.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Max => keys::MAX_TEMP,
            Self::Min => keys::MIN_TEMP,
        }
    }
}

/// Which humidity threshold to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityLimit {
    /// Upper alert threshold (`maxHum`).
    Max,
    /// Lower alert threshold (`minHum`).
    Min,
}

impl HumidityLimit {
    /// Returns the attribute key for this threshold.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Max => keys::MAX_HUM,
            Self::Min => keys::MIN_HUM,
        }
    }
}

/// A max/min threshold pair. Unset keys come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThresholdPair {
    /// Upper threshold, if configured.
    pub max: Option<f64>,
    /// Lower threshold, if configured.
    pub min: Option<f64>,
}

/// Configured geographic position. Unset keys come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

/// Configured egg reference weights. Unset keys come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightReferences {
    /// Average egg weight in grams (`avgWeight`).
    pub average_grams: Option<f64>,
    /// Minimum accepted egg weight in grams (`minWeight`).
    pub minimum_grams: Option<f64>,
}

/// Operator-side client for one nest device.
///
/// # Examples
///
/// ```no_run
/// use nestor_lib::client::{DeviceCredentials, NestClient};
/// use nestor_lib::protocol::PlatformClient;
/// use nestor_lib::types::DoorState;
/// use uuid::Uuid;
///
/// # async fn example() -> nestor_lib::Result<()> {
/// let platform = PlatformClient::new("iot.example.org")?;
/// let credentials = DeviceCredentials::new(Uuid::new_v4(), "hNxbPHZG1A1Rft0LHAVO");
/// let nest = NestClient::new(platform, credentials);
///
/// let report = nest.set_door(DoorState::Closed).await;
/// if !report.verified() {
///     eprintln!("door change not confirmed: {report}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NestClient {
    platform: PlatformClient,
    credentials: DeviceCredentials,
}

impl NestClient {
    /// Creates a client for one device.
    #[must_use]
    pub fn new(platform: PlatformClient, credentials: DeviceCredentials) -> Self {
        Self {
            platform,
            credentials,
        }
    }

    /// Returns the underlying platform session.
    #[must_use]
    pub fn platform(&self) -> &PlatformClient {
        &self.platform
    }

    /// Returns the device credentials.
    #[must_use]
    pub fn credentials(&self) -> &DeviceCredentials {
        &self.credentials
    }

    fn store(&self) -> DeviceAttributes<'_> {
        self.platform
            .device_attributes(self.credentials.access_token())
    }

    // ========== Door ==========

    /// Reads the current door state from the shared scope.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the stored value is not a
    /// valid door state.
    pub async fn door(&self) -> Result<Option<DoorState>> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Shared,
                &[keys::DOOR],
            )
            .await?;
        match map.remove(keys::DOOR) {
            Some(value) => Ok(Some(value_as_string(&value).parse::<DoorState>()?)),
            None => Ok(None),
        }
    }

    /// Sets the door state and confirms the change.
    pub async fn set_door(&self, state: DoorState) -> WriteReport {
        let write = AttributeWrite::text(AttributeScope::Shared, keys::DOOR, state.as_str());
        write_and_verify(&self.store(), &write).await
    }

    // ========== Temperature thresholds ==========

    /// Reads the configured temperature thresholds.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn temperature_limits(&self) -> Result<ThresholdPair> {
        self.threshold_pair(keys::MAX_TEMP, keys::MIN_TEMP).await
    }

    /// Sets one temperature threshold and confirms the change.
    pub async fn set_temperature_limit(&self, limit: TemperatureLimit, value: f64) -> WriteReport {
        let write = AttributeWrite::numeric(AttributeScope::Client, limit.key(), value);
        write_and_verify(&self.store(), &write).await
    }

    // ========== Humidity thresholds ==========

    /// Reads the configured humidity thresholds.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn humidity_limits(&self) -> Result<ThresholdPair> {
        self.threshold_pair(keys::MAX_HUM, keys::MIN_HUM).await
    }

    /// Sets one humidity threshold and confirms the change.
    pub async fn set_humidity_limit(&self, limit: HumidityLimit, value: f64) -> WriteReport {
        let write = AttributeWrite::numeric(AttributeScope::Client, limit.key(), value);
        write_and_verify(&self.store(), &write).await
    }

    // ========== Location ==========

    /// Reads the configured coordinates.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn location(&self) -> Result<Location> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Client,
                &[keys::LATITUDE, keys::LONGITUDE],
            )
            .await?;
        Ok(Location {
            latitude: map.remove(keys::LATITUDE).as_ref().and_then(value_as_f64),
            longitude: map.remove(keys::LONGITUDE).as_ref().and_then(value_as_f64),
        })
    }

    /// Sets both coordinates and confirms each independently.
    pub async fn set_location(&self, latitude: f64, longitude: f64) -> CompositeReport {
        let writes = [
            AttributeWrite::numeric(AttributeScope::Client, keys::LATITUDE, latitude),
            AttributeWrite::numeric(AttributeScope::Client, keys::LONGITUDE, longitude),
        ];
        write_and_verify_all(&self.store(), &writes).await
    }

    // ========== Egg reference weights ==========

    /// Reads the configured egg reference weights.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn weight_references(&self) -> Result<WeightReferences> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Client,
                &[keys::AVG_WEIGHT, keys::MIN_WEIGHT],
            )
            .await?;
        Ok(WeightReferences {
            average_grams: map.remove(keys::AVG_WEIGHT).as_ref().and_then(value_as_f64),
            minimum_grams: map.remove(keys::MIN_WEIGHT).as_ref().and_then(value_as_f64),
        })
    }

    /// Sets both egg reference weights and confirms each independently.
    pub async fn set_weight_references(
        &self,
        average_grams: f64,
        minimum_grams: f64,
    ) -> CompositeReport {
        let writes = [
            AttributeWrite::numeric(AttributeScope::Client, keys::AVG_WEIGHT, average_grams),
            AttributeWrite::numeric(AttributeScope::Client, keys::MIN_WEIGHT, minimum_grams),
        ];
        write_and_verify_all(&self.store(), &writes).await
    }

    /// Classifies the species this nest is configured for.
    ///
    /// Pure function of the already-stored `avgWeight`; an unset or
    /// unmatched average yields [`EggSpecies::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns error if the attribute read fails.
    pub async fn egg_species(&self) -> Result<EggSpecies> {
        let references = self.weight_references().await?;
        Ok(references
            .average_grams
            .map_or(EggSpecies::Unknown, EggSpecies::from_average_weight))
    }

    // ========== Shared read-only values ==========

    /// Reads the egg count reported by the device.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn egg_count(&self) -> Result<Option<u32>> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Shared,
                &[keys::EGGS],
            )
            .await?;
        Ok(map.remove(keys::EGGS).as_ref().and_then(value_as_u32))
    }

    /// Reads the LED color shown on the device.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn led_color(&self) -> Result<Option<LedColor>> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Shared,
                &[keys::RGB],
            )
            .await?;
        Ok(map
            .remove(keys::RGB)
            .map(|value| LedColor::from(value_as_string(&value))))
    }

    // ========== Telemetry ==========

    /// Fetches the latest telemetry values for this device.
    ///
    /// Requires a logged-in platform session.
    ///
    /// # Errors
    ///
    /// Returns error if there is no session or the request fails.
    pub async fn latest_telemetry(&self) -> Result<TimeseriesMap> {
        self.platform
            .latest_telemetry(self.credentials.device_id(), &TELEMETRY_KEYS)
            .await
    }

    /// Runs an arbitrary prepared write through the verify procedure.
    ///
    /// Escape hatch for keys this client has no typed method for.
    pub async fn write_attribute(&self, write: &AttributeWrite) -> WriteReport {
        write_and_verify(&self.store(), write).await
    }

    async fn threshold_pair(&self, max_key: &str, min_key: &str) -> Result<ThresholdPair> {
        let mut map = self
            .platform
            .read_attributes(
                self.credentials.access_token(),
                AttributeScope::Client,
                &[max_key, min_key],
            )
            .await?;
        Ok(ThresholdPair {
            max: map.remove(max_key).as_ref().and_then(value_as_f64),
            min: map.remove(min_key).as_ref().and_then(value_as_f64),
        })
    }
}

/// Coerces a platform value to a small count.
fn value_as_u32(value: &Value) -> Option<u32> {
    let n = value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
    u32::try_from(n).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_keys() {
        assert_eq!(TemperatureLimit::Max.key(), "maxTemp");
        assert_eq!(TemperatureLimit::Min.key(), "minTemp");
        assert_eq!(HumidityLimit::Max.key(), "maxHum");
        assert_eq!(HumidityLimit::Min.key(), "minHum");
    }

    #[test]
    fn credentials_accessors() {
        let id = Uuid::new_v4();
        let creds = DeviceCredentials::new(id, "tok");
        assert_eq!(creds.device_id(), id);
        assert_eq!(creds.access_token(), "tok");
    }

    #[test]
    fn value_as_u32_coerces() {
        assert_eq!(value_as_u32(&Value::from(2)), Some(2));
        assert_eq!(value_as_u32(&Value::from("3")), Some(3));
        assert_eq!(value_as_u32(&Value::from("many")), None);
        assert_eq!(value_as_u32(&Value::from(-1)), None);
    }
}
