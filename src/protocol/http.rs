// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the IoT platform's REST API.
//!
//! Two authentication paths coexist:
//! - the **operator session** logs in with username/password and holds a
//!   JWT used for the telemetry endpoints;
//! - the **device attribute endpoints** authenticate per request with the
//!   device's access token in the URL path and need no session.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::attributes::{AttributeScope, AttributeStore};
use crate::error::{Error, ParseError, ProtocolError, Result};
use crate::telemetry::TimeseriesMap;

// ============================================================================
// PlatformConfig
// ============================================================================

/// Configuration for a platform REST connection.
///
/// # Examples
///
/// ```
/// use nestor_lib::protocol::PlatformConfig;
/// use std::time::Duration;
///
/// let config = PlatformConfig::new("iot.example.org")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "https://iot.example.org");
/// ```
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    base_url: String,
    timeout: Duration,
}

impl PlatformConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given platform address.
    ///
    /// A bare hostname gets an `https://` scheme; explicit `http://` or
    /// `https://` prefixes are kept. Trailing slashes are stripped.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address
        } else {
            format!("https://{address}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates a [`PlatformClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> std::result::Result<PlatformClient, ProtocolError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(PlatformClient {
            base_url: self.base_url,
            client,
            token: None,
        })
    }
}

// ============================================================================
// PlatformClient
// ============================================================================

/// REST client for the IoT platform.
///
/// Cheap to clone; clones share the underlying connection pool but carry
/// their own copy of the session token, so log in before cloning.
///
/// # Examples
///
/// ```no_run
/// use nestor_lib::protocol::PlatformClient;
///
/// # async fn example() -> nestor_lib::Result<()> {
/// let mut client = PlatformClient::new("iot.example.org")?;
/// client.login("operator", "secret").await?;
/// assert!(client.is_logged_in());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PlatformClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl PlatformClient {
    /// Creates a client for the given platform address with defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(address: impl Into<String>) -> std::result::Result<Self, ProtocolError> {
        PlatformConfig::new(address).into_client()
    }

    /// Returns the base URL of the platform.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if an operator session token is held.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Authenticates the operator and stores the session token.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::AuthenticationFailed`] on rejected
    /// credentials, a protocol error on other transport failures, and a
    /// parse error if the response carries no token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/api/auth/login", self.base_url);
        let body = serde_json::json!({ "username": username, "password": password });

        tracing::debug!(url = %url, username, "logging in");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        let response = check_status(response)?;

        let data: Value = response.json().await.map_err(ProtocolError::Http)?;
        let token = data
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField("token".to_string()))?;

        self.token = Some(token.to_string());
        tracing::info!(username, "login successful");
        Ok(())
    }

    /// Drops the session token.
    pub fn logout(&mut self) {
        self.token = None;
        tracing::info!("session closed");
    }

    /// Fetches the latest telemetry values for a device.
    ///
    /// Requires a logged-in operator session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session, or a protocol or
    /// parse error if the request fails.
    pub async fn latest_telemetry(
        &self,
        device_id: Uuid,
        keys: &[&str],
    ) -> Result<TimeseriesMap> {
        let token = self.token.as_ref().ok_or(Error::NotLoggedIn)?;
        let url = format!(
            "{}/api/plugins/telemetry/DEVICE/{device_id}/values/timeseries",
            self.base_url
        );

        tracing::debug!(url = %url, "fetching latest telemetry");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("keys", keys.join(","))])
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        let response = check_status(response)?;

        let map = response.json().await.map_err(ProtocolError::Http)?;
        Ok(map)
    }

    /// Reads device attributes of one scope, filtered to the given keys.
    ///
    /// Returns the key/value pairs present in the store; requested keys
    /// that do not exist are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns a protocol or parse error if the request fails.
    pub async fn read_attributes(
        &self,
        access_token: &str,
        scope: AttributeScope,
        keys: &[&str],
    ) -> Result<serde_json::Map<String, Value>> {
        let url = format!("{}/api/v1/{access_token}/attributes", self.base_url);

        tracing::debug!(scope = %scope, ?keys, "reading attributes");

        let response = self
            .client
            .get(&url)
            .query(&[(scope.query_key(), keys.join(","))])
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        let response = check_status(response)?;

        let mut data: Value = response.json().await.map_err(ProtocolError::Http)?;
        match data.get_mut(scope.section()) {
            Some(section) => match section.take() {
                Value::Object(map) => Ok(map),
                other => Err(ParseError::UnexpectedFormat(format!(
                    "attribute section is not an object: {other}"
                ))
                .into()),
            },
            None => Ok(serde_json::Map::new()),
        }
    }

    /// Writes a flat attribute object through the device API.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the request fails.
    pub async fn write_attributes(&self, access_token: &str, body: &Value) -> Result<()> {
        let url = format!("{}/api/v1/{access_token}/attributes", self.base_url);

        tracing::debug!(body = %body, "writing attributes");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        check_status(response)?;
        Ok(())
    }

    /// Returns an [`AttributeStore`] view over one device's attributes.
    #[must_use]
    pub fn device_attributes<'a>(&'a self, access_token: &'a str) -> DeviceAttributes<'a> {
        DeviceAttributes {
            client: self,
            access_token,
        }
    }
}

/// Maps HTTP status codes to errors, passing successful responses through.
fn check_status(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, ProtocolError> {
    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProtocolError::AuthenticationFailed);
    }
    if !response.status().is_success() {
        return Err(ProtocolError::ConnectionFailed(format!(
            "HTTP {} - {}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("Unknown")
        )));
    }
    Ok(response)
}

/// One device's attribute store, addressed by its access token.
///
/// This is the transport implementation behind the write-verify
/// procedure.
#[derive(Debug, Clone, Copy)]
pub struct DeviceAttributes<'a> {
    client: &'a PlatformClient,
    access_token: &'a str,
}

impl AttributeStore for DeviceAttributes<'_> {
    async fn read(&self, scope: AttributeScope, key: &str) -> Result<Option<Value>> {
        let mut map = self
            .client
            .read_attributes(self.access_token, scope, &[key])
            .await?;
        Ok(map.remove(key))
    }

    async fn write(&self, body: &Value) -> Result<()> {
        self.client.write_attributes(self.access_token, body).await
    }
}
