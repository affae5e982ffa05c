// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `NestoR` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! value validation, protocol communication (HTTP/MQTT), and payload parsing.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when simulating
/// or managing nest devices.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An operation required an authenticated platform session.
    #[error("not logged in to the platform")]
    NotLoggedIn,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create domain values from
/// invalid wire representations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An invalid door state string was provided.
    #[error("invalid door state: {0}")]
    InvalidDoorState(String),

    /// An unknown nest phase name was provided.
    #[error("unknown nest phase: {0}")]
    UnknownPhase(String),
}

/// Errors related to protocol communication (HTTP/MQTT).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the platform failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing platform payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Unexpected payload format.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidDoorState("ajar".to_string());
        assert_eq!(err.to_string(), "invalid door state: ajar");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::UnknownPhase("MOLTING".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::UnknownPhase(_))));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("token".to_string());
        assert_eq!(err.to_string(), "missing field in payload: token");
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::ChannelClosed("attribute stream".to_string());
        assert_eq!(err.to_string(), "channel closed: attribute stream");
    }
}
