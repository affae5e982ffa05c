// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound remote commands.
//!
//! Commands arrive as attribute-update messages on the device's attribute
//! topic. The platform delivers plain attribute objects, and RPC-style
//! deliveries wrap the same object in a `params` envelope; both shapes are
//! accepted. Any subset of the known keys may be present. Unknown keys are
//! ignored silently; payloads that fail to parse are rejected as a whole
//! (logged and discarded by the caller) and never touch the running state.

use std::time::Duration;

use serde_json::Value;

use crate::error::ParseError;
use crate::types::{DoorState, LedColor};

/// A parsed remote command carrying any subset of the settable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestCommand {
    /// New door state, from the `door` key.
    pub door: Option<DoorState>,
    /// New LED color, from the `rgb` key.
    pub led: Option<LedColor>,
    /// New report period, from the `period` key (delivered in
    /// milliseconds, stored as a duration).
    pub report_period: Option<Duration>,
}

impl NestCommand {
    /// Parses a raw attribute-update payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the payload is not a JSON object or if
    /// one of the known keys carries an unusable value.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_slice(payload)?;

        // RPC deliveries nest the attribute object under "params".
        let params = value.get("params").unwrap_or(&value);
        let object = params.as_object().ok_or_else(|| {
            ParseError::UnexpectedFormat("command payload is not an object".to_string())
        })?;

        let mut command = Self::default();

        if let Some(raw) = object.get("door") {
            let text = raw.as_str().ok_or_else(|| ParseError::InvalidValue {
                field: "door".to_string(),
                message: "expected a string".to_string(),
            })?;
            command.door = Some(text.parse().map_err(|err| ParseError::InvalidValue {
                field: "door".to_string(),
                message: format!("{err}"),
            })?);
        }

        if let Some(raw) = object.get("rgb") {
            let text = raw.as_str().ok_or_else(|| ParseError::InvalidValue {
                field: "rgb".to_string(),
                message: "expected a string".to_string(),
            })?;
            command.led = Some(LedColor::from(text));
        }

        if let Some(raw) = object.get("period") {
            let millis = raw
                .as_u64()
                .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| ParseError::InvalidValue {
                    field: "period".to_string(),
                    message: "expected milliseconds".to_string(),
                })?;
            command.report_period = Some(Duration::from_millis(millis));
        }

        Ok(command)
    }

    /// Returns `true` if no known key was present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.door.is_none() && self.led.is_none() && self.report_period.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_attribute_update() {
        let command = NestCommand::parse(br#"{"door": "closed"}"#).unwrap();
        assert_eq!(command.door, Some(DoorState::Closed));
        assert!(command.led.is_none());
        assert!(command.report_period.is_none());
    }

    #[test]
    fn parses_rpc_envelope() {
        let command =
            NestCommand::parse(br#"{"method": "setState", "params": {"rgb": "green"}}"#).unwrap();
        assert_eq!(command.led, Some(LedColor::from("green")));
    }

    #[test]
    fn parses_all_fields_together() {
        let command =
            NestCommand::parse(br#"{"door": "open", "rgb": "red", "period": 5000}"#).unwrap();
        assert_eq!(command.door, Some(DoorState::Open));
        assert_eq!(command.led, Some(LedColor::from("red")));
        assert_eq!(command.report_period, Some(Duration::from_secs(5)));
    }

    #[test]
    fn period_arrives_in_milliseconds() {
        let command = NestCommand::parse(br#"{"period": 2500}"#).unwrap();
        assert_eq!(command.report_period, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn period_accepts_numeric_strings() {
        let command = NestCommand::parse(br#"{"period": "10000"}"#).unwrap();
        assert_eq!(command.report_period, Some(Duration::from_secs(10)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let command = NestCommand::parse(br#"{"fanSpeed": 3, "door": "open"}"#).unwrap();
        assert_eq!(command.door, Some(DoorState::Open));
    }

    #[test]
    fn unknown_keys_only_yields_empty_command() {
        let command = NestCommand::parse(br#"{"fanSpeed": 3}"#).unwrap();
        assert!(command.is_empty());
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(NestCommand::parse(b"not json").is_err());
        assert!(NestCommand::parse(br#"["door"]"#).is_err());
    }

    #[test]
    fn invalid_door_value_rejects_the_payload() {
        let result = NestCommand::parse(br#"{"door": "ajar"}"#);
        assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
    }

    #[test]
    fn non_numeric_period_rejects_the_payload() {
        let result = NestCommand::parse(br#"{"period": "soon"}"#);
        assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
    }
}
