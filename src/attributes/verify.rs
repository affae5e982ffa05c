// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write-then-verify procedure for remote attribute mutations.
//!
//! The platform's attribute store is eventually consistent: a write
//! acknowledged with HTTP 200 may not be visible to an immediate read.
//! Every mutation therefore goes through the same procedure: issue the
//! write, then poll the key until the desired value is observed or the
//! attempt budget runs out.
//!
//! The procedure is implemented once and parametrized by key, desired
//! value, comparison mode, attempt budget, and inter-attempt delay. Door
//! state, temperature/humidity thresholds, coordinates, and egg reference
//! weights all go through [`write_and_verify`].

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use super::{AttributeScope, AttributeStore, value_as_f64, value_as_string};

/// Default number of read-back attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before each read-back attempt.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Absolute tolerance for numeric comparisons.
pub const NUMERIC_TOLERANCE: f64 = 1e-3;

/// How an observed value is compared against the desired one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Parse both sides as floats and match within [`NUMERIC_TOLERANCE`].
    ///
    /// Falls back to string equality for an attempt where either side does
    /// not parse as a number.
    Numeric,
    /// Exact string equality after coercion to string.
    Text,
}

impl CompareMode {
    /// Returns `true` if `current` matches `desired` under this mode.
    #[must_use]
    pub fn matches(self, current: &Value, desired: &Value) -> bool {
        match self {
            Self::Numeric => match (value_as_f64(current), value_as_f64(desired)) {
                (Some(a), Some(b)) => (a - b).abs() < NUMERIC_TOLERANCE,
                _ => value_as_string(current) == value_as_string(desired),
            },
            Self::Text => value_as_string(current) == value_as_string(desired),
        }
    }
}

/// One attribute mutation to perform and confirm.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nestor_lib::attributes::{AttributeScope, AttributeWrite};
///
/// let write = AttributeWrite::numeric(AttributeScope::Client, "maxTemp", 25.0)
///     .with_attempts(5)
///     .with_delay(Duration::from_secs(1));
/// assert_eq!(write.key(), "maxTemp");
/// ```
#[derive(Debug, Clone)]
pub struct AttributeWrite {
    scope: AttributeScope,
    key: String,
    desired: Value,
    mode: CompareMode,
    max_attempts: u32,
    delay: Duration,
}

impl AttributeWrite {
    /// Creates a numeric-mode write.
    #[must_use]
    pub fn numeric(scope: AttributeScope, key: impl Into<String>, desired: f64) -> Self {
        Self::new(scope, key, desired.into(), CompareMode::Numeric)
    }

    /// Creates a text-mode write.
    #[must_use]
    pub fn text(scope: AttributeScope, key: impl Into<String>, desired: impl Into<String>) -> Self {
        Self::new(scope, key, Value::String(desired.into()), CompareMode::Text)
    }

    /// Creates a write with an explicit comparison mode and raw value.
    #[must_use]
    pub fn new(
        scope: AttributeScope,
        key: impl Into<String>,
        desired: Value,
        mode: CompareMode,
    ) -> Self {
        Self {
            scope,
            key: key.into(),
            desired,
            mode,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }

    /// Overrides the read-back attempt budget.
    #[must_use]
    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Overrides the delay before each read-back attempt.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the scope the key is read back from.
    #[must_use]
    pub fn scope(&self) -> AttributeScope {
        self.scope
    }

    /// Returns the target key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the desired value.
    #[must_use]
    pub fn desired(&self) -> &Value {
        &self.desired
    }

    /// Returns the flat write body for this single mutation.
    #[must_use]
    pub fn body(&self) -> Value {
        serde_json::json!({ self.key.clone(): self.desired.clone() })
    }
}

/// Terminal state of one write-verify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The desired value was observed on read-back.
    Verified {
        /// Read attempts spent, including the matching one.
        attempts: u32,
    },
    /// The write was accepted but never observed within the budget.
    Unverified {
        /// Read attempts spent.
        attempts: u32,
    },
    /// The write request itself failed; no reads were attempted.
    WriteFailed {
        /// Transport error description.
        reason: String,
    },
}

/// Result of a single-key write-verify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    key: String,
    outcome: WriteOutcome,
}

impl WriteReport {
    /// Returns the mutated key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the terminal outcome.
    #[must_use]
    pub fn outcome(&self) -> &WriteOutcome {
        &self.outcome
    }

    /// Returns `true` if the desired value was observed.
    #[must_use]
    pub fn verified(&self) -> bool {
        matches!(self.outcome, WriteOutcome::Verified { .. })
    }
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            WriteOutcome::Verified { attempts } => write!(
                f,
                "{} updated (verified after {attempts} attempt{})",
                self.key,
                if *attempts == 1 { "" } else { "s" }
            ),
            WriteOutcome::Unverified { attempts } => write!(
                f,
                "{} update sent but verification failed after {attempts} attempts",
                self.key
            ),
            WriteOutcome::WriteFailed { reason } => {
                write!(f, "{} write failed: {reason}", self.key)
            }
        }
    }
}

/// Result of a composite (multi-key) mutation.
///
/// A composite mutation issues one write carrying all fields, then runs the
/// verification loop per field. It counts as verified only when every field
/// verified; otherwise the display names the verified and failed subsets so
/// a caller can retry just the failed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeReport {
    reports: Vec<WriteReport>,
}

impl CompositeReport {
    /// Returns the per-field reports in write order.
    #[must_use]
    pub fn reports(&self) -> &[WriteReport] {
        &self.reports
    }

    /// Returns `true` only if every field verified.
    #[must_use]
    pub fn verified(&self) -> bool {
        self.reports.iter().all(WriteReport::verified)
    }

    /// Returns the keys that verified.
    #[must_use]
    pub fn verified_keys(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.verified())
            .map(WriteReport::key)
            .collect()
    }

    /// Returns the keys that did not verify.
    #[must_use]
    pub fn failed_keys(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| !r.verified())
            .map(WriteReport::key)
            .collect()
    }
}

impl fmt::Display for CompositeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for report in &self.reports {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            let status = if report.verified() {
                "verified"
            } else {
                "failed"
            };
            write!(f, "{} {status}", report.key())?;
        }
        Ok(())
    }
}

/// Performs one attribute mutation and confirms it converged.
///
/// The write is issued unconditionally. If the write request fails, the
/// report carries [`WriteOutcome::WriteFailed`] and no read is attempted.
/// Otherwise the key is polled up to the write's attempt budget, sleeping
/// the configured delay before each read; the first match wins and the
/// remaining attempts are not spent. Read failures are swallowed and count
/// against the budget.
pub async fn write_and_verify<S: AttributeStore>(store: &S, write: &AttributeWrite) -> WriteReport {
    let body = write.body();
    if let Err(err) = store.write(&body).await {
        tracing::warn!(key = write.key(), error = %err, "attribute write failed");
        return WriteReport {
            key: write.key.clone(),
            outcome: WriteOutcome::WriteFailed {
                reason: err.to_string(),
            },
        };
    }
    tracing::debug!(key = write.key(), "attribute write sent");

    WriteReport {
        key: write.key.clone(),
        outcome: poll_until_observed(store, write).await,
    }
}

/// Performs a composite mutation: one write carrying every field, then an
/// independent verification loop per field, sequentially in write order.
pub async fn write_and_verify_all<S: AttributeStore>(
    store: &S,
    writes: &[AttributeWrite],
) -> CompositeReport {
    let mut body = serde_json::Map::new();
    for write in writes {
        body.insert(write.key.clone(), write.desired.clone());
    }

    if let Err(err) = store.write(&Value::Object(body)).await {
        let reason = err.to_string();
        tracing::warn!(error = %reason, "composite attribute write failed");
        return CompositeReport {
            reports: writes
                .iter()
                .map(|w| WriteReport {
                    key: w.key.clone(),
                    outcome: WriteOutcome::WriteFailed {
                        reason: reason.clone(),
                    },
                })
                .collect(),
        };
    }

    let mut reports = Vec::with_capacity(writes.len());
    for write in writes {
        reports.push(WriteReport {
            key: write.key.clone(),
            outcome: poll_until_observed(store, write).await,
        });
    }
    CompositeReport { reports }
}

/// Polls the store until the desired value is observed or the attempt
/// budget is exhausted.
async fn poll_until_observed<S: AttributeStore>(store: &S, write: &AttributeWrite) -> WriteOutcome {
    for attempt in 1..=write.max_attempts {
        tokio::time::sleep(write.delay).await;

        match store.read(write.scope, &write.key).await {
            Ok(Some(current)) if write.mode.matches(&current, &write.desired) => {
                tracing::info!(key = write.key(), %current, "attribute verified");
                return WriteOutcome::Verified { attempts: attempt };
            }
            Ok(current) => {
                tracing::debug!(key = write.key(), attempt, ?current, "not yet converged");
            }
            Err(err) => {
                tracing::warn!(key = write.key(), attempt, error = %err, "verification read failed");
            }
        }
    }

    tracing::warn!(
        key = write.key(),
        attempts = write.max_attempts,
        "verification budget exhausted"
    );
    WriteOutcome::Unverified {
        attempts: write.max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::{Error, ProtocolError};

    use super::*;

    /// Read script entry for the fake store.
    enum Read {
        Value(Option<Value>),
        Fail,
    }

    /// In-memory store with a scripted sequence of read responses.
    ///
    /// The last script entry repeats once the queue drains.
    struct ScriptedStore {
        reads: Mutex<VecDeque<Read>>,
        read_count: AtomicU32,
        write_count: AtomicU32,
        fail_writes: bool,
    }

    impl ScriptedStore {
        fn new(reads: Vec<Read>) -> Self {
            Self {
                reads: Mutex::new(reads.into()),
                read_count: AtomicU32::new(0),
                write_count: AtomicU32::new(0),
                fail_writes: false,
            }
        }

        fn failing_writes() -> Self {
            let mut store = Self::new(vec![]);
            store.fail_writes = true;
            store
        }

        fn reads_performed(&self) -> u32 {
            self.read_count.load(Ordering::SeqCst)
        }
    }

    impl AttributeStore for ScriptedStore {
        async fn read(&self, _scope: AttributeScope, _key: &str) -> Result<Option<Value>, Error> {
            self.read_count.fetch_add(1, Ordering::SeqCst);
            let mut reads = self.reads.lock().unwrap();
            let entry = if reads.len() > 1 {
                reads.pop_front().unwrap()
            } else {
                match reads.front() {
                    Some(Read::Value(v)) => Read::Value(v.clone()),
                    Some(Read::Fail) => Read::Fail,
                    None => Read::Value(None),
                }
            };
            match entry {
                Read::Value(v) => Ok(v),
                Read::Fail => Err(Error::Protocol(ProtocolError::ConnectionFailed(
                    "scripted read failure".to_string(),
                ))),
            }
        }

        async fn write(&self, _body: &Value) -> Result<(), Error> {
            self.write_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(Error::Protocol(ProtocolError::ConnectionFailed(
                    "scripted write failure".to_string(),
                )));
            }
            Ok(())
        }
    }

    fn quick(write: AttributeWrite) -> AttributeWrite {
        write.with_delay(Duration::from_millis(1))
    }

    #[test]
    fn numeric_mode_matches_within_tolerance() {
        let desired = Value::from(23.5);
        assert!(CompareMode::Numeric.matches(&Value::from(23.5004), &desired));
        assert!(!CompareMode::Numeric.matches(&Value::from(23.502), &desired));
    }

    #[test]
    fn numeric_mode_parses_string_values() {
        let desired = Value::from(50.0);
        assert!(CompareMode::Numeric.matches(&Value::from("50.0005"), &desired));
    }

    #[test]
    fn numeric_mode_falls_back_to_text() {
        let desired = Value::from("NaN-ish");
        assert!(CompareMode::Numeric.matches(&Value::from("NaN-ish"), &desired));
        assert!(!CompareMode::Numeric.matches(&Value::from("other"), &desired));
    }

    #[test]
    fn text_mode_coerces_numbers() {
        assert!(CompareMode::Text.matches(&Value::from(5), &Value::from("5")));
        assert!(!CompareMode::Text.matches(&Value::from("open"), &Value::from("closed")));
    }

    #[tokio::test]
    async fn verifies_on_second_attempt() {
        let store = ScriptedStore::new(vec![
            Read::Value(Some(Value::from(19.0))),
            Read::Value(Some(Value::from(23.5004))),
        ]);
        let write = quick(AttributeWrite::numeric(
            AttributeScope::Client,
            "maxTemp",
            23.5,
        ));

        let report = write_and_verify(&store, &write).await;

        assert_eq!(report.outcome(), &WriteOutcome::Verified { attempts: 2 });
        assert_eq!(store.reads_performed(), 2);
    }

    #[tokio::test]
    async fn exhausts_budget_and_reports_attempts() {
        let store = ScriptedStore::new(vec![Read::Value(Some(Value::from("open")))]);
        let write = quick(AttributeWrite::text(
            AttributeScope::Shared,
            "door",
            "closed",
        ));

        let report = write_and_verify(&store, &write).await;

        assert_eq!(report.outcome(), &WriteOutcome::Unverified { attempts: 3 });
        assert_eq!(store.reads_performed(), 3);
        assert!(report.to_string().contains("failed after 3 attempts"));
    }

    #[tokio::test]
    async fn write_failure_short_circuits() {
        let store = ScriptedStore::failing_writes();
        let write = quick(AttributeWrite::text(
            AttributeScope::Shared,
            "door",
            "open",
        ));

        let report = write_and_verify(&store, &write).await;

        assert!(matches!(
            report.outcome(),
            WriteOutcome::WriteFailed { .. }
        ));
        assert_eq!(store.reads_performed(), 0);
    }

    #[tokio::test]
    async fn read_failures_consume_the_budget() {
        let store = ScriptedStore::new(vec![
            Read::Fail,
            Read::Value(Some(Value::from(7.25))),
        ]);
        let write = quick(AttributeWrite::numeric(
            AttributeScope::Client,
            "minHum",
            7.25,
        ));

        let report = write_and_verify(&store, &write).await;

        assert_eq!(report.outcome(), &WriteOutcome::Verified { attempts: 2 });
    }

    #[tokio::test]
    async fn first_match_stops_polling() {
        let store = ScriptedStore::new(vec![Read::Value(Some(Value::from("closed")))]);
        let write = quick(AttributeWrite::text(
            AttributeScope::Shared,
            "door",
            "closed",
        ));

        let report = write_and_verify(&store, &write).await;

        assert_eq!(report.outcome(), &WriteOutcome::Verified { attempts: 1 });
        assert_eq!(store.reads_performed(), 1);
    }

    #[tokio::test]
    async fn composite_reports_partial_success() {
        // latitude converges immediately; longitude never does
        let store = ScriptedStore::new(vec![
            Read::Value(Some(Value::from(40.4168))),
            Read::Value(Some(Value::from(0.0))),
        ]);
        let writes = [
            quick(AttributeWrite::numeric(
                AttributeScope::Client,
                "latitude",
                40.4168,
            )),
            quick(AttributeWrite::numeric(
                AttributeScope::Client,
                "longitude",
                -3.7038,
            )),
        ];

        let report = write_and_verify_all(&store, &writes).await;

        assert!(!report.verified());
        assert_eq!(report.verified_keys(), vec!["latitude"]);
        assert_eq!(report.failed_keys(), vec!["longitude"]);
        assert_eq!(report.to_string(), "latitude verified, longitude failed");
        // one POST carried both fields
        assert_eq!(store.write_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn composite_write_failure_marks_every_field() {
        let store = ScriptedStore::failing_writes();
        let writes = [
            quick(AttributeWrite::numeric(
                AttributeScope::Client,
                "avgWeight",
                63.0,
            )),
            quick(AttributeWrite::numeric(
                AttributeScope::Client,
                "minWeight",
                53.0,
            )),
        ];

        let report = write_and_verify_all(&store, &writes).await;

        assert!(!report.verified());
        assert_eq!(store.reads_performed(), 0);
        assert!(report
            .reports()
            .iter()
            .all(|r| matches!(r.outcome(), WriteOutcome::WriteFailed { .. })));
    }

    #[tokio::test]
    async fn missing_key_never_verifies() {
        let store = ScriptedStore::new(vec![Read::Value(None)]);
        let write = quick(AttributeWrite::numeric(
            AttributeScope::Client,
            "maxTemp",
            25.0,
        ));

        let report = write_and_verify(&store, &write).await;

        assert_eq!(report.outcome(), &WriteOutcome::Unverified { attempts: 3 });
    }
}
