// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nest simulator runner.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::error::{ProtocolError, Result};
use crate::protocol::DeviceLink;
use crate::sim::{NestCommand, NestControls, NestState};

/// A running nest device: the cycle state machine wired to an MQTT
/// session.
///
/// The runner publishes a one-time startup diagnostic, then loops: advance
/// the state machine one tick, publish a telemetry snapshot, and wait out
/// the report period. Attribute updates arriving during the wait are
/// applied immediately; a changed report period takes effect on the next
/// interval.
///
/// # Examples
///
/// ```no_run
/// use nestor_lib::sim::NestSimulator;
///
/// # async fn example() -> nestor_lib::Result<()> {
/// let mut sim =
///     NestSimulator::connect("mqtts://iot.example.org:8883", "hNxbPHZG1A1Rft0LHAVO", "NEST1")
///         .await?;
///
/// // Run until the transport fails, then release the session.
/// let result = sim.run().await;
/// sim.shutdown().await?;
/// result
/// # }
/// ```
#[derive(Debug)]
pub struct NestSimulator {
    name: String,
    link: DeviceLink,
    commands: mpsc::Receiver<Vec<u8>>,
    controls: NestControls,
    state: NestState,
    rng: StdRng,
}

impl NestSimulator {
    /// Connects the device session and prepares a fresh nest.
    ///
    /// # Errors
    ///
    /// Returns error if the MQTT connection fails.
    pub async fn connect(
        broker_url: impl Into<String>,
        access_token: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let (link, commands) = DeviceLink::connect(broker_url, access_token).await?;
        let mut rng = StdRng::from_entropy();
        let state = NestState::new(&mut rng);

        Ok(Self {
            name: name.into(),
            link,
            commands,
            controls: NestControls::default(),
            state,
            rng,
        })
    }

    /// Returns a handle to the command-settable controls.
    ///
    /// Useful for wiring local overrides or inspection next to the remote
    /// command path.
    #[must_use]
    pub fn controls(&self) -> NestControls {
        self.controls.clone()
    }

    /// Returns the nest's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the simulation until the transport fails.
    ///
    /// # Errors
    ///
    /// Returns error if publishing fails or the attribute stream closes
    /// (the event loop died).
    pub async fn run(&mut self) -> Result<()> {
        self.link
            .publish_telemetry(&serde_json::json!({ "init": "started" }))
            .await?;
        tracing::info!(nest = %self.name, "simulation started");

        loop {
            if let Some(entered) = self.state.tick(&mut self.rng, self.controls.door()) {
                tracing::info!(nest = %self.name, phase = %entered, "transitioning");
            }

            let reading = self.state.snapshot(&mut self.rng);
            tracing::debug!(
                nest = %self.name,
                temperature = reading.temperature,
                humidity = reading.humidity,
                weight = reading.weight,
                uid = %reading.uid,
                "telemetry"
            );
            self.link.publish_telemetry(&reading).await?;

            self.wait_for_next_tick().await?;
        }
    }

    /// Waits out the report period, applying commands as they arrive.
    async fn wait_for_next_tick(&mut self) -> Result<()> {
        let sleep = tokio::time::sleep(self.controls.report_period());
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return Ok(()),
                payload = self.commands.recv() => match payload {
                    Some(payload) => self.handle_command(&payload),
                    None => {
                        return Err(ProtocolError::ChannelClosed(
                            "attribute stream".to_string(),
                        )
                        .into());
                    }
                },
            }
        }
    }

    /// Parses and applies one inbound payload. Malformed payloads are
    /// logged and discarded; they never stop the loop.
    fn handle_command(&self, payload: &[u8]) {
        match NestCommand::parse(payload) {
            Ok(command) if command.is_empty() => {
                tracing::debug!(nest = %self.name, "attribute update carried no known key");
            }
            Ok(command) => self.controls.apply(&command),
            Err(err) => {
                tracing::warn!(nest = %self.name, error = %err, "discarding malformed command");
            }
        }
    }

    /// Disconnects the device session.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn shutdown(self) -> Result<()> {
        tracing::info!(nest = %self.name, "shutting down");
        self.link.disconnect().await
    }
}
