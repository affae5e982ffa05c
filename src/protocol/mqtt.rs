// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT device session for the IoT platform.
//!
//! Devices authenticate with their access token as the MQTT username and
//! use the platform's fixed topic pair:
//! - Telemetry out: `v1/devices/me/telemetry`
//! - Attribute updates in: `v1/devices/me/attributes`

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS, Transport};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{ProtocolError, Result};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Topic devices publish telemetry to.
pub const TELEMETRY_TOPIC: &str = "v1/devices/me/telemetry";

/// Topic devices receive attribute updates on.
pub const ATTRIBUTES_TOPIC: &str = "v1/devices/me/attributes";

/// A device's MQTT session with the platform.
///
/// Connecting spawns a background task that owns the `rumqttc` event loop
/// and forwards every attribute-update payload into the channel returned
/// alongside the link. When the event loop dies, the channel closes, which
/// the consumer observes as a `None` receive.
///
/// # Examples
///
/// ```no_run
/// use nestor_lib::protocol::DeviceLink;
///
/// # async fn example() -> nestor_lib::Result<()> {
/// let (link, mut attribute_rx) =
///     DeviceLink::connect("mqtts://iot.example.org:8883", "hNxbPHZG1A1Rft0LHAVO").await?;
///
/// link.publish_telemetry(&serde_json::json!({"weight": 130.0})).await?;
///
/// if let Some(payload) = attribute_rx.recv().await {
///     println!("attribute update: {}", String::from_utf8_lossy(&payload));
/// }
///
/// link.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceLink {
    client: AsyncClient,
}

impl DeviceLink {
    /// Connects to the platform's MQTT endpoint as a device.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - Endpoint address. `mqtts://` selects TLS (default
    ///   port 8883); `mqtt://` and `tcp://` select plain TCP (default
    ///   port 1883).
    /// * `access_token` - The device access token, sent as MQTT username.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be parsed or the subscription
    /// fails.
    pub async fn connect(
        broker_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> std::result::Result<(Self, mpsc::Receiver<Vec<u8>>), ProtocolError> {
        let broker_url = broker_url.into();
        let (host, port, tls) = parse_broker_url(&broker_url)?;

        // Unique client ID per connection (PID + counter).
        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("nestor_{}_{}", std::process::id(), counter);

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_credentials(access_token.into(), "");
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);
        if tls {
            mqtt_options.set_transport(Transport::tls_with_default_config());
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let (attribute_tx, attribute_rx) = mpsc::channel::<Vec<u8>>(16);

        client
            .subscribe(ATTRIBUTES_TOPIC, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;

        tokio::spawn(async move {
            handle_link_events(event_loop, attribute_tx).await;
        });

        // Let the broker process CONNECT and SUBSCRIBE before the first
        // telemetry publish; attribute updates sent during this window
        // would otherwise be missed on a clean session.
        tokio::time::sleep(Duration::from_millis(500)).await;

        Ok((Self { client }, attribute_rx))
    }

    /// Publishes a telemetry record as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the publish fails.
    pub async fn publish_telemetry<T: Serialize>(&self, record: &T) -> Result<()> {
        let payload =
            serde_json::to_vec(record).map_err(crate::error::ParseError::Json)?;

        tracing::debug!(topic = TELEMETRY_TOPIC, "publishing telemetry");

        self.client
            .publish(TELEMETRY_TOPIC, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)?;
        Ok(())
    }

    /// Disconnects the MQTT session.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .map_err(ProtocolError::Mqtt)?;
        Ok(())
    }
}

/// Parses a broker URL into host, port, and TLS selection.
fn parse_broker_url(url: &str) -> std::result::Result<(String, u16, bool), ProtocolError> {
    let (rest, tls, default_port) = if let Some(rest) = url.strip_prefix("mqtts://") {
        (rest, true, 8883)
    } else if let Some(rest) = url.strip_prefix("mqtt://") {
        (rest, false, 1883)
    } else if let Some(rest) = url.strip_prefix("tcp://") {
        (rest, false, 1883)
    } else {
        (url, false, 1883)
    };

    if rest.is_empty() {
        return Err(ProtocolError::InvalidAddress(url.to_string()));
    }

    let (host, port) = if let Some((h, p)) = rest.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (rest.to_string(), default_port)
    };

    Ok((host, port, tls))
}

/// Forwards attribute updates from the event loop into the channel.
async fn handle_link_events(mut event_loop: EventLoop, attribute_tx: mpsc::Sender<Vec<u8>>) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic == ATTRIBUTES_TOPIC {
                    tracing::debug!(topic = %publish.topic, "received attribute update");
                    if attribute_tx.send(publish.payload.to_vec()).await.is_err() {
                        // Receiver gone; the device shut down.
                        break;
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect) | Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                tracing::debug!("MQTT session disconnected");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                break;
            }
        }
    }
}
