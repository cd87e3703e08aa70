//! MQTT adapter.
//!
//! Maps broker topics onto command [`Endpoint`]s and publishes telemetry.
//!
//! | Topic                           | Direction | Meaning                  |
//! |---------------------------------|-----------|--------------------------|
//! | `fire_alarm/sensor_data`        | out       | JSON `TelemetryRecord`   |
//! | `fire_alarm/<actuator>/control` | in        | `on` / `off` / `toggle`  |
//! | `fire_alarm/<actuator>/mode`    | in        | `auto` / `manual`        |
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient`; the receive loop runs on
//!   its own thread and only submits into the [`CommandGateway`] inbox.
//! - **all other targets**: the topic map only.

use crate::app::commands::{Actuator, Endpoint, EndpointKind};
use crate::error::CommandError;

pub const TOPIC_TELEMETRY: &str = "fire_alarm/sensor_data";

const COMMAND_TOPICS: [(&str, Endpoint); 6] = [
    ("fire_alarm/fan/control", Endpoint::action(Actuator::Fan)),
    ("fire_alarm/fan/mode", Endpoint::mode(Actuator::Fan)),
    ("fire_alarm/pump/control", Endpoint::action(Actuator::Pump)),
    ("fire_alarm/pump/mode", Endpoint::mode(Actuator::Pump)),
    ("fire_alarm/buzzer/control", Endpoint::action(Actuator::Buzzer)),
    ("fire_alarm/buzzer/mode", Endpoint::mode(Actuator::Buzzer)),
];

/// Resolve an inbound topic.
pub fn endpoint_for_topic(topic: &str) -> Result<Endpoint, CommandError> {
    COMMAND_TOPICS
        .iter()
        .find(|(t, _)| *t == topic)
        .map(|(_, e)| *e)
        .ok_or(CommandError::UnknownTopic)
}

/// The topic an endpoint listens on.
pub fn topic_for(endpoint: Endpoint) -> &'static str {
    match (endpoint.actuator, endpoint.kind) {
        (Actuator::Fan, EndpointKind::Action) => "fire_alarm/fan/control",
        (Actuator::Fan, EndpointKind::Mode) => "fire_alarm/fan/mode",
        (Actuator::Pump, EndpointKind::Action) => "fire_alarm/pump/control",
        (Actuator::Pump, EndpointKind::Mode) => "fire_alarm/pump/mode",
        (Actuator::Buzzer, EndpointKind::Action) => "fire_alarm/buzzer/control",
        (Actuator::Buzzer, EndpointKind::Mode) => "fire_alarm/buzzer/mode",
    }
}

pub fn command_topics() -> impl Iterator<Item = &'static str> {
    COMMAND_TOPICS.iter().map(|(t, _)| *t)
}

#[cfg(target_os = "espidf")]
pub use esp_impl::{connect, run_receiver, MqttTelemetrySink, SharedClient};

#[cfg(target_os = "espidf")]
mod esp_impl {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{debug, info, warn};

    use super::{command_topics, endpoint_for_topic, TOPIC_TELEMETRY};
    use crate::app::events::TelemetryRecord;
    use crate::app::gateway::CommandGateway;
    use crate::app::ports::TelemetrySink;
    use crate::sync::Guarded;

    pub type SharedClient = Arc<Guarded<EspMqttClient<'static>>>;

    pub fn connect(
        broker_url: &str,
        client_id: &str,
    ) -> Result<(SharedClient, EspMqttConnection), EspError> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(broker_url, &conf)?;
        info!("MQTT: client '{}' -> {}", client_id, broker_url);
        Ok((Arc::new(Guarded::new(client)), conn))
    }

    fn subscribe_all(client: &SharedClient) {
        client.update(|c| {
            for topic in command_topics() {
                if let Err(e) = c.subscribe(topic, QoS::AtMostOnce) {
                    warn!("MQTT: subscribe {} failed: {}", topic, e);
                }
            }
        });
    }

    /// Receive loop.  Never returns; (re)subscribes on every connect and
    /// hands complete payloads to the gateway inbox.
    pub fn run_receiver(mut conn: EspMqttConnection, client: SharedClient, gateway: &CommandGateway) {
        loop {
            match conn.next() {
                Ok(event) => match event.payload() {
                    EventPayload::Connected(_) => {
                        info!("MQTT: connected");
                        subscribe_all(&client);
                    }
                    EventPayload::Disconnected => warn!("MQTT: disconnected"),
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        details: Details::Complete,
                        ..
                    } => match endpoint_for_topic(topic) {
                        Ok(endpoint) => {
                            // Full inbox or oversize payload is logged by the gateway.
                            let _ = gateway.submit(endpoint, data);
                        }
                        Err(e) => debug!("MQTT: {} on '{}'", e, topic),
                    },
                    _ => {}
                },
                Err(e) => {
                    warn!("MQTT: receive error: {:?}", e);
                    thread::sleep(Duration::from_secs(2));
                }
            }
        }
    }

    /// Publishes each record as JSON.  Failures are dropped; the next
    /// cycle sends a fresh record.
    pub struct MqttTelemetrySink {
        client: SharedClient,
    }

    impl MqttTelemetrySink {
        pub fn new(client: SharedClient) -> Self {
            Self { client }
        }
    }

    impl TelemetrySink for MqttTelemetrySink {
        fn publish(&mut self, record: &TelemetryRecord) {
            let body = match record.to_json() {
                Ok(b) => b,
                Err(e) => {
                    warn!("MQTT: telemetry encode failed: {}", e);
                    return;
                }
            };
            let res = self
                .client
                .update(|c| c.enqueue(TOPIC_TELEMETRY, QoS::AtMostOnce, false, body.as_bytes()));
            if let Err(e) = res {
                debug!("MQTT: telemetry dropped: {}", e);
            }
        }
    }
}
