//! MQTT messaging adapter — [`MessagingPort`] over the ESP-IDF MQTT client.
//!
//! `connect` creates the client with a retained "offline" last will on the
//! availability topic, waits (bounded) for the broker handshake, then
//! asserts retained "online".  Between LWT and the retained state topics
//! the broker always holds a coherent picture of a device that spends
//! almost all of its life in deep sleep.
//!
//! At QoS 1 the client task transmits asynchronously after `publish`
//! enqueues, so the adapter waits (bounded) for the broker's delivery ack
//! before reporting success — `Ok` from [`MessagingPort::publish`] means
//! the message left the device, not merely that it was queued.  Without
//! that wait, `disconnect` dropping the client would destroy any messages
//! still sitting in the outbox.
//!
//! `disconnect` drops the client, which stops the task and closes the
//! socket; safe to call whether or not `connect` ever succeeded.

use log::{info, warn};

use crate::app::ports::{MessagingPort, Qos};
use crate::config::{SystemConfig, mqtt};
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    EspMqttClient, EventPayload, LwtConfiguration, MessageId, MqttClientConfiguration, QoS,
};

/// Budget for the broker's delivery ack on a QoS >= 1 publish.
#[cfg(target_os = "espidf")]
const ACK_WAIT_ATTEMPTS: u32 = 40;
#[cfg(target_os = "espidf")]
const ACK_POLL_MS: u32 = 50;

/// Poll `done` up to `attempts` times, pausing between polls.  The last
/// poll is not followed by a pause.
#[cfg(any(target_os = "espidf", test))]
fn wait_until(attempts: u32, mut done: impl FnMut() -> bool, mut pause: impl FnMut()) -> bool {
    for attempt in 0..attempts {
        if done() {
            return true;
        }
        if attempt + 1 < attempts {
            pause();
        }
    }
    false
}

#[cfg(target_os = "espidf")]
fn qos_to_idf(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
        Qos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

#[cfg(target_os = "espidf")]
pub struct MqttLink {
    client: Option<EspMqttClient<'static>>,
    connected: Arc<AtomicBool>,
    acked: Arc<Mutex<Vec<MessageId>>>,
    wait_attempts: u32,
    wait_delay_ms: u32,
}

#[cfg(target_os = "espidf")]
impl MqttLink {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            acked: Arc::new(Mutex::new(Vec::new())),
            wait_attempts: config.broker_wait_attempts,
            wait_delay_ms: config.broker_wait_delay_ms,
        }
    }
}

#[cfg(target_os = "espidf")]
impl MessagingPort for MqttLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connected.store(false, Ordering::SeqCst);
        // Fresh ack ledger per connection; stale ids from a previous
        // client must not satisfy this session's delivery waits.
        self.acked = Arc::new(Mutex::new(Vec::new()));

        let conf = MqttClientConfiguration {
            client_id: Some("trapwatch"),
            username: if mqtt::USERNAME.is_empty() {
                None
            } else {
                Some(mqtt::USERNAME)
            },
            password: if mqtt::PASSWORD.is_empty() {
                None
            } else {
                Some(mqtt::PASSWORD)
            },
            lwt: Some(LwtConfiguration {
                topic: mqtt::TOPIC_AVAILABILITY,
                payload: mqtt::PAYLOAD_OFFLINE.as_bytes(),
                qos: QoS::AtLeastOnce,
                retain: true,
            }),
            ..Default::default()
        };

        let connected = self.connected.clone();
        let acked = self.acked.clone();
        let mut client = EspMqttClient::new_cb(mqtt::BROKER_URI, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => connected.store(true, Ordering::SeqCst),
                EventPayload::Disconnected => connected.store(false, Ordering::SeqCst),
                EventPayload::Published(id) => {
                    if let Ok(mut acked) = acked.lock() {
                        acked.push(id);
                    }
                }
                _ => {}
            }
        })
        .map_err(|_| CommsError::ClientSetupFailed)?;

        let connected = self.connected.clone();
        let handshake = wait_until(
            self.wait_attempts,
            || connected.load(Ordering::SeqCst),
            || esp_idf_svc::hal::delay::FreeRtos::delay_ms(self.wait_delay_ms),
        );
        if !handshake {
            warn!("mqtt: no broker handshake after {} polls", self.wait_attempts);
            drop(client);
            return Err(CommsError::BrokerTimeout);
        }

        info!("mqtt: connected to {}", mqtt::BROKER_URI);
        // Flip the retained availability flag the will would clear.
        client
            .publish(
                mqtt::TOPIC_AVAILABILITY,
                QoS::AtLeastOnce,
                true,
                mqtt::PAYLOAD_ONLINE.as_bytes(),
            )
            .ok();
        self.client = Some(client);
        Ok(())
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: Qos,
        retain: bool,
    ) -> Result<(), CommsError> {
        let Some(client) = self.client.as_mut() else {
            return Err(CommsError::PublishFailed);
        };
        if !self.connected.load(Ordering::SeqCst) {
            return Err(CommsError::PublishFailed);
        }
        let id = client
            .publish(topic, qos_to_idf(qos), retain, payload.as_bytes())
            .map_err(|_| CommsError::PublishFailed)?;

        if matches!(qos, Qos::AtMostOnce) {
            // Fire-and-forget; there is no ack to wait for.
            return Ok(());
        }

        // `publish` only enqueued the message; hold here until the broker
        // acks it, or a later `disconnect` could drop the client task with
        // the message still in its outbox.
        let acked = self.acked.clone();
        let delivered = wait_until(
            ACK_WAIT_ATTEMPTS,
            || acked.lock().map(|ids| ids.contains(&id)).unwrap_or(false),
            || esp_idf_svc::hal::delay::FreeRtos::delay_ms(ACK_POLL_MS),
        );
        if delivered {
            Ok(())
        } else {
            warn!("mqtt: no delivery ack for msg {} on '{}'", id, topic);
            Err(CommsError::PublishFailed)
        }
    }

    fn disconnect(&mut self) {
        if self.client.take().is_some() {
            info!("mqtt: client stopped");
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct MqttLink {
    connected: bool,
    sim_refuse: bool,
    sim_fail_publishes: u32,
    pub published: Vec<(String, String, bool)>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttLink {
    pub fn new(_config: &SystemConfig) -> Self {
        Self {
            connected: false,
            sim_refuse: false,
            sim_fail_publishes: 0,
            published: Vec::new(),
        }
    }

    /// Next `connect` fails with a broker timeout.
    pub fn sim_refuse_connect(&mut self, refuse: bool) {
        self.sim_refuse = refuse;
    }

    /// The next `n` publish attempts fail.
    pub fn sim_fail_publishes(&mut self, n: u32) {
        self.sim_fail_publishes = n;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(not(target_os = "espidf"))]
impl MessagingPort for MqttLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        if self.sim_refuse {
            warn!("mqtt(sim): broker refused");
            return Err(CommsError::BrokerTimeout);
        }
        self.connected = true;
        info!("mqtt(sim): connected");
        Ok(())
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        _qos: Qos,
        retain: bool,
    ) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::PublishFailed);
        }
        if self.sim_fail_publishes > 0 {
            self.sim_fail_publishes -= 1;
            return Err(CommsError::PublishFailed);
        }
        self.published
            .push((topic.to_owned(), payload.to_owned(), retain));
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            info!("mqtt(sim): disconnected");
        }
        self.connected = false;
    }
}
