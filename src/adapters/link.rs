//! Combined connectivity rig: WiFi link + MQTT client behind one value, so
//! the publish engine's single `impl NetworkPort + MessagingPort` parameter
//! is satisfied by production code the same way tests satisfy it with one
//! mock.

use crate::adapters::mqtt::MqttLink;
use crate::adapters::wifi::WifiLink;
use crate::app::ports::{MessagingPort, NetworkPort, Qos};
use crate::error::CommsError;

pub struct RadioLink {
    wifi: WifiLink,
    mqtt: MqttLink,
}

impl RadioLink {
    pub fn new(wifi: WifiLink, mqtt: MqttLink) -> Self {
        Self { wifi, mqtt }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn wifi_mut(&mut self) -> &mut WifiLink {
        &mut self.wifi
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn mqtt_mut(&mut self) -> &mut MqttLink {
        &mut self.mqtt
    }
}

impl NetworkPort for RadioLink {
    fn bring_up(&mut self) -> Result<(), CommsError> {
        self.wifi.bring_up()
    }

    fn tear_down(&mut self) {
        self.wifi.tear_down();
    }
}

impl MessagingPort for RadioLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.mqtt.connect()
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: Qos,
        retain: bool,
    ) -> Result<(), CommsError> {
        self.mqtt.publish(topic, payload, qos, retain)
    }

    fn disconnect(&mut self) {
        self.mqtt.disconnect();
    }
}
