//! WiFi station adapter — [`NetworkPort`] over the ESP-IDF WiFi driver.
//!
//! The radio stays cold until the publish engine asks for it: `bring_up`
//! installs the driver, associates, and polls (bounded) for an address;
//! `tear_down` disconnects, stops, and drops the driver so deep sleep sees
//! no live radio.  Each boot is a fresh bring-up — nothing survives deep
//! sleep, so there is no reconnect machinery here.
//!
//! On non-ESP targets the adapter is a scripted stub for host tests.

use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::config::SystemConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

#[cfg(target_os = "espidf")]
pub struct WifiLink {
    modem: Option<Modem>,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    wifi: Option<EspWifi<'static>>,
    wait_attempts: u32,
    wait_delay_ms: u32,
}

#[cfg(target_os = "espidf")]
impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &SystemConfig,
    ) -> Self {
        Self {
            modem: Some(modem),
            sysloop,
            nvs,
            wifi: None,
            wait_attempts: config.link_wait_attempts,
            wait_delay_ms: config.link_wait_delay_ms,
        }
    }

    fn client_configuration() -> Result<Configuration, CommsError> {
        use crate::config::wifi as creds;
        let auth = if creds::PASSWORD.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        Ok(Configuration::Client(ClientConfiguration {
            ssid: creds::SSID
                .try_into()
                .map_err(|_| CommsError::ClientSetupFailed)?,
            password: creds::PASSWORD
                .try_into()
                .map_err(|_| CommsError::ClientSetupFailed)?,
            auth_method: auth,
            ..Default::default()
        }))
    }
}

#[cfg(target_os = "espidf")]
impl NetworkPort for WifiLink {
    fn bring_up(&mut self) -> Result<(), CommsError> {
        // The modem is consumed by the driver; a second bring-up in the
        // same boot can only happen after tear_down, which keeps it.
        let Some(modem) = self.modem.take() else {
            return Err(CommsError::ClientSetupFailed);
        };

        let mut wifi = EspWifi::new(modem, self.sysloop.clone(), Some(self.nvs.clone()))
            .map_err(|_| CommsError::ClientSetupFailed)?;
        wifi.set_configuration(&Self::client_configuration()?)
            .map_err(|_| CommsError::ClientSetupFailed)?;
        wifi.start().map_err(|_| CommsError::ClientSetupFailed)?;
        if wifi.connect().is_err() {
            // Credentials rejected or no AP in range; the bounded poll
            // below would only waste its budget.
            drop(wifi);
            return Err(CommsError::LinkTimeout);
        }

        info!("wifi: associating with '{}'", crate::config::wifi::SSID);
        for _ in 0..self.wait_attempts {
            let up = wifi.is_up().unwrap_or(false);
            if up {
                let ip = wifi
                    .sta_netif()
                    .get_ip_info()
                    .map(|i| i.ip)
                    .unwrap_or(core::net::Ipv4Addr::UNSPECIFIED);
                info!("wifi: up, ip={}", ip);
                self.wifi = Some(wifi);
                return Ok(());
            }
            esp_idf_svc::hal::delay::FreeRtos::delay_ms(self.wait_delay_ms);
        }

        warn!(
            "wifi: not up after {} polls",
            self.wait_attempts
        );
        drop(wifi);
        Err(CommsError::LinkTimeout)
    }

    fn tear_down(&mut self) {
        if let Some(mut wifi) = self.wifi.take() {
            wifi.disconnect().ok();
            wifi.stop().ok();
            info!("wifi: down");
        }
        // Idempotent: nothing to do when the link never came up.
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct WifiLink {
    up: bool,
    sim_fail: bool,
    pub bring_up_calls: u32,
    pub tear_down_calls: u32,
}

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    pub fn new(_config: &SystemConfig) -> Self {
        Self {
            up: false,
            sim_fail: false,
            bring_up_calls: 0,
            tear_down_calls: 0,
        }
    }

    pub fn sim_fail_next(&mut self, fail: bool) {
        self.sim_fail = fail;
    }

    pub fn is_up(&self) -> bool {
        self.up
    }
}

#[cfg(not(target_os = "espidf"))]
impl NetworkPort for WifiLink {
    fn bring_up(&mut self) -> Result<(), CommsError> {
        self.bring_up_calls += 1;
        if self.sim_fail {
            warn!("wifi(sim): bring-up failed");
            return Err(CommsError::LinkTimeout);
        }
        self.up = true;
        info!("wifi(sim): up");
        Ok(())
    }

    fn tear_down(&mut self) {
        self.tear_down_calls += 1;
        if self.up {
            self.up = false;
            info!("wifi(sim): down");
        }
    }
}
