//! System configuration parameters.
//!
//! All tunable parameters for the TrapWatch firmware.  The core logic is
//! generic over these values — no behaviour depends on a specific number.

use serde::{Deserialize, Serialize};

/// Full-scale reading of the 12-bit ADC.  Envelope minima start here so any
/// real reading tightens at least one bound.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Which wake source configuration the scheduler arms before deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeMode {
    /// Timer-only wake with a short sleep period.  Trigger latency is up to
    /// one full sleep period, but no extra wiring is required.
    Poll,
    /// Level wake from the trap's own switch circuit, in parallel with a
    /// long heartbeat timer.  Near-immediate trigger reporting and much
    /// longer sleep intervals.
    EdgeWake,
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thresholds (raw 12-bit ADC counts, strict `>` comparison) ---
    /// Burst max above this → trap triggered.
    pub trap_threshold: u16,
    /// Burst max above this → battery low (indicator LED lit).
    pub battery_threshold: u16,

    // --- Burst sampling ---
    /// Total sampling window per wake cycle (milliseconds).
    pub burst_duration_ms: u32,
    /// Interval between samples within the burst (milliseconds).
    pub sample_interval_ms: u32,

    // --- Sleep / heartbeat ---
    /// Wake source selection.
    pub wake_mode: WakeMode,
    /// Deep-sleep duration between timer wakes (seconds).
    pub sleep_duration_secs: u32,
    /// Forced-publish heartbeat, expressed in wake cycles.
    pub heartbeat_cycles: u32,

    // --- Connection bounds ---
    /// Max polls while waiting for the network link to come up.
    pub link_wait_attempts: u32,
    /// Delay between link polls (milliseconds).
    pub link_wait_delay_ms: u32,
    /// Max polls while waiting for the broker connection.
    pub broker_wait_attempts: u32,
    /// Delay between broker polls (milliseconds).
    pub broker_wait_delay_ms: u32,

    // --- Publish retry ---
    /// Attempts per state item before giving up for this cycle.
    pub publish_attempts: u32,
    /// Delay between publish attempts (milliseconds).
    pub publish_retry_delay_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            trap_threshold: 3000,
            battery_threshold: 2500,

            // Burst sampling: 1 s window at 20 Hz
            burst_duration_ms: 1000,
            sample_interval_ms: 50,

            // Sleep / heartbeat: 60 s poll cycle, daily heartbeat
            wake_mode: WakeMode::Poll,
            sleep_duration_secs: 60,
            heartbeat_cycles: 1440,

            // Connection bounds: 15 s link wait, 10 s broker wait
            link_wait_attempts: 30,
            link_wait_delay_ms: 500,
            broker_wait_attempts: 5,
            broker_wait_delay_ms: 2000,

            // Publish retry
            publish_attempts: 3,
            publish_retry_delay_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Sleep duration for edge-wake builds.  The mechanical wake circuit
    /// reports triggers immediately, so the timer only has to cover the
    /// heartbeat — hours instead of seconds.
    pub const EDGE_WAKE_SLEEP_SECS: u32 = 6 * 3600;

    /// Effective deep-sleep duration for the configured wake mode.
    pub fn effective_sleep_secs(&self) -> u32 {
        match self.wake_mode {
            WakeMode::Poll => self.sleep_duration_secs,
            WakeMode::EdgeWake => Self::EDGE_WAKE_SLEEP_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Network identity — compile-time constants, overridable via environment
// ---------------------------------------------------------------------------

pub mod wifi {
    /// Station SSID.  `TRAPWATCH_WIFI_SSID` at build time.
    pub const SSID: &str = match option_env!("TRAPWATCH_WIFI_SSID") {
        Some(s) => s,
        None => "trapwatch-net",
    };
    pub const PASSWORD: &str = match option_env!("TRAPWATCH_WIFI_PASS") {
        Some(p) => p,
        None => "",
    };
}

pub mod mqtt {
    /// Broker URI.  `TRAPWATCH_BROKER` at build time, e.g. `mqtt://10.0.0.2`.
    pub const BROKER_URI: &str = match option_env!("TRAPWATCH_BROKER") {
        Some(uri) => uri,
        None => "mqtt://homeassistant.local",
    };
    pub const USERNAME: &str = match option_env!("TRAPWATCH_MQTT_USER") {
        Some(u) => u,
        None => "trapwatch",
    };
    pub const PASSWORD: &str = match option_env!("TRAPWATCH_MQTT_PASS") {
        Some(p) => p,
        None => "",
    };

    pub const TOPIC_TRAP: &str = "trapwatch/caught";
    pub const TOPIC_BATTERY: &str = "trapwatch/battery";
    pub const TOPIC_AVAILABILITY: &str = "trapwatch/availability";

    pub const PAYLOAD_ONLINE: &str = "online";
    pub const PAYLOAD_OFFLINE: &str = "offline";
}
