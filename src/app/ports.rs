//! Port traits — the hexagonal boundary between domain logic and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CycleService (domain)
//! ```
//!
//! Driven adapters (ADC, WiFi, MQTT, sleep peripheral, LED, button)
//! implement these traits.  The [`CycleService`](super::service::CycleService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole wake cycle runs on the host under test.

use crate::error::{CommsError, SensorError};
use crate::wake::WakeCause;

// ───────────────────────────────────────────────────────────────
// Analog sampler port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// The two analog channels the sampler exposes.  Attenuation and resolution
/// are fixed at boot by the adapter; the domain only sees raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// LDR under the trap door.
    Trap,
    /// LDR facing the battery pack's low-charge indicator LED.
    Battery,
}

/// Read-side port: the domain calls this once per sample tick per channel.
pub trait SamplerPort {
    /// One raw ADC read.  A failure is non-fatal — the burst sampler skips
    /// the envelope update for that tick and carries on.
    fn read(&mut self, channel: Channel) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (monotonic clock + low-power idles)
// ───────────────────────────────────────────────────────────────

/// Wall-clock and delay services.  The distinction between [`idle_ms`] and
/// [`delay_ms`] matters on hardware: the former may drop into light sleep
/// (radio off), the latter must not because it runs while connected.
///
/// [`idle_ms`]: TimePort::idle_ms
/// [`delay_ms`]: TimePort::delay_ms
pub trait TimePort {
    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;

    /// Low-power idle between burst samples.  Resumes at a timer deadline;
    /// not observable by the domain except through [`uptime_ms`] advancing.
    ///
    /// [`uptime_ms`]: TimePort::uptime_ms
    fn idle_ms(&mut self, ms: u32);

    /// Plain busy delay — used for inter-retry spacing while the radio is up.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Network link port (WiFi station)
// ───────────────────────────────────────────────────────────────

/// Bounded-time network link control.  Brought up and torn down every
/// PUBLISHING phase — never kept warm across deep sleep.
pub trait NetworkPort {
    /// Associate and obtain an address, polling up to the configured bound.
    fn bring_up(&mut self) -> Result<(), CommsError>;

    /// Power the link down.  Idempotent: safe to call when the link never
    /// came up or is already down.
    fn tear_down(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Messaging client port (MQTT)
// ───────────────────────────────────────────────────────────────

/// Publish quality of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// Bounded-time messaging client.  `connect` registers a retained "offline"
/// last will and asserts retained "online" on success, so the broker always
/// knows whether the device died mid-phase.
pub trait MessagingPort {
    /// Create the client and wait (bounded) for the broker handshake.
    fn connect(&mut self) -> Result<(), CommsError>;

    /// Single publish attempt.  `Ok` means the broker acknowledged delivery
    /// (for QoS >= 1), not merely that the message was queued; `disconnect`
    /// may follow immediately.  Retry policy belongs to the core, not here.
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: Qos,
        retain: bool,
    ) -> Result<(), CommsError>;

    /// Stop and destroy the client.  Idempotent: safe after a failed or
    /// partial `connect`.
    fn disconnect(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Sleep/wake peripheral port
// ───────────────────────────────────────────────────────────────

/// Deep-sleep arming and entry.  `enter_deep_sleep` is terminal: execution
/// resumes as a fresh boot, not as a return from the call.
pub trait SleepPort {
    /// Arm the RTC timer wake source.
    fn arm_timer_wake(&mut self, secs: u32);

    /// Arm a level-sensitive wake on `gpio` (`wake_high` selects polarity).
    fn arm_edge_wake(&mut self, gpio: i32, wake_high: bool);

    /// Suspend the world.  No code executes until the next wake cause fires.
    fn enter_deep_sleep(&mut self) -> !;

    /// Why the chip booted.  Read-once, non-reentrant — call exactly once
    /// per boot and thread the value through the cycle.
    fn wake_cause(&mut self) -> WakeCause;
}

// ───────────────────────────────────────────────────────────────
// Status indicator port (LED)
// ───────────────────────────────────────────────────────────────

/// Purely observational — no feedback into the core logic.
pub trait IndicatorPort {
    fn set(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Button port (diagnostic entry)
// ───────────────────────────────────────────────────────────────

/// Boot-time button poll.  Only consulted during the diagnostic entry
/// window on cold boot.
pub trait ButtonPort {
    /// Instantaneous (already debounce-tolerant) pressed state.
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → structured log)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`CycleEvent`](super::events::CycleEvent)s
/// through this port.  Adapters decide where they go (serial log in
/// production, a `Vec` in tests).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::CycleEvent);
}
