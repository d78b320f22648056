//! Burst sampler — repeated reads over a fixed window reduced to a min/max
//! envelope per channel.
//!
//! A single instantaneous ADC read of an LDR is noisy: sunlight flicker,
//! shadows, and ADC jitter all move it.  The burst reduces a whole window of
//! readings to an envelope, and the trigger evaluator keys off the burst
//! **max** — one clean spike inside the window is enough to flip state.
//! Between samples the device drops into a low-power idle via
//! [`TimePort::idle_ms`], which changes power draw but not sampled values.

use crate::app::ports::{Channel, SamplerPort, TimePort};
use crate::config::ADC_FULL_SCALE;

/// Min/max envelope of one channel over one burst.  Created fresh each
/// burst, consumed immediately by the trigger evaluator, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub max_value: u16,
    pub min_value: u16,
}

impl Envelope {
    /// Starting bounds: max below and min above every possible reading, so
    /// any real sample tightens at least one of them.
    pub fn new() -> Self {
        Self {
            max_value: 0,
            min_value: ADC_FULL_SCALE,
        }
    }

    /// Fold one reading into the envelope.
    pub fn update(&mut self, reading: u16) {
        if reading > self.max_value {
            self.max_value = reading;
        }
        if reading < self.min_value {
            self.min_value = reading;
        }
    }

    /// Whether any reading was folded in.  An untouched envelope still has
    /// its inverted initial bounds.
    pub fn touched(&self) -> bool {
        self.max_value >= self.min_value
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample both channels at `sample_interval_ms` for `burst_duration_ms`,
/// tracking the running envelope per channel.
///
/// The `io` parameter satisfies **both** [`SamplerPort`] and [`TimePort`] —
/// this avoids a double mutable borrow while keeping the port boundary
/// explicit.  A failed read on one channel skips that channel's update for
/// the tick; it is not fatal and does not abort the burst.
pub fn sample_burst(
    io: &mut (impl SamplerPort + TimePort),
    burst_duration_ms: u32,
    sample_interval_ms: u32,
) -> (Envelope, Envelope) {
    let mut trap = Envelope::new();
    let mut battery = Envelope::new();

    let start = io.uptime_ms();
    while io.uptime_ms().saturating_sub(start) < u64::from(burst_duration_ms) {
        if let Ok(reading) = io.read(Channel::Trap) {
            trap.update(reading);
        }
        if let Ok(reading) = io.read(Channel::Battery) {
            battery.update(reading);
        }
        io.idle_ms(sample_interval_ms);
    }

    (trap, battery)
}
