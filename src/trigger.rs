//! Trigger evaluator — pure threshold functions from envelope to booleans.
//!
//! Both decisions key off the burst **maximum**: a momentary spike inside
//! the window is sufficient to declare triggered/low.  This is the
//! debounce-via-burst-max policy — no averaging, no hysteresis band beyond
//! the burst itself.  The comparison is strict `>`.

use crate::sampling::Envelope;

/// Derived boolean states for one wake cycle.  Stateless — recomputed from
/// fresh envelopes every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    pub trap_triggered: bool,
    pub battery_low: bool,
}

/// Trap door closed over the LDR → light level spikes past the threshold.
pub fn is_trap_triggered(envelope: &Envelope, threshold: u16) -> bool {
    envelope.max_value > threshold
}

/// Battery pack's low-charge LED lit → its LDR spikes past the threshold.
pub fn is_battery_low(envelope: &Envelope, threshold: u16) -> bool {
    envelope.max_value > threshold
}

impl TriggerState {
    /// Evaluate both channels against their configured thresholds.
    pub fn evaluate(
        trap: &Envelope,
        battery: &Envelope,
        trap_threshold: u16,
        battery_threshold: u16,
    ) -> Self {
        Self {
            trap_triggered: is_trap_triggered(trap, trap_threshold),
            battery_low: is_battery_low(battery, battery_threshold),
        }
    }
}
