//! Persistent session state — the record that survives deep sleep.
//!
//! Deep sleep powers down everything except RTC slow memory, so this small
//! struct is the device's entire memory between wake cycles.  It is a plain
//! value owned by the boot path: restored from the retention adapter at
//! cycle start, passed `&mut` into the publish engine, written back before
//! sleep.  No ambient globals in the domain.
//!
//! Cold power-up zeroes the retention region, which is exactly the
//! [`PersistentSession::cold_boot`] state: `initialized == false` forces an
//! unconditional first publish regardless of sampled values.

use serde::{Deserialize, Serialize};

/// Retained across deep sleep; reset to [`cold_boot`](Self::cold_boot) on
/// full power loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentSession {
    /// Last trap boolean the broker has actually acknowledged.
    pub last_trap_state: bool,
    /// Last battery boolean the broker has actually acknowledged.
    pub last_battery_state: bool,
    /// False only until the first successful publish of the power session.
    pub initialized: bool,
    /// Wake cycles since the last connected PUBLISHING phase.  Drives the
    /// heartbeat; saturates instead of wrapping so an overflow can never
    /// spuriously look like a fresh publish.
    pub cycles_since_publish: u32,
}

impl PersistentSession {
    /// All-zero state, bit-identical to freshly powered-up RTC memory.
    pub const fn cold_boot() -> Self {
        Self {
            last_trap_state: false,
            last_battery_state: false,
            initialized: false,
            cycles_since_publish: 0,
        }
    }

    /// Count one more wake cycle without a connected publish phase.
    pub fn bump_cycle(&mut self) {
        self.cycles_since_publish = self.cycles_since_publish.saturating_add(1);
    }

    /// A connected PUBLISHING phase reached the point of issuing attempts.
    pub fn mark_publish_issued(&mut self) {
        self.cycles_since_publish = 0;
    }
}

impl Default for PersistentSession {
    fn default() -> Self {
        Self::cold_boot()
    }
}
