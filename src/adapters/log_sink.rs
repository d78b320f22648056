//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing the cycle narrative to the ESP-IDF
//! logger (UART / USB-CDC in production).  Tests use a `Vec`-collecting
//! sink instead and assert on the event sequence.

use log::{info, warn};

use crate::app::events::CycleEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`CycleEvent`] to the serial console.
pub struct LogCycleSink;

impl LogCycleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogCycleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogCycleSink {
    fn emit(&mut self, event: &CycleEvent) {
        match event {
            CycleEvent::CycleStarted {
                cause,
                cycles_since_publish,
            } => {
                info!("CYCLE | wake={:?} cycles_since_publish={}", cause, cycles_since_publish);
            }
            CycleEvent::BurstCompleted { trap, battery } => {
                info!(
                    "BURST | trap=[{}..{}] battery=[{}..{}]",
                    trap.min_value, trap.max_value, battery.min_value, battery.max_value,
                );
            }
            CycleEvent::StatesEvaluated { states, trap_forced } => {
                info!(
                    "STATE | trap={} battery={}{}",
                    if states.trap_triggered { "TRIGGERED" } else { "ready" },
                    if states.battery_low { "LOW" } else { "ok" },
                    if *trap_forced { " (edge wake)" } else { "" },
                );
            }
            CycleEvent::DecisionIdle => {
                info!("IDLE  | no change, no heartbeat due");
            }
            CycleEvent::PublishPhase { decision } => {
                info!(
                    "PUB   | trap_changed={} battery_changed={} first_boot={} heartbeat={}",
                    decision.trap_changed,
                    decision.battery_changed,
                    decision.first_boot,
                    decision.heartbeat_due,
                );
            }
            CycleEvent::LinkFailed => {
                warn!("PUB   | network link failed, retrying next cycle");
            }
            CycleEvent::BrokerFailed => {
                warn!("PUB   | broker unreachable, retrying next cycle");
            }
            CycleEvent::Connected => {
                info!("PUB   | connected");
            }
            CycleEvent::Published { item, payload } => {
                info!("PUB   | {:?} -> '{}'", item, payload);
            }
            CycleEvent::PublishFailed { item } => {
                warn!("PUB   | {:?} publish exhausted its retries", item);
            }
            CycleEvent::SleepScheduled { secs } => {
                info!("SLEEP | {}s", secs);
            }
        }
    }
}
