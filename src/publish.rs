//! Publish decision engine — decides whether a wake cycle pays for network
//! bring-up, and drives the publish sequence when it does.
//!
//! Two phases per cycle:
//!
//! 1. **Decide** ([`Decision::evaluate`]) — pure comparison of the fresh
//!    trigger state against the persisted session: any changed item, a cold
//!    boot, or an overdue heartbeat justifies connecting.
//! 2. **Publish** ([`PublishEngine::run`]) — bring up the link, connect the
//!    broker, publish trap then battery with per-item retry, tear everything
//!    down unconditionally.
//!
//! Persisted `last_*` booleans advance only on a confirmed publish of that
//! specific item, so a partial failure is retried by the ordinary
//! change-detection on the next connected cycle.  Connection failures mutate
//! nothing: the cycle ends, the device sleeps, and the unchanged condition
//! re-triggers the decision next wake (retry-by-redo).

use crate::app::events::CycleEvent;
use crate::app::ports::{EventSink, MessagingPort, NetworkPort, Qos, TimePort};
use crate::config::{SystemConfig, mqtt};
use crate::session::PersistentSession;
use crate::trigger::TriggerState;

// ---------------------------------------------------------------------------
// State items
// ---------------------------------------------------------------------------

/// The two independently published booleans.  Trap always goes first, but
/// each has its own retry budget and its own success/failure outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateItem {
    Trap,
    Battery,
}

impl StateItem {
    pub fn topic(self) -> &'static str {
        match self {
            Self::Trap => mqtt::TOPIC_TRAP,
            Self::Battery => mqtt::TOPIC_BATTERY,
        }
    }

    /// Retained payload for the given boolean.
    pub fn payload(self, state: bool) -> &'static str {
        match (self, state) {
            (Self::Trap, true) => "triggered",
            (Self::Trap, false) => "ready",
            (Self::Battery, true) => "low",
            (Self::Battery, false) => "ok",
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Why (or why not) this cycle connects.  IDLE when every flag is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub trap_changed: bool,
    pub battery_changed: bool,
    pub first_boot: bool,
    pub heartbeat_due: bool,
}

impl Decision {
    /// Compare fresh states against the persisted session.
    pub fn evaluate(
        session: &PersistentSession,
        states: &TriggerState,
        heartbeat_cycles: u32,
    ) -> Self {
        Self {
            trap_changed: states.trap_triggered != session.last_trap_state,
            battery_changed: states.battery_low != session.last_battery_state,
            first_boot: !session.initialized,
            heartbeat_due: session.cycles_since_publish >= heartbeat_cycles,
        }
    }

    /// IDLE → PUBLISHING transition condition.
    pub fn should_publish(&self) -> bool {
        self.trap_changed || self.battery_changed || self.first_boot || self.heartbeat_due
    }

    /// First boot and heartbeat force both items regardless of change.
    fn force_all(&self) -> bool {
        self.first_boot || self.heartbeat_due
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Transient result of one PUBLISHING phase.  Never stored — it has already
/// been folded into the session by the time `run` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOutcome {
    /// Link and broker both came up.
    pub connected: bool,
    pub trap_published: bool,
    pub battery_published: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives one PUBLISHING phase.  Holds only the retry tuning; all state
/// lives in the session passed through `run`.
pub struct PublishEngine {
    attempts: u32,
    retry_delay_ms: u32,
}

impl PublishEngine {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            attempts: config.publish_attempts.max(1),
            retry_delay_ms: config.publish_retry_delay_ms,
        }
    }

    /// Execute the PUBLISHING phase.
    ///
    /// The `link` parameter satisfies **both** [`NetworkPort`] and
    /// [`MessagingPort`] — the messaging client only ever runs on top of
    /// the link it shares an adapter with.  The heartbeat counter resets as
    /// soon as both connections succeed — tied to reaching the point of
    /// issuing attempts, not to any attempt succeeding.  Teardown always
    /// runs, in reverse bring-up order, and both collaborators tolerate
    /// teardown after partial bring-up.
    pub fn run(
        &self,
        session: &mut PersistentSession,
        states: &TriggerState,
        decision: &Decision,
        link: &mut (impl NetworkPort + MessagingPort),
        time: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        if link.bring_up().is_err() {
            sink.emit(&CycleEvent::LinkFailed);
            link.tear_down();
            return outcome;
        }

        if link.connect().is_err() {
            sink.emit(&CycleEvent::BrokerFailed);
            link.disconnect();
            link.tear_down();
            return outcome;
        }

        outcome.connected = true;
        session.mark_publish_issued();
        sink.emit(&CycleEvent::Connected);

        let force = decision.force_all();

        if decision.trap_changed || force {
            let payload = StateItem::Trap.payload(states.trap_triggered);
            if self.publish_with_retry(link, time, sink, StateItem::Trap, payload) {
                session.last_trap_state = states.trap_triggered;
                outcome.trap_published = true;
            }
        }

        if decision.battery_changed || force {
            let payload = StateItem::Battery.payload(states.battery_low);
            if self.publish_with_retry(link, time, sink, StateItem::Battery, payload) {
                session.last_battery_state = states.battery_low;
                outcome.battery_published = true;
            }
        }

        if outcome.trap_published || outcome.battery_published {
            session.initialized = true;
        }

        link.disconnect();
        link.tear_down();

        outcome
    }

    /// Up to `attempts` single publishes with a fixed inter-retry delay.
    fn publish_with_retry(
        &self,
        msg: &mut impl MessagingPort,
        time: &mut impl TimePort,
        sink: &mut impl EventSink,
        item: StateItem,
        payload: &'static str,
    ) -> bool {
        for attempt in 0..self.attempts {
            if attempt > 0 {
                time.delay_ms(self.retry_delay_ms);
            }
            if msg
                .publish(item.topic(), payload, Qos::AtLeastOnce, true)
                .is_ok()
            {
                sink.emit(&CycleEvent::Published { item, payload });
                return true;
            }
        }
        sink.emit(&CycleEvent::PublishFailed { item });
        false
    }
}
