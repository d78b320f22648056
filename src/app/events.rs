//! Structured cycle events.
//!
//! The domain narrates each wake cycle through [`CycleEvent`]s pushed into
//! an [`EventSink`](super::ports::EventSink) instead of inline debug prints.
//! The production sink formats them to the serial log; tests collect them
//! in a `Vec` and assert on the sequence.

use crate::publish::{Decision, StateItem};
use crate::sampling::Envelope;
use crate::trigger::TriggerState;
use crate::wake::WakeCause;

/// One entry in the per-cycle narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// Boot observed, session restored.
    CycleStarted {
        cause: WakeCause,
        cycles_since_publish: u32,
    },
    /// Burst sampling finished.
    BurstCompleted { trap: Envelope, battery: Envelope },
    /// Booleans derived; `trap_forced` marks an edge-wake override.
    StatesEvaluated {
        states: TriggerState,
        trap_forced: bool,
    },
    /// Nothing changed and no heartbeat due — no network activity.
    DecisionIdle,
    /// Entering the PUBLISHING phase.
    PublishPhase { decision: Decision },
    /// Network link did not come up within the bounded wait.
    LinkFailed,
    /// Broker connection did not complete within the bounded wait.
    BrokerFailed,
    /// Link and broker both up — publish attempts will be issued.
    Connected,
    /// One state item acknowledged by the broker.
    Published {
        item: StateItem,
        payload: &'static str,
    },
    /// One state item exhausted its retry budget.
    PublishFailed { item: StateItem },
    /// Wake sources armed; deep sleep follows.
    SleepScheduled { secs: u32 },
}
