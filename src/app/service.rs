//! Cycle service — the hexagonal core.
//!
//! [`CycleService`] orchestrates one complete wake cycle: burst-sample,
//! evaluate triggers, decide, optionally publish, and finally arm the next
//! wake and suspend.  All I/O flows through port traits injected at call
//! sites, making the entire cycle testable with mock adapters.
//!
//! ```text
//!  SamplerPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  TimePort ─────▶ │        CycleService        │
//!  NetworkPort ◀──│  burst · trigger · publish  │
//!  MessagingPort ◀─└────────────────────────────┘
//! ```
//!
//! The whole cycle is single-threaded and fully synchronous; the only
//! suspension points are the sampler's inter-sample idle and the bounded
//! waits inside the connectivity adapters.

use log::info;

use crate::config::SystemConfig;
use crate::publish::{Decision, PublishEngine, PublishOutcome};
use crate::sampling::sample_burst;
use crate::session::PersistentSession;
use crate::trigger::TriggerState;
use crate::wake::{WakeCause, WakeStrategy};

use super::events::CycleEvent;
use super::ports::{EventSink, MessagingPort, NetworkPort, SamplerPort, SleepPort, TimePort};

/// Everything one wake cycle produced, for the caller's logging and LED.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub states: TriggerState,
    pub decision: Decision,
    /// `None` when the cycle stayed IDLE.
    pub outcome: Option<PublishOutcome>,
}

/// Orchestrates the sample → decide → publish sequence for one wake cycle.
pub struct CycleService {
    config: SystemConfig,
    strategy: WakeStrategy,
    engine: PublishEngine,
}

impl CycleService {
    pub fn new(config: SystemConfig, strategy: WakeStrategy) -> Self {
        let engine = PublishEngine::new(&config);
        Self {
            config,
            strategy,
            engine,
        }
    }

    pub fn strategy(&self) -> WakeStrategy {
        self.strategy
    }

    /// Run one full wake cycle.
    ///
    /// `session` is the RTC-restored state; the caller writes it back to
    /// retention memory after this returns.  `hw` satisfies both
    /// [`SamplerPort`] and [`TimePort`]; `link` satisfies both
    /// [`NetworkPort`] and [`MessagingPort`].
    pub fn run_cycle(
        &self,
        session: &mut PersistentSession,
        cause: WakeCause,
        hw: &mut (impl SamplerPort + TimePort),
        link: &mut (impl NetworkPort + MessagingPort),
        sink: &mut impl EventSink,
    ) -> CycleReport {
        sink.emit(&CycleEvent::CycleStarted {
            cause,
            cycles_since_publish: session.cycles_since_publish,
        });

        // 1. Burst-sample both channels.
        let (trap_env, battery_env) = sample_burst(
            hw,
            self.config.burst_duration_ms,
            self.config.sample_interval_ms,
        );
        sink.emit(&CycleEvent::BurstCompleted {
            trap: trap_env,
            battery: battery_env,
        });

        // 2. Derive booleans.  An edge wake means the trap's own circuit
        // already told us — the envelope is bypassed for that channel.
        let mut states = TriggerState::evaluate(
            &trap_env,
            &battery_env,
            self.config.trap_threshold,
            self.config.battery_threshold,
        );
        let trap_forced = self.strategy.forces_trap_trigger(cause);
        if trap_forced {
            states.trap_triggered = true;
        }
        sink.emit(&CycleEvent::StatesEvaluated {
            states,
            trap_forced,
        });

        // 3. Decide against the persisted session, then count this cycle.
        let decision = Decision::evaluate(session, &states, self.config.heartbeat_cycles);
        session.bump_cycle();

        // 4. Publish phase, if justified.
        let outcome = if decision.should_publish() {
            sink.emit(&CycleEvent::PublishPhase { decision });
            Some(
                self.engine
                    .run(session, &states, &decision, link, hw, sink),
            )
        } else {
            sink.emit(&CycleEvent::DecisionIdle);
            None
        };

        CycleReport {
            states,
            decision,
            outcome,
        }
    }

    /// Arm the configured wake sources and suspend the world.  Execution
    /// resumes at the next boot, never here.
    pub fn schedule_sleep(&self, sleep: &mut impl SleepPort, sink: &mut impl EventSink) -> ! {
        let secs = self.strategy.sleep_secs();
        sink.emit(&CycleEvent::SleepScheduled { secs });
        info!("arming wake sources, sleeping for {}s", secs);
        self.strategy.arm(sleep);
        sleep.enter_deep_sleep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{Channel, Qos};
    use crate::error::{CommsError, SensorError};

    struct StubHw {
        trap_raw: u16,
        battery_raw: u16,
        now: u64,
    }

    impl SamplerPort for StubHw {
        fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
            Ok(match channel {
                Channel::Trap => self.trap_raw,
                Channel::Battery => self.battery_raw,
            })
        }
    }

    impl TimePort for StubHw {
        fn uptime_ms(&self) -> u64 {
            self.now
        }
        fn idle_ms(&mut self, ms: u32) {
            self.now += u64::from(ms);
        }
        fn delay_ms(&mut self, ms: u32) {
            self.now += u64::from(ms);
        }
    }

    #[derive(Default)]
    struct StubLink {
        bring_ups: u32,
    }

    impl NetworkPort for StubLink {
        fn bring_up(&mut self) -> Result<(), CommsError> {
            self.bring_ups += 1;
            Ok(())
        }
        fn tear_down(&mut self) {}
    }

    impl MessagingPort for StubLink {
        fn connect(&mut self) -> Result<(), CommsError> {
            Ok(())
        }
        fn publish(
            &mut self,
            _topic: &str,
            _payload: &str,
            _qos: Qos,
            _retain: bool,
        ) -> Result<(), CommsError> {
            Ok(())
        }
        fn disconnect(&mut self) {}
    }

    struct NullSink;

    impl EventSink for NullSink {
        fn emit(&mut self, _event: &CycleEvent) {}
    }

    #[test]
    fn quiescent_cycle_skips_the_network() {
        let service = CycleService::new(
            SystemConfig::default(),
            WakeStrategy::Poll { sleep_secs: 60 },
        );
        let mut session = PersistentSession {
            initialized: true,
            cycles_since_publish: 3,
            ..PersistentSession::cold_boot()
        };
        let mut hw = StubHw {
            trap_raw: 100,
            battery_raw: 100,
            now: 0,
        };
        let mut link = StubLink::default();

        let report = service.run_cycle(
            &mut session,
            WakeCause::Timer,
            &mut hw,
            &mut link,
            &mut NullSink,
        );

        assert!(report.outcome.is_none());
        assert_eq!(link.bring_ups, 0);
        assert_eq!(session.cycles_since_publish, 4);
    }
}
