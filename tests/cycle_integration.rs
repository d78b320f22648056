//! Integration tests: CycleService → publish engine → session, over mock
//! ports.  Each test plays one or more complete wake cycles and asserts on
//! the session mutations, the published messages, and the event narrative.

use trapwatch::app::events::CycleEvent;
use trapwatch::app::ports::{
    Channel, EventSink, MessagingPort, NetworkPort, Qos, SamplerPort, TimePort,
};
use trapwatch::app::service::CycleService;
use trapwatch::config::{SystemConfig, WakeMode, mqtt};
use trapwatch::error::{CommsError, SensorError};
use trapwatch::pins;
use trapwatch::session::PersistentSession;
use trapwatch::wake::{WakeCause, WakeStrategy};

// ── Mock implementations ──────────────────────────────────────

/// Sampler + clock rig with fixed channel readings and a fake clock that
/// only advances on idle/delay.
struct MockRig {
    trap_raw: u16,
    battery_raw: u16,
    now: u64,
}

impl MockRig {
    fn new(trap_raw: u16, battery_raw: u16) -> Self {
        Self {
            trap_raw,
            battery_raw,
            now: 0,
        }
    }
}

impl SamplerPort for MockRig {
    fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        Ok(match channel {
            Channel::Trap => self.trap_raw,
            Channel::Battery => self.battery_raw,
        })
    }
}

impl TimePort for MockRig {
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

/// Network + messaging rig with switchable failure modes.
#[derive(Default)]
struct MockLink {
    fail_bring_up: bool,
    fail_connect: bool,
    /// Topic whose publishes always fail.
    fail_topic: Option<&'static str>,
    /// Every publish fails, whatever the topic.
    fail_all_publishes: bool,
    bring_ups: u32,
    tear_downs: u32,
    connects: u32,
    disconnects: u32,
    published: Vec<(String, String, Qos, bool)>,
}

impl NetworkPort for MockLink {
    fn bring_up(&mut self) -> Result<(), CommsError> {
        self.bring_ups += 1;
        if self.fail_bring_up {
            return Err(CommsError::LinkTimeout);
        }
        Ok(())
    }
    fn tear_down(&mut self) {
        self.tear_downs += 1;
    }
}

impl MessagingPort for MockLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connects += 1;
        if self.fail_connect {
            return Err(CommsError::BrokerTimeout);
        }
        Ok(())
    }
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: Qos,
        retain: bool,
    ) -> Result<(), CommsError> {
        if self.fail_all_publishes || self.fail_topic == Some(topic) {
            return Err(CommsError::PublishFailed);
        }
        self.published
            .push((topic.to_owned(), payload.to_owned(), qos, retain));
        Ok(())
    }
    fn disconnect(&mut self) {
        self.disconnects += 1;
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Vec<CycleEvent>,
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &CycleEvent) {
        self.events.push(*event);
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn poll_service(config: &SystemConfig) -> CycleService {
    let strategy = WakeStrategy::from_config(config, pins::WAKE_GPIO);
    CycleService::new(config.clone(), strategy)
}

fn edge_service(config: &mut SystemConfig) -> CycleService {
    config.wake_mode = WakeMode::EdgeWake;
    poll_service(config)
}

fn topics(link: &MockLink) -> Vec<&str> {
    link.published.iter().map(|(t, _, _, _)| t.as_str()).collect()
}

// ── Cold boot ─────────────────────────────────────────────────

#[test]
fn cold_boot_publishes_both_states_unconditionally() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession::cold_boot();
    // Idle readings below both thresholds — the values alone would never
    // justify a publish.
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::ColdBoot,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(report.decision.first_boot);
    assert_eq!(
        topics(&link),
        vec![mqtt::TOPIC_TRAP, mqtt::TOPIC_BATTERY]
    );
    // Retained, at-least-once, baseline payloads.
    for (_, payload, qos, retain) in &link.published {
        assert_eq!(*qos, Qos::AtLeastOnce);
        assert!(*retain);
        assert!(payload == "ready" || payload == "ok");
    }
    assert!(session.initialized);
    assert_eq!(session.cycles_since_publish, 0);
}

#[test]
fn second_cycle_after_cold_boot_is_idle() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession::cold_boot();
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    service.run_cycle(
        &mut session,
        WakeCause::ColdBoot,
        &mut hw,
        &mut link,
        &mut sink,
    );
    let before = link.bring_ups;

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(report.outcome.is_none());
    assert_eq!(link.bring_ups, before);
    assert_eq!(session.cycles_since_publish, 1);
    assert!(sink.events.contains(&CycleEvent::DecisionIdle));
}

#[test]
fn failed_first_publish_keeps_the_session_uninitialized() {
    let mut config = SystemConfig::default();
    config.publish_attempts = 1;
    let service = poll_service(&config);
    let mut session = PersistentSession::cold_boot();
    let mut hw = MockRig::new(100, 100);
    // Connected, but every publish bounces.
    let mut link = MockLink {
        fail_all_publishes: true,
        ..MockLink::default()
    };
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::ColdBoot,
        &mut hw,
        &mut link,
        &mut sink,
    );

    let outcome = report.outcome.unwrap();
    assert!(outcome.connected);
    assert!(!outcome.trap_published);
    assert!(!outcome.battery_published);
    // No item went out, so the next cycle still counts as first boot.
    assert!(!session.initialized);
    let next = trapwatch::publish::Decision::evaluate(
        &session,
        &report.states,
        config.heartbeat_cycles,
    );
    assert!(next.first_boot);
}

// ── Change detection ──────────────────────────────────────────

#[test]
fn trap_close_publishes_only_the_trap_topic() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(3500, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert_eq!(topics(&link), vec![mqtt::TOPIC_TRAP]);
    assert_eq!(link.published[0].1, "triggered");
    assert!(session.last_trap_state);
    assert!(!session.last_battery_state);
}

#[test]
fn trap_reset_publishes_ready() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession {
        last_trap_state: true,
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert_eq!(topics(&link), vec![mqtt::TOPIC_TRAP]);
    assert_eq!(link.published[0].1, "ready");
    assert!(!session.last_trap_state);
}

#[test]
fn battery_low_publishes_only_the_battery_topic() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 3000);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert_eq!(topics(&link), vec![mqtt::TOPIC_BATTERY]);
    assert_eq!(link.published[0].1, "low");
    assert!(session.last_battery_state);
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_republishes_both_unchanged_states() {
    let mut config = SystemConfig::default();
    config.heartbeat_cycles = 5;
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        cycles_since_publish: 5,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(report.decision.heartbeat_due);
    assert_eq!(
        topics(&link),
        vec![mqtt::TOPIC_TRAP, mqtt::TOPIC_BATTERY]
    );
    assert_eq!(session.cycles_since_publish, 0);
}

#[test]
fn quiescent_cycles_advance_the_heartbeat_counter() {
    let mut config = SystemConfig::default();
    config.heartbeat_cycles = 3;
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    // The decision sees the pre-increment counter, so three cycles stay
    // quiet and the fourth trips the heartbeat.
    for expected in [1, 2, 3] {
        let report = service.run_cycle(
            &mut session,
            WakeCause::Timer,
            &mut hw,
            &mut link,
            &mut sink,
        );
        assert!(report.outcome.is_none());
        assert_eq!(session.cycles_since_publish, expected);
    }
    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );
    assert!(report.decision.heartbeat_due);
    assert!(report.outcome.is_some());
}

// ── Connection failures ───────────────────────────────────────

#[test]
fn link_failure_mutates_nothing_and_tears_down() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        cycles_since_publish: 7,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(3500, 100);
    let mut link = MockLink {
        fail_bring_up: true,
        ..MockLink::default()
    };
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    let outcome = report.outcome.unwrap();
    assert!(!outcome.connected);
    assert!(link.published.is_empty());
    // last_* untouched — the unchanged condition re-triggers next wake.
    assert!(!session.last_trap_state);
    // Counter was bumped, not reset.
    assert_eq!(session.cycles_since_publish, 8);
    assert_eq!(link.tear_downs, 1);
    assert!(sink.events.contains(&CycleEvent::LinkFailed));
}

#[test]
fn broker_failure_disconnects_and_tears_down_in_order() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(3500, 100);
    let mut link = MockLink {
        fail_connect: true,
        ..MockLink::default()
    };
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(!report.outcome.unwrap().connected);
    assert!(!session.last_trap_state);
    assert_eq!(session.cycles_since_publish, 1);
    assert_eq!(link.disconnects, 1);
    assert_eq!(link.tear_downs, 1);
    assert!(sink.events.contains(&CycleEvent::BrokerFailed));
}

#[test]
fn counter_resets_only_when_both_connections_succeed() {
    let config = SystemConfig::default();
    let service = poll_service(&config);
    let mut hw = MockRig::new(3500, 100);
    let mut sink = CollectingSink::default();

    // Broker down: counter keeps counting.
    let mut session = PersistentSession {
        initialized: true,
        cycles_since_publish: 41,
        ..PersistentSession::cold_boot()
    };
    let mut link = MockLink {
        fail_connect: true,
        ..MockLink::default()
    };
    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );
    assert_eq!(session.cycles_since_publish, 42);

    // Broker back: counter resets even though the trap publish fails.
    let mut link = MockLink {
        fail_topic: Some(mqtt::TOPIC_TRAP),
        ..MockLink::default()
    };
    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );
    assert_eq!(session.cycles_since_publish, 0);
}

// ── Partial publish failure ───────────────────────────────────

#[test]
fn failed_item_is_retried_by_change_detection_next_cycle() {
    let mut config = SystemConfig::default();
    config.publish_attempts = 2;
    let service = poll_service(&config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    // Both states flip in the same cycle.
    let mut hw = MockRig::new(3500, 3000);
    let mut link = MockLink {
        fail_topic: Some(mqtt::TOPIC_BATTERY),
        ..MockLink::default()
    };
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    let outcome = report.outcome.unwrap();
    assert!(outcome.trap_published);
    assert!(!outcome.battery_published);
    // Trap advanced, battery did not.
    assert!(session.last_trap_state);
    assert!(!session.last_battery_state);

    // Next cycle: only the battery still differs, so only it republishes.
    let mut link = MockLink::default();
    service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );
    assert_eq!(topics(&link), vec![mqtt::TOPIC_BATTERY]);
    assert!(session.last_battery_state);
}

// ── Edge wake ─────────────────────────────────────────────────

#[test]
fn edge_wake_forces_trap_triggered_regardless_of_light() {
    let mut config = SystemConfig::default();
    let service = edge_service(&mut config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    // Bright trap reading — the envelope alone says "ready".
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Edge,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(report.states.trap_triggered);
    assert_eq!(topics(&link), vec![mqtt::TOPIC_TRAP]);
    assert_eq!(link.published[0].1, "triggered");
    assert!(sink.events.iter().any(|e| matches!(
        e,
        CycleEvent::StatesEvaluated {
            trap_forced: true,
            ..
        }
    )));
}

#[test]
fn edge_wake_still_samples_the_battery_channel() {
    let mut config = SystemConfig::default();
    let service = edge_service(&mut config);
    let mut session = PersistentSession {
        initialized: true,
        last_trap_state: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 3000);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Edge,
        &mut hw,
        &mut link,
        &mut sink,
    );

    // Trap already known triggered; only the battery flip publishes.
    assert!(report.states.battery_low);
    assert_eq!(topics(&link), vec![mqtt::TOPIC_BATTERY]);
}

#[test]
fn timer_wake_in_edge_mode_does_not_force() {
    let mut config = SystemConfig::default();
    let service = edge_service(&mut config);
    let mut session = PersistentSession {
        initialized: true,
        ..PersistentSession::cold_boot()
    };
    let mut hw = MockRig::new(100, 100);
    let mut link = MockLink::default();
    let mut sink = CollectingSink::default();

    let report = service.run_cycle(
        &mut session,
        WakeCause::Timer,
        &mut hw,
        &mut link,
        &mut sink,
    );

    assert!(!report.states.trap_triggered);
    assert!(report.outcome.is_none());
}
