//! Wake/sleep scheduling — which wake sources get armed and how a wake
//! cause is interpreted.
//!
//! The strategy is chosen once at startup from config rather than scattered
//! through the cycle as conditionals.  Poll mode trades trigger latency for
//! simplicity; edge-wake mode trades a wake-cause disambiguation for
//! near-immediate trigger reporting and hour-scale sleep intervals.

use crate::app::ports::SleepPort;
use crate::config::{SystemConfig, WakeMode};

/// Why the chip booted.  Read exactly once per boot from the sleep
/// peripheral and threaded through the cycle as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    /// Full power-up — RTC memory is zeroed, session starts cold.
    ColdBoot,
    /// The heartbeat / poll timer fired.
    Timer,
    /// The trap's mechanical wake circuit pulled the wake pin.
    Edge,
}

/// Configuration-selected wake strategy, fixed for the power session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeStrategy {
    /// Timer-only wake with a short fixed period.
    Poll { sleep_secs: u32 },
    /// Level wake on the trap circuit plus a long heartbeat timer.
    EdgeWake {
        gpio: i32,
        wake_high: bool,
        sleep_secs: u32,
    },
}

impl WakeStrategy {
    /// Build the strategy from config.  The edge pin polarity matches the
    /// trap circuit: closing the trap drives the pin HIGH.
    pub fn from_config(config: &SystemConfig, wake_gpio: i32) -> Self {
        match config.wake_mode {
            WakeMode::Poll => Self::Poll {
                sleep_secs: config.effective_sleep_secs(),
            },
            WakeMode::EdgeWake => Self::EdgeWake {
                gpio: wake_gpio,
                wake_high: true,
                sleep_secs: config.effective_sleep_secs(),
            },
        }
    }

    /// Arm the wake sources for the next sleep.  Does not enter sleep.
    pub fn arm(&self, sleep: &mut impl SleepPort) {
        match *self {
            Self::Poll { sleep_secs } => {
                sleep.arm_timer_wake(sleep_secs);
            }
            Self::EdgeWake {
                gpio,
                wake_high,
                sleep_secs,
            } => {
                sleep.arm_timer_wake(sleep_secs);
                sleep.arm_edge_wake(gpio, wake_high);
            }
        }
    }

    /// Whether this boot's cause forces the trap state to triggered,
    /// bypassing the sampled envelope for that channel.  The battery
    /// channel is still sampled normally.
    pub fn forces_trap_trigger(&self, cause: WakeCause) -> bool {
        matches!(self, Self::EdgeWake { .. }) && cause == WakeCause::Edge
    }

    /// Deep-sleep duration this strategy arms.
    pub fn sleep_secs(&self) -> u32 {
        match *self {
            Self::Poll { sleep_secs } | Self::EdgeWake { sleep_secs, .. } => sleep_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSleep {
        timer_secs: Option<u32>,
        edge: Option<(i32, bool)>,
    }

    impl SleepPort for RecordingSleep {
        fn arm_timer_wake(&mut self, secs: u32) {
            self.timer_secs = Some(secs);
        }
        fn arm_edge_wake(&mut self, gpio: i32, wake_high: bool) {
            self.edge = Some((gpio, wake_high));
        }
        fn enter_deep_sleep(&mut self) -> ! {
            unreachable!("tests never enter deep sleep")
        }
        fn wake_cause(&mut self) -> WakeCause {
            WakeCause::ColdBoot
        }
    }

    #[test]
    fn poll_mode_arms_timer_only() {
        let strategy = WakeStrategy::Poll { sleep_secs: 60 };
        let mut sleep = RecordingSleep::default();
        strategy.arm(&mut sleep);
        assert_eq!(sleep.timer_secs, Some(60));
        assert_eq!(sleep.edge, None);
    }

    #[test]
    fn edge_mode_arms_both_sources() {
        let strategy = WakeStrategy::EdgeWake {
            gpio: 5,
            wake_high: true,
            sleep_secs: 21600,
        };
        let mut sleep = RecordingSleep::default();
        strategy.arm(&mut sleep);
        assert_eq!(sleep.timer_secs, Some(21600));
        assert_eq!(sleep.edge, Some((5, true)));
    }

    #[test]
    fn edge_wake_cause_forces_trap_trigger() {
        let strategy = WakeStrategy::EdgeWake {
            gpio: 5,
            wake_high: true,
            sleep_secs: 21600,
        };
        assert!(strategy.forces_trap_trigger(WakeCause::Edge));
        assert!(!strategy.forces_trap_trigger(WakeCause::Timer));
        assert!(!strategy.forces_trap_trigger(WakeCause::ColdBoot));
    }

    #[test]
    fn poll_mode_never_forces() {
        let strategy = WakeStrategy::Poll { sleep_secs: 60 };
        // Even a spurious Edge cause must not force in poll mode.
        assert!(!strategy.forces_trap_trigger(WakeCause::Edge));
    }

    #[test]
    fn from_config_respects_mode() {
        let mut config = SystemConfig::default();
        let s = WakeStrategy::from_config(&config, 5);
        assert!(matches!(s, WakeStrategy::Poll { .. }));

        config.wake_mode = crate::config::WakeMode::EdgeWake;
        let s = WakeStrategy::from_config(&config, 5);
        assert!(matches!(s, WakeStrategy::EdgeWake { gpio: 5, .. }));
        assert_eq!(s.sleep_secs(), SystemConfig::EDGE_WAKE_SLEEP_SECS);
    }
}
