//! Diagnostic mode — live sensor display for field calibration.
//!
//! On a cold power-up the device holds a short entry window, blinking the
//! status LED while polling the boot button.  A press diverts boot into a
//! continuous display loop that logs raw readings and derived states so an
//! installer can aim the LDRs and tune thresholds without a flasher
//! attached.  The loop never returns; leaving diagnostic mode is a power
//! cycle.
//!
//! Timer and edge wakes skip the window entirely — it would burn the
//! battery 1440 times a day for a feature only a human standing at the
//! trap uses.

use log::info;

use crate::app::ports::{ButtonPort, Channel, IndicatorPort, SamplerPort, TimePort};
use crate::config::SystemConfig;

/// How long after a cold boot the button is honored.
pub const ENTRY_WINDOW_MS: u32 = 3000;
/// Button poll / LED blink half-period during the entry window.
const ENTRY_POLL_MS: u32 = 100;
/// Refresh interval of the display loop.
const DISPLAY_INTERVAL_MS: u32 = 500;

/// Poll the boot button for the entry window, blinking the LED as a
/// visible "press now" cue.  Returns as soon as a press is seen; the LED
/// is left off either way.
pub fn check_entry(
    button: &mut impl ButtonPort,
    led: &mut impl IndicatorPort,
    time: &mut impl TimePort,
) -> bool {
    let start = time.uptime_ms();
    let mut lit = false;
    let mut entered = false;

    while time.uptime_ms().saturating_sub(start) < u64::from(ENTRY_WINDOW_MS) {
        if button.is_pressed() {
            entered = true;
            break;
        }
        lit = !lit;
        led.set(lit);
        time.delay_ms(ENTRY_POLL_MS);
    }

    led.set(false);
    entered
}

/// The display loop.  Reads both channels every half second, logs the raw
/// values next to the thresholds that would judge them, and mirrors the
/// trap state on the LED.
pub fn run(
    hw: &mut (impl SamplerPort + TimePort),
    led: &mut impl IndicatorPort,
    config: &SystemConfig,
) -> ! {
    info!("diagnostic mode: power-cycle to exit");
    info!(
        "thresholds: trap>{} battery>{}",
        config.trap_threshold, config.battery_threshold
    );

    loop {
        let trap_raw = hw.read(Channel::Trap);
        let battery_raw = hw.read(Channel::Battery);

        match (trap_raw, battery_raw) {
            (Ok(trap), Ok(battery)) => {
                let trap_dark = trap > config.trap_threshold;
                let battery_low = battery > config.battery_threshold;
                info!(
                    "trap={:4} [{}]  battery={:4} [{}]",
                    trap,
                    if trap_dark { "TRIGGERED" } else { "ready" },
                    battery,
                    if battery_low { "LOW" } else { "ok" },
                );
                led.set(trap_dark);
            }
            (trap, battery) => {
                info!("read error: trap={:?} battery={:?}", trap, battery);
            }
        }

        hw.delay_ms(DISPLAY_INTERVAL_MS);
    }
}
