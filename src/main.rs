//! TrapWatch Firmware — Main Entry Point
//!
//! One boot is one wake cycle:
//!
//! ```text
//! boot ─▶ wake cause ─▶ restore session ─▶ burst sample ─▶ decide
//!            │                                               │
//!            └─ cold boot + button ─▶ diagnostic loop        ├─ idle
//!                                                            └─ publish
//!                                          persist session ◀─┘
//!                                                │
//!                                          deep sleep (terminal)
//! ```
//!
//! Everything between restore and persist flows through the port traits in
//! `app::ports`; this file only wires concrete adapters to the
//! [`CycleService`] and never makes decisions of its own.

#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use trapwatch::adapters::adc;
use trapwatch::adapters::hardware::DeviceIo;
use trapwatch::adapters::link::RadioLink;
use trapwatch::adapters::log_sink::LogCycleSink;
use trapwatch::adapters::mqtt::MqttLink;
use trapwatch::adapters::rtc::RtcSessionStore;
use trapwatch::adapters::sleep::SleepAdapter;
use trapwatch::adapters::time::SystemClock;
use trapwatch::adapters::wifi::WifiLink;
use trapwatch::app::ports::SleepPort;
use trapwatch::app::service::CycleService;
use trapwatch::config::SystemConfig;
use trapwatch::diagnostics;
use trapwatch::drivers::button::BootButton;
use trapwatch::drivers::status_led::StatusLed;
use trapwatch::pins;
use trapwatch::session::PersistentSession;
use trapwatch::wake::{WakeCause, WakeStrategy};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("TrapWatch v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Sensors or nothing ─────────────────────────────────
    // A device that cannot read its LDRs has nothing to report; halting
    // here keeps it from burning the battery on blind wake cycles.
    if let Err(e) = adc::init() {
        error!("ADC init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let config = SystemConfig::default();
    let strategy = WakeStrategy::from_config(&config, pins::WAKE_GPIO);

    // ── 3. Wake cause + session restore ───────────────────────
    // The cause register is read exactly once per boot and threaded
    // through the whole cycle from here.
    let mut sleep = SleepAdapter::new();
    let cause = sleep.wake_cause();

    let mut rtc = RtcSessionStore::new();
    let mut session = if cause == WakeCause::ColdBoot {
        // Retention memory after a power loss is not trusted.
        PersistentSession::cold_boot()
    } else {
        rtc.load()
    };

    let mut hw = DeviceIo::new();

    // ── 4. Diagnostic fork (cold boot only) ───────────────────
    if cause == WakeCause::ColdBoot {
        let mut button = BootButton::new();
        let mut led = StatusLed::new();
        button.init()?;
        led.init()?;
        let mut clock = SystemClock::new();
        if diagnostics::check_entry(&mut button, &mut led, &mut clock) {
            diagnostics::run(&mut hw, &mut led, &config);
        }
    }

    // ── 5. Connectivity rig ───────────────────────────────────
    // Constructed cold: the radio stays off unless the cycle decides to
    // publish.
    #[cfg(target_os = "espidf")]
    let mut link = {
        let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()?;
        let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
        let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
        RadioLink::new(
            WifiLink::new(peripherals.modem, sysloop, nvs, &config),
            MqttLink::new(&config),
        )
    };
    #[cfg(not(target_os = "espidf"))]
    let mut link = RadioLink::new(WifiLink::new(&config), MqttLink::new(&config));

    // ── 6. One wake cycle ─────────────────────────────────────
    let mut sink = LogCycleSink::new();
    let service = CycleService::new(config, strategy);

    let report = service.run_cycle(&mut session, cause, &mut hw, &mut link, &mut sink);
    if report.decision.should_publish() && report.outcome.is_none_or(|o| !o.connected) {
        info!("cycle ended unpublished; unchanged state re-triggers next wake");
    }

    // ── 7. Persist + sleep ────────────────────────────────────
    rtc.store(&session);
    service.schedule_sleep(&mut sleep, &mut sink)
}
