//! Deep-sleep peripheral adapter.
//!
//! Arms the RTC timer and (for edge-wake builds) an EXT1 level wake, reads
//! the wake cause register, and finally hands the chip to
//! `esp_deep_sleep_start`.  Deep sleep is terminal: the next thing that
//! runs is `main()` of the next boot.  The host simulation mirrors that by
//! exiting the process.

use log::info;

use crate::app::ports::SleepPort;
use crate::wake::WakeCause;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct SleepAdapter {
    #[cfg(not(target_os = "espidf"))]
    pub armed_timer_secs: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    pub armed_edge: Option<(i32, bool)>,
}

impl SleepAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            armed_timer_secs: None,
            #[cfg(not(target_os = "espidf"))]
            armed_edge: None,
        }
    }
}

impl Default for SleepAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl SleepPort for SleepAdapter {
    fn arm_timer_wake(&mut self, secs: u32) {
        // SAFETY: wake-source registration from the main task before
        // esp_deep_sleep_start.
        unsafe {
            esp_sleep_enable_timer_wakeup(u64::from(secs) * 1_000_000);
        }
    }

    fn arm_edge_wake(&mut self, gpio: i32, wake_high: bool) {
        let mode = if wake_high {
            esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ANY_HIGH
        } else {
            esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ALL_LOW
        };
        // SAFETY: EXT1 wake on an RTC-capable pin; mask built from a single
        // validated board pin.
        unsafe {
            esp_sleep_enable_ext1_wakeup(1u64 << gpio, mode);
        }
    }

    fn enter_deep_sleep(&mut self) -> ! {
        // SAFETY: all wake sources are armed; this call does not return.
        unsafe {
            esp_deep_sleep_start();
        }
        unreachable!("deep sleep entry returned")
    }

    fn wake_cause(&mut self) -> WakeCause {
        // SAFETY: reads the wake cause latched by the ROM bootloader.
        let cause = unsafe { esp_sleep_get_wakeup_cause() };
        match cause {
            c if c == esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => WakeCause::Timer,
            c if c == esp_sleep_source_t_ESP_SLEEP_WAKEUP_EXT1 => WakeCause::Edge,
            _ => WakeCause::ColdBoot,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl SleepPort for SleepAdapter {
    fn arm_timer_wake(&mut self, secs: u32) {
        self.armed_timer_secs = Some(secs);
    }

    fn arm_edge_wake(&mut self, gpio: i32, wake_high: bool) {
        self.armed_edge = Some((gpio, wake_high));
    }

    fn enter_deep_sleep(&mut self) -> ! {
        // The process-exit is the host equivalent of a boot boundary: no
        // code after this point runs, state survives only via the store.
        info!(
            "sleep(sim): timer={:?}s edge={:?}, exiting",
            self.armed_timer_secs, self.armed_edge
        );
        std::process::exit(0)
    }

    fn wake_cause(&mut self) -> WakeCause {
        WakeCause::ColdBoot
    }
}
