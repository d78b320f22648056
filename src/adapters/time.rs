//! Monotonic time and low-power idle.
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` for the clock;
//!   [`TimePort::idle_ms`] arms the sleep timer and drops into **light**
//!   sleep (CPU and radio gated, RAM retained), which is what makes the
//!   burst window cheap; [`TimePort::delay_ms`] is a plain FreeRTOS delay
//!   for use while the radio is up.
//! - **all other targets** — `std::time::Instant` plus thread sleeps.

use crate::app::ports::TimePort;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl TimePort for SystemClock {
    fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    fn idle_ms(&mut self, ms: u32) {
        if ms == 0 {
            return;
        }
        // SAFETY: timer wakeup + light sleep entry from the main task;
        // execution resumes here with RAM intact.
        unsafe {
            esp_idf_svc::sys::esp_sleep_enable_timer_wakeup(u64::from(ms) * 1_000);
            esp_idf_svc::sys::esp_light_sleep_start();
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl TimePort for SystemClock {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn idle_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
