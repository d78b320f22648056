//! On-board status LED (active HIGH).
//!
//! Debug aid only: the diagnostic mode blinks it during the entry window
//! and mirrors the trap state in the display loop.  Nothing in the core
//! cycle depends on it.

use crate::app::ports::IndicatorPort;
use crate::error::{Error, Result};
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct StatusLed {
    pin: i32,
    #[cfg(not(target_os = "espidf"))]
    lit: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            pin: pins::LED_GPIO,
            #[cfg(not(target_os = "espidf"))]
            lit: false,
        }
    }

    /// Configure the pin as a plain push-pull output, initially off.
    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<()> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: one-shot pin configuration from the single-threaded boot path.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("status LED gpio config failed"));
        }
        unsafe { gpio_set_level(self.pin, 0) };
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort for StatusLed {
    #[cfg(target_os = "espidf")]
    fn set(&mut self, on: bool) {
        // SAFETY: gpio_set_level writes to a pin configured as output in
        // init(); main-context only.
        unsafe {
            gpio_set_level(self.pin, if on { 1 } else { 0 });
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn set(&mut self, on: bool) {
        let _ = self.pin;
        self.lit = on;
    }
}
