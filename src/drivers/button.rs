//! Boot button (active-low, internal pull-up).
//!
//! Polled only during the cold-boot diagnostic entry window; there is no
//! ISR and no debounce machinery because a single level read inside a 3 s
//! window is all the feature needs.

use crate::app::ports::ButtonPort;
use crate::error::{Error, Result};
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct BootButton {
    pin: i32,
    #[cfg(not(target_os = "espidf"))]
    sim_pressed: bool,
}

impl BootButton {
    pub fn new() -> Self {
        Self {
            pin: pins::BUTTON_GPIO,
            #[cfg(not(target_os = "espidf"))]
            sim_pressed: false,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn init(&mut self) -> Result<()> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: one-shot pin configuration from the single-threaded boot path.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("boot button gpio config failed"));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn init(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_press(&mut self, pressed: bool) {
        self.sim_pressed = pressed;
    }
}

impl Default for BootButton {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonPort for BootButton {
    #[cfg(target_os = "espidf")]
    fn is_pressed(&mut self) -> bool {
        // SAFETY: gpio_get_level is a read-only register access on an
        // already-configured input pin.
        (unsafe { gpio_get_level(self.pin) }) == 0
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed(&mut self) -> bool {
        let _ = self.pin;
        self.sim_pressed
    }
}
