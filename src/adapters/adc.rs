//! ADC1 oneshot adapter for the two LDR dividers.
//!
//! Configures both channels at 12 dB attenuation / 12-bit width so the full
//! divider swing maps onto 0..=4095.  Initialization failure is fatal — a
//! device that cannot read its sensors has nothing to report and must not
//! burn battery pretending otherwise.

use crate::app::ports::{Channel, SamplerPort};
use crate::error::{Error, Result, SensorError};
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// One-shot ADC unit setup.  Called once from `main()` before anything
/// samples; the handle lives for the (short) life of the boot.
#[cfg(target_os = "espidf")]
pub fn init() -> Result<()> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is written exactly once, here, on the
    // single-threaded boot path before any read.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(Error::Init("ADC1 unit init failed"));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for ch in [pins::LDR_TRAP_ADC_CH, pins::LDR_BATTERY_ADC_CH] {
        // SAFETY: handle valid from the successful adc_oneshot_new_unit above.
        let ret = unsafe { adc_oneshot_config_channel(ADC1_HANDLE, ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(Error::Init("ADC1 channel config failed"));
        }
    }

    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init() -> Result<()> {
    Ok(())
}

/// [`SamplerPort`] over the oneshot unit.  Stateless on hardware; the sim
/// variant carries settable channel values for host runs.
pub struct AdcSampler {
    #[cfg(not(target_os = "espidf"))]
    sim_trap: u16,
    #[cfg(not(target_os = "espidf"))]
    sim_battery: u16,
}

impl AdcSampler {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_trap: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_battery: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set(&mut self, channel: Channel, raw: u16) {
        match channel {
            Channel::Trap => self.sim_trap = raw,
            Channel::Battery => self.sim_battery = raw,
        }
    }
}

impl Default for AdcSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerPort for AdcSampler {
    #[cfg(target_os = "espidf")]
    fn read(&mut self, channel: Channel) -> core::result::Result<u16, SensorError> {
        let ch = match channel {
            Channel::Trap => pins::LDR_TRAP_ADC_CH,
            Channel::Battery => pins::LDR_BATTERY_ADC_CH,
        };
        let mut raw: i32 = 0;
        // SAFETY: ADC1_HANDLE was written once during init() before any
        // sampler exists; single-threaded main-loop access only.
        let ret = unsafe { adc_oneshot_read(ADC1_HANDLE, ch, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.max(0) as u16)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read(&mut self, channel: Channel) -> core::result::Result<u16, SensorError> {
        Ok(match channel {
            Channel::Trap => self.sim_trap,
            Channel::Battery => self.sim_battery,
        })
    }
}
