//! Combined device-side rig: one value that satisfies both hardware-facing
//! ports the cycle needs.
//!
//! [`CycleService::run_cycle`](crate::app::service::CycleService::run_cycle)
//! takes its sampler and clock as a single `impl SamplerPort + TimePort`,
//! so the composition happens here rather than at every call site.

use crate::adapters::adc::AdcSampler;
use crate::adapters::time::SystemClock;
use crate::app::ports::{Channel, SamplerPort, TimePort};
use crate::error::SensorError;

pub struct DeviceIo {
    sampler: AdcSampler,
    clock: SystemClock,
}

impl DeviceIo {
    pub fn new() -> Self {
        Self {
            sampler: AdcSampler::new(),
            clock: SystemClock::new(),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sampler_mut(&mut self) -> &mut AdcSampler {
        &mut self.sampler
    }
}

impl Default for DeviceIo {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerPort for DeviceIo {
    fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        self.sampler.read(channel)
    }
}

impl TimePort for DeviceIo {
    fn uptime_ms(&self) -> u64 {
        self.clock.uptime_ms()
    }

    fn idle_ms(&mut self, ms: u32) {
        self.clock.idle_ms(ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}
