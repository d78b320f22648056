//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                    |
//! |------------|----------------|--------------------------------|
//! | `adc`      | SamplerPort    | ESP32 ADC1 oneshot driver      |
//! | `time`     | TimePort       | esp_timer + light sleep        |
//! | `hardware` | Sampler+Time   | combined device-side rig       |
//! | `wifi`     | NetworkPort    | ESP-IDF WiFi STA               |
//! | `mqtt`     | MessagingPort  | ESP-IDF MQTT client            |
//! | `link`     | Network+Msg    | combined connectivity rig      |
//! | `rtc`      | session store  | RTC slow retention memory      |
//! | `sleep`    | SleepPort      | deep-sleep / wake-cause regs   |
//! | `log_sink` | EventSink      | serial log output              |
//!
//! Every adapter is cfg-gated: real peripheral calls under
//! `target_os = "espidf"`, in-memory simulation stubs everywhere else so
//! the whole cycle runs on the host under test.

pub mod adc;
pub mod hardware;
pub mod link;
pub mod log_sink;
pub mod mqtt;
pub mod rtc;
pub mod sleep;
pub mod time;
pub mod wifi;
