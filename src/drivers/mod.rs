//! Hardware drivers (GPIO-level).
//!
//! On ESP-IDF targets these talk to real pins via raw sys calls; on all
//! other targets they are in-memory simulation stubs so the crate builds
//! and tests on the host.

pub mod button;
pub mod status_led;
