//! TrapWatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod publish;
pub mod sampling;
pub mod session;
pub mod trigger;
pub mod wake;

// The adapters and drivers compile on every target; the hardware paths
// inside are cfg-guarded.
pub mod adapters;
pub mod drivers;
