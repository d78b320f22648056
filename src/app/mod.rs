//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for TrapWatch: burst sampling,
//! trigger evaluation, the publish decision engine, and per-cycle
//! orchestration.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
pub mod service;
