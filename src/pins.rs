//! GPIO / peripheral pin assignments for the TrapWatch board.
//!
//! Single source of truth — every adapter references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Trap LDR — goes dark when the trap door closes over the photoresistor.
/// ADC1 channel 4 (GPIO 4).
pub const LDR_TRAP_GPIO: i32 = 4;
/// ADC1 channel index for the trap LDR.
pub const LDR_TRAP_ADC_CH: u32 = 4;

/// Battery-indicator LDR — faces the low-charge LED on the battery pack.
/// ADC1 channel 1 (GPIO 1).
pub const LDR_BATTERY_GPIO: i32 = 1;
/// ADC1 channel index for the battery LDR.
pub const LDR_BATTERY_ADC_CH: u32 = 1;

// ---------------------------------------------------------------------------
// Wake circuit (edge-wake builds only)
// ---------------------------------------------------------------------------

/// Digital input wired to the trap's own mechanical switch.  Held low by an
/// external pull-down; the trap closing drives it HIGH and wakes the chip
/// from deep sleep.
pub const WAKE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// Built-in LED, active HIGH.  Debug aid only — no feedback into the core.
pub const LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Built-in boot button — pressed within 3 s of power-up to enter
/// diagnostic mode.
pub const BUTTON_GPIO: i32 = 3;
