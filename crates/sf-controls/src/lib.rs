//! Gate logic for discrete on/off process control.
//!
//! This crate holds the pure decision functions the control loops are
//! composed from. Nothing here touches devices, files, or the clock: a
//! gate takes the numbers it is given and answers "switch now or not".
//! That keeps every scheduling decision unit-testable without a runtime.
//!
//! - [`DutyCycleGate`] — modulo-time activation windows, edge-triggered
//! - [`HysteresisGate`] — threshold switching with a dead-band
//! - [`overcurrent`] — motor interlock decision

pub mod duty;
pub mod error;
pub mod hysteresis;
pub mod overcurrent;

pub use duty::{DutyCycle, DutyCycleGate};
pub use error::{ControlError, ControlResult};
pub use hysteresis::HysteresisGate;
pub use overcurrent::{GRACE_PERIOD, GuardAction};
