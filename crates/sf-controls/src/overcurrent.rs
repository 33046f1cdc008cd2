//! Motor overcurrent interlock decision.
//!
//! Before a motor-type actuator is activated, its current sensor is
//! consulted. A tripped sensor blocks the activation; after a grace period
//! (long enough for the observer loop to see and log the condition) the
//! motor is forced off and, depending on the per-actuator relaunch flag,
//! either restarted or left off until an operator intervenes. The waiting
//! itself is done by the owning loop — this module only decides.

use std::time::Duration;

/// How long a tripped motor is held before the forced deactivation.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Outcome of the pre-activation overcurrent check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    /// No overcurrent: activate normally.
    Proceed,
    /// Tripped and relaunch is disabled: hold the grace period, force off,
    /// stay off.
    HoldOff,
    /// Tripped but relaunch is enabled: hold the grace period, force off,
    /// then activate.
    HoldThenRelaunch,
}

/// Decide what to do with a motor about to be activated.
pub fn assess(tripped: bool, relaunch: bool) -> GuardAction {
    match (tripped, relaunch) {
        (false, _) => GuardAction::Proceed,
        (true, true) => GuardAction::HoldThenRelaunch,
        (true, false) => GuardAction::HoldOff,
    }
}
