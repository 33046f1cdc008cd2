//! Duty-cycle activation windows.
//!
//! A duty cycle is a repeating on/off pattern: every `interval` seconds,
//! offset by `delay`, the actuator runs for `runtime` seconds. The gate
//! decides whether "now" (elapsed runtime in seconds) falls on an
//! activation tick.
//!
//! The raw predicate `floor(elapsed - delay) mod floor(interval) == 0` is
//! true for every poll inside the same integer second, so a loop polling at
//! sub-second cadence would re-activate several times per window. The gate
//! is therefore edge-triggered: it remembers the last integer tick it fired
//! on and fires at most once per distinct tick.

use crate::error::{ControlError, ControlResult};

/// Timing of one duty cycle, seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyCycle {
    /// Window length. Must be at least one second (the tick modulus is
    /// `floor(interval)`).
    pub interval: f64,
    /// On-duration inside each window.
    pub runtime: f64,
    /// Offset of the window start from runtime zero.
    pub delay: f64,
}

impl DutyCycle {
    /// Create a validated duty cycle.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite values, `interval < 1`, or negative
    /// `runtime`/`delay`.
    pub fn new(interval: f64, runtime: f64, delay: f64) -> ControlResult<Self> {
        if !(interval.is_finite() && runtime.is_finite() && delay.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "duty cycle values must be finite",
            });
        }
        if interval < 1.0 {
            return Err(ControlError::InvalidArg {
                what: "interval must be at least 1 second",
            });
        }
        if runtime < 0.0 || delay < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "runtime and delay must be non-negative",
            });
        }
        Ok(Self {
            interval,
            runtime,
            delay,
        })
    }

    /// True while `elapsed` lies in the on-portion of its window, i.e. the
    /// first `runtime` seconds after each window start. Used by loops that
    /// hold an actuator on for the whole phase rather than pulsing it.
    pub fn in_on_phase(&self, elapsed: f64) -> bool {
        let shifted = elapsed - self.delay;
        if !shifted.is_finite() || shifted < 0.0 {
            return false;
        }
        shifted.rem_euclid(self.interval) < self.runtime
    }
}

/// Edge-triggered activation gate. One gate instance per loop; the stored
/// tick is what de-duplicates sub-second polling.
#[derive(Debug, Clone, Default)]
pub struct DutyCycleGate {
    last_tick: Option<i64>,
}

impl DutyCycleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `elapsed` lies on an activation tick that has not fired
    /// yet. Negative elapsed (the startup wait) never fires.
    pub fn fires(&mut self, cycle: &DutyCycle, elapsed: f64) -> bool {
        let shifted = (elapsed - cycle.delay).floor();
        if !shifted.is_finite() || shifted < 0.0 {
            return false;
        }
        let tick = shifted as i64;
        let modulus = cycle.interval.floor() as i64;
        if tick.rem_euclid(modulus) != 0 {
            return false;
        }
        if self.last_tick == Some(tick) {
            return false;
        }
        self.last_tick = Some(tick);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn invalid_cycles_rejected() {
        assert!(DutyCycle::new(0.5, 1.0, 0.0).is_err());
        assert!(DutyCycle::new(60.0, -1.0, 0.0).is_err());
        assert!(DutyCycle::new(f64::NAN, 1.0, 0.0).is_err());
        assert!(DutyCycle::new(60.0, 5.0, 0.0).is_ok());
    }

    #[test]
    fn fires_once_per_window_despite_subsecond_polling() {
        let cycle = DutyCycle::new(60.0, 5.0, 0.0).unwrap();
        let mut gate = DutyCycleGate::new();

        // Poll at 0.1 s through the aligned second: exactly one fire.
        let mut fires = 0;
        let mut t = 60.0;
        while t < 61.0 {
            if gate.fires(&cycle, t) {
                fires += 1;
            }
            t += 0.1;
        }
        assert_eq!(fires, 1);

        // Next window fires again.
        assert!(gate.fires(&cycle, 120.0));
    }

    #[test]
    fn never_fires_during_initial_wait() {
        let cycle = DutyCycle::new(60.0, 5.0, 0.0).unwrap();
        let mut gate = DutyCycleGate::new();
        assert!(!gate.fires(&cycle, -9.5));
        assert!(!gate.fires(&cycle, -0.1));
        // Runtime zero is the first tick.
        assert!(gate.fires(&cycle, 0.0));
    }

    #[test]
    fn delay_shifts_the_window() {
        let cycle = DutyCycle::new(30.0, 5.0, 10.0).unwrap();
        let mut gate = DutyCycleGate::new();
        assert!(!gate.fires(&cycle, 9.9));
        assert!(gate.fires(&cycle, 10.0));
        assert!(!gate.fires(&cycle, 25.0));
        assert!(gate.fires(&cycle, 40.2));
    }

    #[test]
    fn skipped_windows_do_not_backfire() {
        let cycle = DutyCycle::new(10.0, 2.0, 0.0).unwrap();
        let mut gate = DutyCycleGate::new();
        assert!(gate.fires(&cycle, 10.0));
        // The loop was blocked past two whole windows; it only fires when
        // it lands on an aligned tick again.
        assert!(!gate.fires(&cycle, 35.0));
        assert!(gate.fires(&cycle, 40.0));
    }

    #[test]
    fn on_phase_covers_runtime_after_each_window_start() {
        let cycle = DutyCycle::new(60.0, 30.0, 0.0).unwrap();
        assert!(cycle.in_on_phase(0.0));
        assert!(cycle.in_on_phase(29.9));
        assert!(!cycle.in_on_phase(30.0));
        assert!(!cycle.in_on_phase(59.9));
        assert!(cycle.in_on_phase(60.0));
        assert!(!cycle.in_on_phase(-5.0));
    }

    proptest! {
        /// Edge-triggered property: polling any cycle at sub-second cadence,
        /// every fired tick is window-aligned and fired exactly once.
        #[test]
        fn at_most_one_fire_per_tick(
            interval in 1.0f64..120.0,
            delay in 0.0f64..60.0,
            step in 0.05f64..0.9,
            span in 1.0f64..300.0,
        ) {
            let cycle = DutyCycle::new(interval, 0.0, delay).unwrap();
            let mut gate = DutyCycleGate::new();
            let modulus = interval.floor() as i64;

            let mut fired_ticks = Vec::new();
            let mut t = -delay.min(5.0);
            while t < span {
                if gate.fires(&cycle, t) {
                    let tick = (t - delay).floor() as i64;
                    prop_assert_eq!(tick.rem_euclid(modulus), 0);
                    prop_assert!(!fired_ticks.contains(&tick), "tick fired twice");
                    fired_ticks.push(tick);
                }
                t += step;
            }
        }
    }
}
