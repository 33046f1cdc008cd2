//! Threshold switching with a dead-band.

/// Two-threshold on/off gate.
///
/// Switches on when the measured value exceeds the threshold, but only
/// switches off again once it has dropped below `threshold - margin`. The
/// dead-band keeps a value hovering around the threshold from flapping the
/// actuator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HysteresisGate {
    active: bool,
}

impl HysteresisGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed one measurement; returns the resulting on-state.
    ///
    /// - off → on when `measured > threshold`
    /// - on → off when `measured < threshold - margin`
    /// - otherwise holds the prior state
    pub fn update(&mut self, measured: f64, threshold: f64, margin: f64) -> bool {
        if self.active {
            if measured < threshold - margin {
                self.active = false;
            }
        } else if measured > threshold {
            self.active = true;
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn activates_above_threshold() {
        let mut gate = HysteresisGate::new();
        assert!(!gate.update(10.0, 15.0, 2.0));
        assert!(gate.update(15.5, 15.0, 2.0));
    }

    #[test]
    fn holds_inside_dead_band() {
        let mut gate = HysteresisGate::new();
        gate.update(16.0, 15.0, 2.0);
        assert!(gate.is_active());
        // Inside [threshold - margin, threshold]: no deactivation.
        assert!(gate.update(14.0, 15.0, 2.0));
        assert!(gate.update(13.1, 15.0, 2.0));
        // Below the band: off.
        assert!(!gate.update(12.9, 15.0, 2.0));
    }

    #[test]
    fn exact_threshold_does_not_activate() {
        let mut gate = HysteresisGate::new();
        assert!(!gate.update(15.0, 15.0, 2.0));
    }

    proptest! {
        /// No flicker: once active, values oscillating within the dead-band
        /// never deactivate the gate.
        #[test]
        fn no_flicker_within_dead_band(
            threshold in -100.0f64..100.0,
            margin in 0.001f64..10.0,
            wobble in proptest::collection::vec(0.0f64..1.0, 1..50),
        ) {
            let mut gate = HysteresisGate::new();
            gate.update(threshold + 1.0, threshold, margin);
            prop_assert!(gate.is_active());

            for w in wobble {
                let measured = threshold - margin * w;
                gate.update(measured, threshold, margin);
                prop_assert!(gate.is_active());
            }
        }
    }
}
