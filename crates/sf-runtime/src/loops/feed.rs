//! Evaporator feed loop.
//!
//! Duty-cycles the feed pump, but only while the stabilizer tank holds
//! enough liquid to feed from. The level check uses the last-known sensor
//! value; the data-acquisition loop keeps it fresh.

use super::common;
use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use sf_controls::{DutyCycle, DutyCycleGate};
use std::time::Duration;

const POLL: Duration = Duration::from_millis(100);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let pump = ctx.registry.actuator(&profile.feed_pump)?;
    let level = ctx.registry.sensor(&profile.stabilizer_level)?;

    let mut gate = DutyCycleGate::new();
    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        // Parameters are re-read every iteration so threshold and timing
        // edits in the document take effect live.
        let snapshot = ctx.params.load()?;
        let duty = snapshot.duty(&profile.feed_pump)?;
        let threshold = snapshot.threshold_min(&profile.stabilizer_level)?;
        let cycle = DutyCycle::new(duty.interval, duty.runtime, duty.delay)?;

        if gate.fires(&cycle, ctx.clock.elapsed()) && level.value() > threshold {
            if common::clear_to_activate(&ctx, &pump, &snapshot).await? {
                common::pulse(&ctx, &pump, duty.runtime, "evaporator feed pump").await?;
            }
        }

        cadence.wait().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Harness, harness};
    use std::time::Duration;

    const PARAMS: &str = r#"
initial_wait_time = 0.0
tau_M0102_interval = 60.0
tau_M0102_runtime = 5.0
tau_M0102_delay = 0.0
threshold_min_B0101 = 15.0
relaunch_M0102 = "False"
"#;

    async fn settle(harness: &Harness, secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        harness.ctx.shutdown.request();
    }

    #[tokio::test(start_paused = true)]
    async fn aligned_tick_produces_exactly_one_on_off_pair() {
        let h = harness(PARAMS);
        h.bus.set_value("analog_in0", 20.0);
        h.ctx.registry.sensor("B0101").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        // Runtime zero is the first aligned tick; stop before the next
        // window at 60 s.
        settle(&h, 30).await;
        task.await.unwrap().unwrap();

        assert_eq!(h.bus.writes_to("digital_out1"), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn level_below_threshold_blocks_activation() {
        let h = harness(PARAMS);
        h.bus.set_value("analog_in0", 10.0);
        h.ctx.registry.sensor("B0101").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        settle(&h, 30).await;
        task.await.unwrap().unwrap();

        assert!(h.bus.writes_to("digital_out1").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn each_window_fires_again() {
        let h = harness(PARAMS);
        h.bus.set_value("analog_in0", 20.0);
        h.ctx.registry.sensor("B0101").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        settle(&h, 130).await;
        task.await.unwrap().unwrap();

        // Windows at 0, 60, 120 → three pairs.
        assert_eq!(
            h.bus.writes_to("digital_out1"),
            vec![true, false, true, false, true, false]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tripped_overcurrent_without_relaunch_ends_false() {
        let h = harness(PARAMS);
        h.bus.set_value("analog_in0", 20.0);
        h.ctx.registry.sensor("B0101").unwrap().refresh(h.bus.as_ref());
        // Current monitor reports overcurrent.
        h.bus.set_state("digital_in1", true);
        h.ctx.registry.sensor("B0103").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        settle(&h, 30).await;
        task.await.unwrap().unwrap();

        // Forced deactivation only — never switched on.
        assert_eq!(h.bus.writes_to("digital_out1"), vec![false]);
        assert!(!h.ctx.registry.actuator("M0102").unwrap().state());
    }

    #[tokio::test(start_paused = true)]
    async fn threshold_edits_take_effect_live() {
        let h = harness(PARAMS);
        h.bus.set_value("analog_in0", 20.0);
        h.ctx.registry.sensor("B0101").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(30)).await;

        // Operator raises the threshold above the current level; the next
        // window must not activate.
        h.set_params(&PARAMS.replace("threshold_min_B0101 = 15.0", "threshold_min_B0101 = 25.0"));
        tokio::time::sleep(Duration::from_secs(60)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        // Only the window at t=0 pulsed; the window at t=60 was blocked.
        assert_eq!(h.bus.writes_to("digital_out1"), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_parameter_terminates_the_loop() {
        let h = harness("initial_wait_time = 0.0\n");
        let task = tokio::spawn(run(h.ctx.clone()));
        let result = task.await.unwrap();
        assert!(result.is_err());
    }
}
