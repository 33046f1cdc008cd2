//! Evaporation loop.
//!
//! Runs the evaporator group (disc motor, fans, dehumidifier) while the
//! evaporator tank holds enough liquid. Switching is hysteretic — the
//! group starts above `threshold_min` and only stops again below
//! `threshold_min - margin` — and additionally confined to the on-phase of
//! the disc motor's duty cycle, which bounds how often the group may
//! restart. Every on/off edge is appended to the event ledger as a 0/1
//! run flag.
//!
//! This loop owns the disc motor; the discharge loop's pre-roll borrows it
//! and consults the shared run flag before handing it back.

use super::common;
use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use sf_controls::{DutyCycle, HysteresisGate};
use sf_ledger::tags;
use std::sync::atomic::Ordering;
use std::time::Duration;

const POLL: Duration = Duration::from_secs(1);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let disc_motor = ctx.registry.actuator(&profile.disc_motor)?;
    let fans = ctx.registry.actuator(&profile.fans)?;
    let dehumidifier = ctx.registry.actuator(&profile.dehumidifier)?;
    let level = ctx.registry.sensor(&profile.evaporator_level)?;

    let mut hysteresis = HysteresisGate::new();
    let mut running = false;
    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let threshold = snapshot.threshold_min(&profile.evaporator_level)?;
        let margin = snapshot.threshold_margin(&profile.evaporator_level)?;
        let duty = snapshot.duty(&profile.disc_motor)?;
        let cycle = DutyCycle::new(duty.interval, duty.runtime, duty.delay)?;

        let level_ok = hysteresis.update(level.value(), threshold, margin);
        let phase_ok = cycle.in_on_phase(ctx.clock.elapsed());
        let want_on = level_ok && phase_ok;

        if want_on && !running {
            if common::clear_to_activate(&ctx, &disc_motor, &snapshot).await? {
                disc_motor.set_state(ctx.bus.as_ref(), true)?;
                fans.set_state(ctx.bus.as_ref(), true)?;
                dehumidifier.set_state(ctx.bus.as_ref(), true)?;
                running = true;
                ctx.evaporation_running.store(true, Ordering::SeqCst);
                ctx.ledger.append(tags::EVAPORATION_RUNNING, 1.0)?;
                tracing::info!(
                    level = level.value(),
                    "evaporation started at runtime: {:.2}s",
                    ctx.clock.elapsed()
                );
            }
        } else if !want_on && running {
            disc_motor.set_state(ctx.bus.as_ref(), false)?;
            fans.set_state(ctx.bus.as_ref(), false)?;
            dehumidifier.set_state(ctx.bus.as_ref(), false)?;
            running = false;
            ctx.evaporation_running.store(false, Ordering::SeqCst);
            ctx.ledger.append(tags::EVAPORATION_RUNNING, 0.0)?;
            tracing::info!(
                level = level.value(),
                "evaporation stopped at runtime: {:.2}s",
                ctx.clock.elapsed()
            );
        }

        cadence.wait().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{harness, ledger_rows};

    const PARAMS: &str = r#"
initial_wait_time = 0.0
tau_M0201_interval = 60.0
tau_M0201_runtime = 30.0
tau_M0201_delay = 0.0
threshold_min_B0201 = 10.0
threshold_margin_B0201 = 2.0
relaunch_M0201 = "True"
"#;

    fn set_level(h: &crate::testutil::Harness, level: f64) {
        h.bus.set_value("analog_in3", level);
        h.ctx.registry.sensor("B0201").unwrap().refresh(h.bus.as_ref());
    }

    #[tokio::test(start_paused = true)]
    async fn group_follows_the_duty_phase() {
        let h = harness(PARAMS);
        set_level(&h, 20.0);

        let task = tokio::spawn(run(h.ctx.clone()));
        // Phase on for [0, 30), off for [30, 60).
        tokio::time::sleep(Duration::from_secs(45)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        assert_eq!(h.bus.writes_to("digital_out4"), vec![true, false]); // disc motor
        assert_eq!(h.bus.writes_to("digital_out5"), vec![true, false]); // fans
        assert_eq!(h.bus.writes_to("digital_out7"), vec![true, false]); // dehumidifier

        let rows = ledger_rows(&h);
        let flags: Vec<&str> = rows
            .iter()
            .filter(|r| r.contains("evaporation_running"))
            .map(|r| r.rsplit(',').next().unwrap())
            .collect();
        assert_eq!(flags, vec!["1", "0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn hysteresis_holds_through_the_dead_band() {
        // Long on-phase so only the level drives switching.
        let h = harness(
            r#"
initial_wait_time = 0.0
tau_M0201_interval = 10000.0
tau_M0201_runtime = 9000.0
tau_M0201_delay = 0.0
threshold_min_B0201 = 10.0
threshold_margin_B0201 = 2.0
relaunch_M0201 = "True"
"#,
        );
        set_level(&h, 20.0);

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.ctx.evaporation_running.load(Ordering::SeqCst));

        // Inside the dead-band (8.0..=10.0): keeps running.
        set_level(&h, 9.0);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.ctx.evaporation_running.load(Ordering::SeqCst));

        // Below threshold - margin: stops.
        set_level(&h, 7.5);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!h.ctx.evaporation_running.load(Ordering::SeqCst));

        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        assert_eq!(h.bus.writes_to("digital_out4"), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn dry_evaporator_never_starts() {
        let h = harness(PARAMS);
        set_level(&h, 5.0);

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(20)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        assert!(h.bus.writes_to("digital_out4").is_empty());
        assert!(ledger_rows(&h).is_empty());
    }
}
