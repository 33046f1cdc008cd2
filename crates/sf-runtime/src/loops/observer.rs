//! Observer loop.
//!
//! Read-only watchdog over the whole sensor set. Each cycle it re-derives
//! the named alarm conditions and feeds them through the ledger's
//! rising-edge check, so a sustained condition is logged exactly once and
//! the operator alert fires once per transition into the condition.

use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use std::time::Duration;

const POLL: Duration = Duration::from_secs(10);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let stabilizer_level = ctx.registry.sensor(&profile.stabilizer_level)?;
    let stabilizer_ph = ctx.registry.sensor(&profile.stabilizer_ph)?;
    let collector_level = ctx.registry.sensor(&profile.collector_level)?;
    let evaporator_level = ctx.registry.sensor(&profile.evaporator_level)?;
    let evaporator_ph = ctx.registry.sensor(&profile.evaporator_ph)?;
    let concentrate_full = ctx.registry.sensor(&profile.concentrate_full)?;

    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;

        let ph_stab = stabilizer_ph.value();
        if ctx.ledger.check_rising_edge(
            "ph_low_stabilizer",
            ph_stab < snapshot.threshold_min(&profile.stabilizer_ph)?,
            "alert_ph_low_stabilizer",
            ph_stab,
        )? {
            tracing::warn!(ph = ph_stab, "pH in stabilizer is too low");
        }

        let ph_evap = evaporator_ph.value();
        if ctx.ledger.check_rising_edge(
            "ph_low_evaporator",
            ph_evap < snapshot.threshold_min(&profile.evaporator_ph)?,
            "alert_ph_low_evaporator",
            ph_evap,
        )? {
            tracing::warn!(ph = ph_evap, "pH in evaporator is too low");
        }

        let level = stabilizer_level.value();
        let min = snapshot.threshold_min(&profile.stabilizer_level)?;
        if ctx
            .ledger
            .check_rising_edge("level_low_stabilizer", level < min, "alert_level_low_stabilizer", level)?
        {
            tracing::warn!(
                level,
                min,
                "liquid level in stabilizer tank below minimum, no feed to evaporator"
            );
        }

        let max = snapshot.threshold_max(&profile.stabilizer_level)?;
        if ctx
            .ledger
            .check_rising_edge("level_high_stabilizer", level > max, "alert_level_high_stabilizer", level)?
        {
            tracing::warn!(level, max, "liquid level in stabilizer tank at maximum, effluent via overflow");
        }

        let inflow = collector_level.value();
        if ctx.ledger.check_rising_edge(
            "inflow_detected",
            inflow > snapshot.threshold_min(&profile.collector_level)?,
            "alert_inflow_detected",
            inflow,
        )? {
            tracing::warn!(
                events = ctx.counters.event_count(),
                "inflow detected, event counter updated"
            );
        }

        if ctx.ledger.check_rising_edge(
            "concentrate_tank_full",
            concentrate_full.state(),
            "alert_concentrate_tank_full",
            1.0,
        )? {
            tracing::warn!("concentrate tank is full");
        }

        let evap = evaporator_level.value();
        if ctx.ledger.check_rising_edge(
            "level_low_evaporator",
            evap < snapshot.threshold_min(&profile.evaporator_level)?,
            "alert_level_low_evaporator",
            evap,
        )? {
            tracing::warn!(
                level = evap,
                "liquid level in evaporator at minimum, evaporation and concentrate discharge disabled"
            );
        }

        // One interlock condition per wired motor current monitor.
        for actuator in ctx.registry.actuators() {
            let Some(sensor_name) = actuator.meta().overcurrent_sensor.as_deref() else {
                continue;
            };
            let tripped = ctx.registry.sensor(sensor_name)?.state();
            let key = format!("overcurrent_{}", actuator.name());
            let tag = format!("alert_overcurrent_{}", actuator.name());
            if ctx.ledger.check_rising_edge(&key, tripped, &tag, 1.0)? {
                tracing::warn!(motor = %actuator.name(), "motor overcurrent detected");
            }
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
threshold_min_B0101 = 15.0
threshold_max_B0101 = 80.0
threshold_min_B0102 = 6.0
threshold_min_B0111 = 1.0
threshold_min_B0201 = 10.0
threshold_min_B0202 = 6.0
"#;

    fn healthy(h: &crate::testutil::Harness) {
        h.bus.set_value("analog_in0", 40.0); // stabilizer level mid-range
        h.bus.set_value("97", 7.0); // stabilizer pH fine
        h.bus.set_value("analog_in2", 0.0); // collector quiet
        h.bus.set_value("analog_in3", 20.0); // evaporator level fine
        h.bus.set_value("99", 7.0); // evaporator pH fine
        for sensor in h.ctx.registry.sensors() {
            sensor.refresh(h.bus.as_ref());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_plant_logs_nothing() {
        let h = harness(PARAMS);
        healthy(&h);

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(35)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        assert!(ledger_rows(&h).is_empty());
        // Read-only: the observer never drives an actuator.
        assert!(h.bus.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sustained_condition_alerts_once() {
        let h = harness(PARAMS);
        healthy(&h);
        // Stabilizer pH collapses and stays low for several cycles.
        h.bus.set_value("97", 4.0);
        h.ctx.registry.sensor("B0102").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(55)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        let rows = ledger_rows(&h);
        let ph_rows: Vec<&String> = rows
            .iter()
            .filter(|r| r.contains("alert_ph_low_stabilizer"))
            .collect();
        assert_eq!(ph_rows.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn overcurrent_condition_is_per_motor() {
        let h = harness(PARAMS);
        healthy(&h);
        // Feed pump current monitor trips.
        h.bus.set_state("digital_in1", true);
        h.ctx.registry.sensor("B0103").unwrap().refresh(h.bus.as_ref());

        let task = tokio::spawn(run(h.ctx.clone()));
        tokio::time::sleep(Duration::from_secs(25)).await;
        h.ctx.shutdown.request();
        task.await.unwrap().unwrap();

        let rows = ledger_rows(&h);
        assert_eq!(
            rows.iter()
                .filter(|r| r.contains("alert_overcurrent_M0102"))
                .count(),
            1
        );
        assert!(!rows.iter().any(|r| r.contains("alert_overcurrent_M0201")));
    }
}
