//! Data-acquisition loop.
//!
//! On each sampling tick one logging task is fanned out per sensor and per
//! actuator, plus a synthetic event row (the inflow counters) and a system
//! row (board temperature). The loop joins all of them, then sleeps the
//! remainder of the sampling interval. When the work ran longer than the
//! interval it logs an overrun warning and starts the next cycle
//! immediately — there is no catch-up.
//!
//! Row-level write failures are logged and dropped; a dead measurement
//! file must not take the acquisition loop down with it.

use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep};

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let interval = snapshot.sampling_interval();
        let started = Instant::now();

        let mut tasks = JoinSet::new();

        for sensor in ctx.registry.sensors() {
            let sensor = sensor.clone();
            let bus = ctx.bus.clone();
            let log = ctx.measurements.clone();
            let runtime = ctx.clock.wall_runtime();
            tasks.spawn(async move {
                let value = sensor.refresh(bus.as_ref());
                let reading = sensor.reading();
                let meta = sensor.meta();
                if let Err(err) = log.append_sensor(
                    runtime,
                    &meta.kind,
                    &meta.name,
                    &meta.address,
                    reading.state,
                    value,
                    reading.aux1,
                    reading.aux2,
                ) {
                    tracing::error!(sensor = %meta.name, %err, "failed to log sensor row");
                }
            });
        }

        for actuator in ctx.registry.actuators() {
            let actuator = actuator.clone();
            let log = ctx.measurements.clone();
            let runtime = ctx.clock.wall_runtime();
            tasks.spawn(async move {
                let meta = actuator.meta();
                if let Err(err) = log.append_actuator(
                    runtime,
                    &meta.kind,
                    &meta.name,
                    &meta.address,
                    actuator.state(),
                ) {
                    tracing::error!(actuator = %meta.name, %err, "failed to log actuator row");
                }
            });
        }

        {
            let counters = ctx.counters.clone();
            let log = ctx.measurements.clone();
            let runtime = ctx.clock.wall_runtime();
            tasks.spawn(async move {
                if let Err(err) = log.append_event(
                    runtime,
                    counters.event_count(),
                    counters.last_event_inflow(),
                    counters.cumulative_inflow(),
                ) {
                    tracing::error!(%err, "failed to log event row");
                }
            });
        }

        {
            let probe = ctx.probe.clone();
            let log = ctx.measurements.clone();
            let runtime = ctx.clock.wall_runtime();
            tasks.spawn(async move {
                match probe.cpu_temperature() {
                    Some(temperature) => {
                        if let Err(err) = log.append_system(runtime, temperature) {
                            tracing::error!(%err, "failed to log system row");
                        }
                    }
                    None => tracing::warn!("board temperature unavailable"),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if joined.is_err() {
                tracing::error!("logging task panicked");
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        if elapsed < interval {
            sleep(Duration::from_secs_f64(interval - elapsed)).await;
        } else {
            tracing::warn!(
                elapsed,
                interval,
                "sampling interval is shorter than the time required for reading device data"
            );
        }
    }

    if let Some(path) = ctx.measurements.current_path() {
        tracing::info!(file = %path.display(), "data logging stopped");
    }
    Ok(())
}
