//! Collector flush loop.
//!
//! Companion to the drain loop on the same physical path: after an inflow
//! the collector tube is rinsed for the configured runtime. Drain has
//! priority — while `drain_running` is held this loop stands down and
//! re-evaluates on its next poll.

use super::common;
use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::sleep;

const POLL: Duration = Duration::from_secs(10);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let pump = ctx.registry.actuator(&profile.flush_pump)?;
    let level = ctx.registry.sensor(&profile.collector_level)?;

    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let runtime = snapshot.tau_runtime(&profile.flush_pump)?;
        let pre_delay = snapshot.tau_delay(&profile.flush_pump)?;
        let threshold = snapshot.threshold_min(&profile.collector_level)?;

        let drain_busy = ctx.drain_running.load(Ordering::SeqCst);
        if !drain_busy && level.value() > threshold {
            sleep(Duration::from_secs_f64(pre_delay.max(0.0))).await;

            // Drain may have claimed the path during the pre-delay.
            if ctx.drain_running.load(Ordering::SeqCst) {
                cadence.wait().await;
                continue;
            }

            common::pulse(&ctx, &pump, runtime, "collector flush pump").await?;
        }

        cadence.wait().await;
    }
    Ok(())
}
