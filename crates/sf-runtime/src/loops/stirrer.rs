//! Stabilizer stirrer loop.
//!
//! Pure duty cycle: keeps the stabilizer tank mixed on a fixed rhythm, no
//! level gate.

use super::common;
use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use sf_controls::{DutyCycle, DutyCycleGate};
use std::time::Duration;

const POLL: Duration = Duration::from_millis(100);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let stirrer = ctx.registry.actuator(&profile.stirrer)?;

    let mut gate = DutyCycleGate::new();
    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let duty = snapshot.duty(&profile.stirrer)?;
        let cycle = DutyCycle::new(duty.interval, duty.runtime, duty.delay)?;

        if gate.fires(&cycle, ctx.clock.elapsed()) {
            if common::clear_to_activate(&ctx, &stirrer, &snapshot).await? {
                common::pulse(&ctx, &stirrer, duty.runtime, "stabilizer stirrer").await?;
            }
        }

        cadence.wait().await;
    }
    Ok(())
}
