//! Concentrate discharge loop.
//!
//! Duty-cycles the sludge pump to push concentrate out of the evaporator,
//! but only while the concentrate tank has room and the evaporator holds
//! enough liquid. The disc motor gets a short pre-roll before the pump
//! starts so the sludge is moving when suction begins; afterwards the
//! motor is handed back to the evaporation loop (left on if that loop is
//! holding it, switched off otherwise).

use super::common;
use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use sf_controls::{DutyCycle, DutyCycleGate};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::sleep;

const POLL: Duration = Duration::from_millis(100);

/// Spin-up of the auxiliary disc motor before the pump starts.
const PRE_ROLL: Duration = Duration::from_secs(2);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let profile = ctx.profile().clone();
    let pump = ctx.registry.actuator(&profile.sludge_pump)?;
    let aux_motor = ctx.registry.actuator(&profile.disc_motor)?;
    let tank_full = ctx.registry.sensor(&profile.concentrate_full)?;
    let level = ctx.registry.sensor(&profile.evaporator_level)?;

    let mut gate = DutyCycleGate::new();
    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let duty = snapshot.duty(&profile.sludge_pump)?;
        let threshold = snapshot.threshold_min(&profile.evaporator_level)?;
        let cycle = DutyCycle::new(duty.interval, duty.runtime, duty.delay)?;

        if gate.fires(&cycle, ctx.clock.elapsed()) {
            // Only discharge when the concentrate tank is not full (the
            // switch reads false) and the evaporator level allows it.
            if !tank_full.state() && level.value() > threshold {
                if common::clear_to_activate(&ctx, &aux_motor, &snapshot).await? {
                    aux_motor.set_state(ctx.bus.as_ref(), true)?;
                    sleep(PRE_ROLL).await;

                    common::pulse(&ctx, &pump, duty.runtime, "concentrate sludge pump").await?;

                    // Hand the motor back: off unless the evaporation loop
                    // is holding it on.
                    if !ctx.evaporation_running.load(Ordering::SeqCst) {
                        aux_motor.set_state(ctx.bus.as_ref(), false)?;
                    }
                }
            }
        }

        cadence.wait().await;
    }
    Ok(())
}
