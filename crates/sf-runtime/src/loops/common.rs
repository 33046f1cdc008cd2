//! Shared actuation building blocks for the control loops.

use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use sf_controls::overcurrent::{self, GuardAction};
use sf_io::Actuator;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// One bounded on/off actuation: switch on, hold for `runtime` seconds,
/// switch off.
///
/// The hold is deliberately **not** cancellable — an actuation that has
/// started always completes its configured runtime, even if shutdown was
/// requested meanwhile. Runtimes are short and bounded; cutting a pump or
/// motor mid-stroke would change the physical process.
pub async fn pulse(
    ctx: &LoopCtx,
    actuator: &Arc<Actuator>,
    runtime: f64,
    label: &str,
) -> RuntimeResult<()> {
    let at = ctx.clock.elapsed();
    tracing::info!(actuator = %actuator.name(), "activating {label} at runtime: {at:.2}s");
    actuator.set_state(ctx.bus.as_ref(), true)?;

    sleep(Duration::from_secs_f64(runtime.max(0.0))).await;

    actuator.set_state(ctx.bus.as_ref(), false)?;
    tracing::info!(
        actuator = %actuator.name(),
        "deactivating {label} at runtime: {:.2}s",
        at + runtime
    );
    Ok(())
}

/// Overcurrent interlock, executed before a motor activation.
///
/// Consults the motor's wired current sensor (last-known state). If
/// tripped: hold for the grace period so the observer loop sees and logs
/// the condition, force the motor off, and report whether the caller may
/// activate after all (the per-actuator `relaunch_<name>` flag). Returns
/// true when the activation may proceed.
///
/// Non-motor actuators and motors without a wired current sensor always
/// proceed.
pub async fn clear_to_activate(
    ctx: &LoopCtx,
    motor: &Arc<Actuator>,
    snapshot: &sf_params::ParameterSnapshot,
) -> RuntimeResult<bool> {
    let meta = motor.meta();
    if !meta.motor {
        return Ok(true);
    }
    let Some(sensor_name) = meta.overcurrent_sensor.as_deref() else {
        return Ok(true);
    };

    let sensor = ctx.registry.sensor(sensor_name)?;
    let tripped = sensor.state();
    if !tripped {
        return Ok(true);
    }

    let relaunch = snapshot.relaunch(motor.name())?;
    tracing::warn!(
        motor = %motor.name(),
        sensor = %sensor_name,
        relaunch,
        "overcurrent detected, holding activation"
    );

    match overcurrent::assess(tripped, relaunch) {
        GuardAction::Proceed => Ok(true),
        GuardAction::HoldOff => {
            sleep(overcurrent::GRACE_PERIOD).await;
            motor.set_state(ctx.bus.as_ref(), false)?;
            tracing::warn!(motor = %motor.name(), "motor held off until operator intervention");
            Ok(false)
        }
        GuardAction::HoldThenRelaunch => {
            sleep(overcurrent::GRACE_PERIOD).await;
            motor.set_state(ctx.bus.as_ref(), false)?;
            tracing::info!(motor = %motor.name(), "relaunching motor after overcurrent grace period");
            Ok(true)
        }
    }
}
