//! Telemetry print loop.
//!
//! Operator convenience: any sensor with a `print_<name>` flag set true in
//! the current parameter snapshot gets its value echoed every cycle.
//! Combined humidity probes also echo their auxiliary temperature. A
//! sensor without a flag key is reported once per cycle as a
//! configuration-completeness notice — non-fatal, the operator simply has
//! an incomplete parameter file.

use crate::cadence::Cadence;
use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use std::time::Duration;

const POLL: Duration = Duration::from_secs(2);

pub(crate) async fn run(ctx: LoopCtx) -> RuntimeResult<()> {
    let mut cadence = Cadence::new(POLL);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.params.load()?;
        let runtime = ctx.clock.elapsed();

        for sensor in ctx.registry.sensors() {
            match snapshot.print_flag(sensor.name()) {
                Some(flag) => {
                    if flag? {
                        let reading = sensor.reading();
                        if sensor.meta().kind.contains("HUM") {
                            tracing::info!(
                                "sensor '{}' reads: {} / {} at runtime {:.2} [s]",
                                sensor.name(),
                                reading.value,
                                reading.aux1,
                                runtime
                            );
                        } else {
                            tracing::info!(
                                "sensor '{}' reads: {} at runtime {:.2} [s]",
                                sensor.name(),
                                reading.value,
                                runtime
                            );
                        }
                    }
                }
                None => {
                    tracing::info!(
                        sensor = %sensor.name(),
                        "no flag for printing / not printing of sensor in parameter file"
                    );
                }
            }
        }

        cadence.wait().await;
    }
    Ok(())
}
