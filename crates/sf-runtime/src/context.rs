//! Shared state handed to every loop task.

use crate::probe::SystemProbe;
use crate::shutdown::ShutdownSignal;
use sf_core::RunClock;
use sf_io::{IoRegistry, MachineProfile, SharedBus};
use sf_ledger::{EventLedger, MeasurementLog, RoutineCounters};
use sf_params::ParameterStore;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Everything a control loop needs, cheap to clone per task.
///
/// Sensors and actuators are shared by reference through the registry; the
/// two cross-loop flags are single-writer: `drain_running` is written only
/// by the drain loop (observed by flush), `evaporation_running` only by the
/// evaporation loop (observed by discharge). Eventual consistency within
/// one poll period is acceptable for both.
#[derive(Clone)]
pub struct LoopCtx {
    pub params: Arc<ParameterStore>,
    pub registry: Arc<IoRegistry>,
    pub bus: SharedBus,
    pub ledger: Arc<EventLedger>,
    pub measurements: Arc<MeasurementLog>,
    pub counters: Arc<RoutineCounters>,
    pub probe: Arc<dyn SystemProbe>,
    pub clock: RunClock,
    pub shutdown: ShutdownSignal,
    pub drain_running: Arc<AtomicBool>,
    pub evaporation_running: Arc<AtomicBool>,
}

impl LoopCtx {
    pub fn profile(&self) -> &MachineProfile {
        self.registry.profile()
    }
}
