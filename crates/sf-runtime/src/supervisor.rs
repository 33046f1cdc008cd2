//! Supervisor: owns the loop tasks and the shutdown path.

use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use crate::loops::{self, LoopName, LoopSet};
use crate::probe::SystemProbe;
use crate::shutdown::ShutdownSignal;
use sf_core::RunClock;
use sf_io::{IoRegistry, IoSnapshot, SharedBus};
use sf_ledger::{EventLedger, MeasurementLog, RoutineCounters};
use sf_params::ParameterStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::task::JoinHandle;

/// Where the documents and the data directory live, and which loops run.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Hot-reloaded parameter document.
    pub parameter_file: PathBuf,
    /// Device metadata document, read once here.
    pub io_file: PathBuf,
    /// Event ledger and measurement CSVs go below this directory.
    pub data_dir: PathBuf,
    /// The loops to start; all of them by default.
    pub loops: LoopSet,
}

/// Builds the shared state and spawns one task per enabled loop.
pub struct Supervisor {
    ctx: LoopCtx,
    loops: LoopSet,
}

impl Supervisor {
    /// Wire up registry, ledger, counters, measurement log and clock.
    ///
    /// The parameter document is read once here for the startup scalars
    /// (machine id, initial wait); the loops re-read it themselves on
    /// every iteration.
    pub fn new(
        config: SupervisorConfig,
        bus: SharedBus,
        probe: Arc<dyn SystemProbe>,
    ) -> RuntimeResult<Self> {
        let params = ParameterStore::new(&config.parameter_file);
        let snapshot = params.load()?;

        let registry = Arc::new(IoRegistry::load(&config.io_file)?);
        let measurements = Arc::new(MeasurementLog::new(&config.data_dir, snapshot.machine_id())?);
        let ledger = Arc::new(EventLedger::open(config.data_dir.join("event_ledger.csv")));
        let counters = Arc::new(RoutineCounters::recover(&ledger)?);
        tracing::info!(
            events = counters.event_count(),
            cumulative_inflow = counters.cumulative_inflow(),
            "counters recovered from ledger"
        );

        let clock = RunClock::start(snapshot.initial_wait()?);

        let ctx = LoopCtx {
            params: Arc::new(params),
            registry,
            bus,
            ledger,
            measurements,
            counters,
            probe,
            clock,
            shutdown: ShutdownSignal::new(),
            drain_running: Arc::new(AtomicBool::new(false)),
            evaporation_running: Arc::new(AtomicBool::new(false)),
        };

        Ok(Self {
            ctx,
            loops: config.loops,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.ctx.shutdown.clone()
    }

    /// Live snapshot of last-known sensor values and actuator states.
    pub fn snapshot(&self) -> IoSnapshot {
        self.ctx.registry.snapshot()
    }

    /// Start every enabled loop. Loop-local errors terminate only that
    /// loop; they are logged immediately and reported again when the
    /// handle joins.
    pub fn spawn(self) -> SupervisorHandle {
        let mut tasks = Vec::new();
        for name in self.loops.iter() {
            tracing::info!(%name, "starting control loop");
            let ctx = self.ctx.clone();
            let task: JoinHandle<RuntimeResult<()>> = tokio::spawn(async move {
                let result = loops::run_loop(name, ctx).await;
                if let Err(err) = &result {
                    tracing::error!(%name, %err, "control loop terminated");
                }
                result
            });
            tasks.push((name, task));
        }
        SupervisorHandle {
            ctx: self.ctx,
            tasks,
        }
    }
}

/// Handle on a running supervisor: snapshot queries, shutdown, join.
pub struct SupervisorHandle {
    ctx: LoopCtx,
    tasks: Vec<(LoopName, JoinHandle<RuntimeResult<()>>)>,
}

impl SupervisorHandle {
    pub fn snapshot(&self) -> IoSnapshot {
        self.ctx.registry.snapshot()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.ctx.shutdown.clone()
    }

    /// Request cooperative shutdown (idempotent).
    pub fn shutdown(&self) {
        if self.ctx.shutdown.request() {
            tracing::info!("shutdown requested, waiting for control loops");
        }
    }

    /// Join every loop task, then drive all actuators to the safe state.
    ///
    /// Call after [`SupervisorHandle::shutdown`]. Bounded by the largest
    /// poll cadence plus the longest configured actuation runtime — an
    /// in-flight actuation always completes before its loop observes the
    /// signal.
    pub async fn join(self) -> RuntimeResult<()> {
        for (name, task) in self.tasks {
            match task.await {
                Ok(Ok(())) => tracing::info!(%name, "control loop stopped"),
                Ok(Err(err)) => {
                    tracing::error!(%name, %err, "control loop had terminated with error");
                }
                Err(join_err) => tracing::error!(%name, %join_err, "control loop panicked"),
            }
        }

        self.ctx.registry.all_off(self.ctx.bus.as_ref())?;
        tracing::info!("all actuators reset to safe state");
        if let Some(path) = self.ctx.measurements.current_path() {
            tracing::info!(file = %path.display(), "measurement data stored");
        }
        Ok(())
    }
}
