//! sf-ledger: durable event and measurement records.
//!
//! Two append-only CSV targets live here:
//!
//! - the **event ledger** — one row per discrete process event (inflow
//!   counters, run-flag transitions, operator alerts). The ledger is the
//!   sole source for rebuilding monotonic counters after a restart.
//! - the **measurement log** — one row per device per sampling cycle,
//!   rotated daily, consumed by offline analysis tooling.
//!
//! Multiple loop tasks write concurrently; each target serializes its
//! appends behind one mutex.

pub mod counters;
pub mod event;
pub mod measurement;

pub use counters::RoutineCounters;
pub use event::EventLedger;
pub use measurement::MeasurementLog;

/// Well-known ledger tags.
pub mod tags {
    /// Number of inflow events since first commissioning.
    pub const NBR_EVENTS: &str = "nbr_events";
    /// Volume of the most recent inflow event, liters.
    pub const LAST_EVENT_INFLOW: &str = "last_event_inflow";
    /// Cumulative inflow volume, liters.
    pub const CUMULATIVE_INFLOW: &str = "cumulative_inflow";
    /// Evaporation run flag, 0/1 per edge.
    pub const EVAPORATION_RUNNING: &str = "evaporation_running";
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
