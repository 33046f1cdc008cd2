//! sf-runtime: the concurrent process-control scheduling core.
//!
//! One tokio task per control loop, running for the process lifetime.
//! Every loop re-reads its parameters each iteration, decides through the
//! sf-controls gates, drives sf-io handles, and records events through
//! sf-ledger. A single shared [`ShutdownSignal`] is observed at every
//! loop's per-iteration check; the [`Supervisor`] owns spawn, join and the
//! final safe-state reset.
//!
//! Cancellation latency per loop is bounded by its poll cadence **plus**
//! any in-flight actuation wait: an actuator that has been switched on
//! always completes its configured runtime (see [`loops::common::pulse`]).

pub mod cadence;
pub mod context;
pub mod error;
pub mod loops;
pub mod probe;
pub mod shutdown;
pub mod supervisor;

pub use cadence::Cadence;
pub use context::LoopCtx;
pub use error::{RuntimeError, RuntimeResult};
pub use loops::{LoopName, LoopSet};
pub use probe::{FixedProbe, SystemProbe, ThermalZoneProbe};
pub use shutdown::ShutdownSignal;
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorHandle};

#[cfg(test)]
pub(crate) mod testutil;
