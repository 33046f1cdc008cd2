//! Device transport boundary.

use crate::IoResult;
use std::sync::Arc;

/// One raw acquisition from a device channel.
///
/// Analog channels populate `value` (and `aux1`/`aux2` for combined probes
/// reporting a secondary quantity, e.g. humidity plus temperature); digital
/// channels populate `state`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub aux1: f64,
    pub aux2: f64,
    pub state: bool,
}

impl Reading {
    pub fn analog(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn digital(state: bool) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}

/// Capability interface to the physical I/O transport.
///
/// Implementations are expected to be short blocking calls — any protocol
/// retry or timeout policy belongs to the adapter, not to the control
/// loops. Both operations may be called concurrently from several loop
/// tasks.
pub trait DeviceBus: Send + Sync {
    /// Acquire a fresh reading from the channel at `address`.
    fn read(&self, address: &str) -> IoResult<Reading>;

    /// Drive the output channel at `address` on or off.
    fn write(&self, address: &str, on: bool) -> IoResult<()>;
}

/// Bus handle shared by every loop task.
pub type SharedBus = Arc<dyn DeviceBus>;
