//! Actuator handle with serialized writes.

use crate::IoResult;
use crate::device::DeviceBus;
use crate::meta::ActuatorMeta;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// An actuator shared by reference across all control loops.
///
/// Every `set_state` call holds the actuator's own lock across the bus
/// write and the recorded-state update, so two loops driving the same
/// device cannot interleave and lose a write — the last completed call wins
/// in real-time order and `state()` always reports it.
#[derive(Debug)]
pub struct Actuator {
    meta: ActuatorMeta,
    state: AtomicBool,
    write_lock: Mutex<()>,
}

impl Actuator {
    pub fn new(meta: ActuatorMeta) -> Self {
        Self {
            meta,
            state: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    pub fn meta(&self) -> &ActuatorMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Last commanded state.
    pub fn state(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Blocking set-state through the bus.
    pub fn set_state(&self, bus: &dyn DeviceBus, on: bool) -> IoResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        bus.write(&self.meta.address, on)?;
        self.state.store(on, Ordering::SeqCst);
        Ok(())
    }
}
