//! In-memory device bus for tests and `--simulate` operation.

use crate::device::{DeviceBus, Reading};
use crate::{IoError, IoResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Simulated transport: channels are plain map entries, reads can be made
/// to fail per address, and every actuator write is recorded in order.
#[derive(Debug, Default)]
pub struct SimulatedBus {
    inner: Mutex<SimInner>,
}

#[derive(Debug, Default)]
struct SimInner {
    channels: HashMap<String, Reading>,
    failing: HashSet<String>,
    writes: Vec<(String, bool)>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the analog value on a channel.
    pub fn set_value(&self, address: &str, value: f64) {
        self.lock().channels.entry(address.to_string()).or_default().value = value;
    }

    /// Set the digital state on a channel.
    pub fn set_state(&self, address: &str, state: bool) {
        self.lock().channels.entry(address.to_string()).or_default().state = state;
    }

    /// Set a full reading (combined probes with aux values).
    pub fn set_reading(&self, address: &str, reading: Reading) {
        self.lock().channels.insert(address.to_string(), reading);
    }

    /// Make reads on `address` fail until cleared.
    pub fn fail_reads(&self, address: &str, failing: bool) {
        let mut inner = self.lock();
        if failing {
            inner.failing.insert(address.to_string());
        } else {
            inner.failing.remove(address);
        }
    }

    /// Every write issued so far, in order.
    pub fn writes(&self) -> Vec<(String, bool)> {
        self.lock().writes.clone()
    }

    /// Last write issued to `address`, if any.
    pub fn last_write(&self, address: &str) -> Option<bool> {
        self.lock()
            .writes
            .iter()
            .rev()
            .find(|(a, _)| a == address)
            .map(|(_, on)| *on)
    }

    /// Writes issued to `address`, in order.
    pub fn writes_to(&self, address: &str) -> Vec<bool> {
        self.lock()
            .writes
            .iter()
            .filter(|(a, _)| a == address)
            .map(|(_, on)| *on)
            .collect()
    }
}

impl DeviceBus for SimulatedBus {
    fn read(&self, address: &str) -> IoResult<Reading> {
        let inner = self.lock();
        if inner.failing.contains(address) {
            return Err(IoError::ReadFailed {
                address: address.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(inner.channels.get(address).copied().unwrap_or_default())
    }

    fn write(&self, address: &str, on: bool) -> IoResult<()> {
        let mut inner = self.lock();
        inner.channels.entry(address.to_string()).or_default().state = on;
        inner.writes.push((address.to_string(), on));
        Ok(())
    }
}
