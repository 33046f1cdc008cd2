//! Device registry: ownership, lookup, snapshot, safe state.

use crate::actuator::Actuator;
use crate::device::DeviceBus;
use crate::meta::{IoDocument, MachineProfile};
use crate::sensor::Sensor;
use crate::{IoError, IoResult};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Live values exposed to the operator layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IoSnapshot {
    pub sensors: BTreeMap<String, f64>,
    pub actuators: BTreeMap<String, bool>,
}

/// Owns every sensor and actuator handle for the process lifetime.
/// Handles are `Arc`-shared into the loop tasks; the registry itself never
/// mutates them after construction.
#[derive(Debug)]
pub struct IoRegistry {
    sensors: Vec<Arc<Sensor>>,
    actuators: Vec<Arc<Actuator>>,
    profile: MachineProfile,
}

impl IoRegistry {
    pub fn from_document(doc: IoDocument) -> Self {
        let profile = doc.profile();
        for meta in &doc.sensors {
            tracing::debug!(sensor = %meta.name, descr = %meta.descr, kind = %meta.kind, "registered");
        }
        for meta in &doc.actuators {
            tracing::debug!(actuator = %meta.name, descr = %meta.descr, kind = %meta.kind, "registered");
        }
        Self {
            sensors: doc.sensors.into_iter().map(|m| Arc::new(Sensor::new(m))).collect(),
            actuators: doc
                .actuators
                .into_iter()
                .map(|m| Arc::new(Actuator::new(m)))
                .collect(),
            profile,
        }
    }

    pub fn load(path: &Path) -> IoResult<Self> {
        Ok(Self::from_document(crate::meta::load_io_document(path)?))
    }

    pub fn profile(&self) -> &MachineProfile {
        &self.profile
    }

    pub fn sensors(&self) -> &[Arc<Sensor>] {
        &self.sensors
    }

    pub fn actuators(&self) -> &[Arc<Actuator>] {
        &self.actuators
    }

    pub fn sensor(&self, name: &str) -> IoResult<Arc<Sensor>> {
        self.sensors
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| IoError::UnknownDevice {
                name: name.to_string(),
            })
    }

    pub fn actuator(&self, name: &str) -> IoResult<Arc<Actuator>> {
        self.actuators
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| IoError::UnknownDevice {
                name: name.to_string(),
            })
    }

    /// Live snapshot of last-known sensor values and actuator states.
    pub fn snapshot(&self) -> IoSnapshot {
        IoSnapshot {
            sensors: self
                .sensors
                .iter()
                .map(|s| (s.name().to_string(), s.value()))
                .collect(),
            actuators: self
                .actuators
                .iter()
                .map(|a| (a.name().to_string(), a.state()))
                .collect(),
        }
    }

    /// Drive every actuator off. Used for the final safe-state reset; a
    /// failing device does not stop the sweep, the first error is returned
    /// after every actuator has been attempted.
    pub fn all_off(&self, bus: &dyn DeviceBus) -> IoResult<()> {
        let mut first_err = None;
        for act in &self.actuators {
            if let Err(err) = act.set_state(bus, false) {
                tracing::error!(actuator = %act.name(), %err, "safe-state reset failed");
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
