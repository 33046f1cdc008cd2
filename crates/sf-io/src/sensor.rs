//! Sensor handle with last-known reading.

use crate::device::{DeviceBus, Reading};
use crate::meta::{Channel, SensorMeta};
use std::sync::RwLock;

/// A sensor shared by reference across all control loops.
///
/// Only [`Sensor::refresh`] touches the bus; every other accessor returns
/// the last-known reading. A transient bus failure is absorbed here: the
/// stale reading stays in place and a warning is logged, so control flow in
/// the loops never sees a read error.
#[derive(Debug)]
pub struct Sensor {
    meta: SensorMeta,
    last: RwLock<Reading>,
}

impl Sensor {
    pub fn new(meta: SensorMeta) -> Self {
        Self {
            meta,
            last: RwLock::new(Reading::default()),
        }
    }

    pub fn meta(&self) -> &SensorMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Last-known measured value (calibrated for analog channels).
    pub fn value(&self) -> f64 {
        self.reading().value
    }

    /// Last-known boolean state (digital channels).
    pub fn state(&self) -> bool {
        self.reading().state
    }

    pub fn reading(&self) -> Reading {
        *self.last.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocking re-read through the bus. Returns the value that is current
    /// after the call — fresh on success, stale on a transient failure.
    pub fn refresh(&self, bus: &dyn DeviceBus) -> f64 {
        match bus.read(&self.meta.address) {
            Ok(raw) => {
                let reading = self.calibrate(raw);
                *self.last.write().unwrap_or_else(|e| e.into_inner()) = reading;
                reading.value
            }
            Err(err) => {
                tracing::warn!(
                    sensor = %self.meta.name,
                    address = %self.meta.address,
                    %err,
                    "sensor read failed, keeping last value"
                );
                self.value()
            }
        }
    }

    fn calibrate(&self, raw: Reading) -> Reading {
        match self.meta.channel {
            Channel::Analog => Reading {
                value: self.meta.quad_gain * raw.value * raw.value
                    + self.meta.gain * raw.value
                    + self.meta.offset,
                ..raw
            },
            Channel::Digital => raw,
        }
    }
}
