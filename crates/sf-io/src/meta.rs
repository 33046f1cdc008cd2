//! Device metadata document (`io_list.toml`).
//!
//! The document carries one `[[sensor]]` / `[[actuator]]` entry per wired
//! device plus a `[machine]` table that maps process roles (feed pump,
//! stabilizer level, …) to device names. Role defaults match the NH-25
//! wiring, so a stock machine needs no `[machine]` table at all.

use crate::{IoError, IoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether a channel carries a continuous value or an on/off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Analog,
    Digital,
}

/// Static description of one sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorMeta {
    pub name: String,
    pub descr: String,
    /// Device-type label for log rows (e.g. "EZO-pH", "PX-AI").
    pub kind: String,
    pub address: String,
    pub channel: Channel,
    /// Calibration polynomial `quad_gain*v^2 + gain*v + offset`, applied to
    /// analog raw values. Identity by default.
    #[serde(default)]
    pub quad_gain: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub calibrated: bool,
}

fn default_gain() -> f64 {
    1.0
}

/// Static description of one actuator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorMeta {
    pub name: String,
    pub descr: String,
    pub kind: String,
    pub address: String,
    /// Motor-type actuators get the overcurrent interlock.
    #[serde(default)]
    pub motor: bool,
    /// Name of the current sensor watching this motor, if wired.
    #[serde(default)]
    pub overcurrent_sensor: Option<String>,
}

/// Role-to-device wiring for one machine variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineProfile {
    #[serde(default = "d_stirrer")]
    pub stirrer: String,
    #[serde(default = "d_feed_pump")]
    pub feed_pump: String,
    #[serde(default = "d_drain_pump")]
    pub drain_pump: String,
    #[serde(default = "d_flush_pump")]
    pub flush_pump: String,
    #[serde(default = "d_disc_motor")]
    pub disc_motor: String,
    #[serde(default = "d_fans")]
    pub fans: String,
    #[serde(default = "d_sludge_pump")]
    pub sludge_pump: String,
    #[serde(default = "d_dehumidifier")]
    pub dehumidifier: String,
    #[serde(default = "d_stabilizer_level")]
    pub stabilizer_level: String,
    #[serde(default = "d_stabilizer_ph")]
    pub stabilizer_ph: String,
    #[serde(default = "d_collector_level")]
    pub collector_level: String,
    #[serde(default = "d_evaporator_level")]
    pub evaporator_level: String,
    #[serde(default = "d_evaporator_ph")]
    pub evaporator_ph: String,
    #[serde(default = "d_concentrate_full")]
    pub concentrate_full: String,
}

fn d_stirrer() -> String {
    "M0101".into()
}
fn d_feed_pump() -> String {
    "M0102".into()
}
fn d_drain_pump() -> String {
    "M0111".into()
}
fn d_flush_pump() -> String {
    "M0112".into()
}
fn d_disc_motor() -> String {
    "M0201".into()
}
fn d_fans() -> String {
    "M0202".into()
}
fn d_sludge_pump() -> String {
    "M0203".into()
}
fn d_dehumidifier() -> String {
    "M0301".into()
}
fn d_stabilizer_level() -> String {
    "B0101".into()
}
fn d_stabilizer_ph() -> String {
    "B0102".into()
}
fn d_collector_level() -> String {
    "B0111".into()
}
fn d_evaporator_level() -> String {
    "B0201".into()
}
fn d_evaporator_ph() -> String {
    "B0202".into()
}
fn d_concentrate_full() -> String {
    "B0401".into()
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            stirrer: d_stirrer(),
            feed_pump: d_feed_pump(),
            drain_pump: d_drain_pump(),
            flush_pump: d_flush_pump(),
            disc_motor: d_disc_motor(),
            fans: d_fans(),
            sludge_pump: d_sludge_pump(),
            dehumidifier: d_dehumidifier(),
            stabilizer_level: d_stabilizer_level(),
            stabilizer_ph: d_stabilizer_ph(),
            collector_level: d_collector_level(),
            evaporator_level: d_evaporator_level(),
            evaporator_ph: d_evaporator_ph(),
            concentrate_full: d_concentrate_full(),
        }
    }
}

/// Full metadata document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoDocument {
    #[serde(default)]
    pub machine: Option<MachineProfile>,
    #[serde(default, rename = "sensor")]
    pub sensors: Vec<SensorMeta>,
    #[serde(default, rename = "actuator")]
    pub actuators: Vec<ActuatorMeta>,
}

impl IoDocument {
    pub fn profile(&self) -> MachineProfile {
        self.machine.clone().unwrap_or_default()
    }
}

pub fn load_io_document(path: &Path) -> IoResult<IoDocument> {
    let content = std::fs::read_to_string(path)?;
    let doc: IoDocument = toml::from_str(&content).map_err(IoError::Toml)?;
    Ok(doc)
}
