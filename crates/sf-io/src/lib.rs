//! sf-io: sensor and actuator handles.
//!
//! The physical transport (PLC bus, I2C probes, relay boards) is an
//! external collaborator behind the [`DeviceBus`] trait; everything above
//! it — last-known readings, calibration, per-actuator write exclusion,
//! name lookup, the live snapshot — lives here. Device metadata comes from
//! the `io_list.toml` document loaded once at startup.

pub mod actuator;
pub mod device;
pub mod meta;
pub mod registry;
pub mod sensor;
pub mod sim;

pub use actuator::Actuator;
pub use device::{DeviceBus, Reading, SharedBus};
pub use meta::{ActuatorMeta, Channel, IoDocument, MachineProfile, SensorMeta, load_io_document};
pub use registry::{IoRegistry, IoSnapshot};
pub use sensor::Sensor;
pub use sim::SimulatedBus;

pub type IoResult<T> = Result<T, IoError>;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("Unknown device: {name}")]
    UnknownDevice { name: String },

    #[error("Unknown address: {address}")]
    UnknownAddress { address: String },

    #[error("Read failed at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Write failed at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
