//! sf-params: live process-control parameters.
//!
//! The parameter document (`parameters.toml`) is the operator's tuning
//! surface: duty-cycle timings, thresholds, relaunch and print flags. It is
//! re-read from disk on **every** access so a running machine picks up
//! edits immediately — no caching, no reload signal. Loops treat each
//! [`ParameterSnapshot`] as authoritative for exactly one iteration.

pub mod store;

pub use store::{DutyParams, ParameterSnapshot, ParameterStore};

pub type ParamsResult<T> = Result<T, ParamsError>;

#[derive(thiserror::Error, Debug)]
pub enum ParamsError {
    #[error("Missing parameter: {key}")]
    Missing { key: String },

    #[error("Malformed parameter {key}: expected {expected}")]
    Malformed { key: String, expected: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
