//! Error types for gate construction.

use thiserror::Error;

/// Result type for gate operations.
pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a gate constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
