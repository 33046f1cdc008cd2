//! Error type for the runtime layer.
//!
//! Wraps errors from the backend crates so loop bodies can use `?`
//! uniformly. A loop that returns an error terminates alone; siblings and
//! the supervisor keep running (the supervisor reports the loss when it
//! joins the task).

use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Params(#[from] sf_params::ParamsError),

    #[error("Device error: {0}")]
    Io(#[from] sf_io::IoError),

    #[error("Gate error: {0}")]
    Controls(#[from] sf_controls::ControlError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] sf_ledger::LedgerError),
}
