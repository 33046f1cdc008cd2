//! sf-core: stable foundation for stillflow.
//!
//! Contains:
//! - error (shared error types)
//! - clock (process runtime clock with initial-wait offset)
//! - numeric (float guards for values crossing the config boundary)

pub mod clock;
pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use clock::RunClock;
pub use error::{SfError, SfResult};
pub use numeric::*;
