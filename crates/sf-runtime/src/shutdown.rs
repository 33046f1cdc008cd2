//! Cooperative shutdown signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, idempotent, once-settable stop flag.
///
/// Every control loop checks it once per iteration; none of the bounded
/// in-actuation waits do. Worst-case latency from `request()` to a loop
/// observing it is therefore the loop's poll cadence plus its longest
/// configured actuation runtime.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns true for the call that actually set it,
    /// false for every later (redundant) request.
    pub fn request(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
