//! Process runtime clock.
//!
//! All duty-cycle arithmetic runs on "elapsed runtime": seconds since
//! process start plus a configured initial wait. The initial wait keeps
//! long-interval cycles from firing mid-window right after startup (it has
//! to be longer than the longest configured delay). During the wait the
//! elapsed runtime is negative; gates treat that as "before the first
//! window".
//!
//! Built on [`tokio::time::Instant`] so tests running under a paused tokio
//! clock can drive it without wall-clock sleeps.

use std::time::Duration;
use tokio::time::Instant;

/// Shared runtime clock, cheap to clone into every loop task.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    start: Instant,
    initial_wait: Duration,
}

impl RunClock {
    /// Start the clock now with the given initial wait in seconds.
    ///
    /// Negative or non-finite waits are treated as zero.
    pub fn start(initial_wait_secs: f64) -> Self {
        let wait = if initial_wait_secs.is_finite() && initial_wait_secs > 0.0 {
            Duration::from_secs_f64(initial_wait_secs)
        } else {
            Duration::ZERO
        };
        Self {
            start: Instant::now(),
            initial_wait: wait,
        }
    }

    /// Elapsed runtime in seconds since `start + initial_wait`.
    ///
    /// Negative while the initial wait has not passed yet.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64() - self.initial_wait.as_secs_f64()
    }

    /// Seconds since process start, ignoring the initial wait.
    ///
    /// This is the value stamped into measurement rows.
    pub fn wall_runtime(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// The configured initial wait.
    pub fn initial_wait(&self) -> Duration {
        self.initial_wait
    }
}
