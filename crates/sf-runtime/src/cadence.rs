//! Per-loop poll cadence.
//!
//! Each control loop declares its cadence once instead of scattering ad hoc
//! sleeps; under a paused tokio clock tests drive loops through virtual
//! time. Missed ticks (an iteration that blocked past its period, e.g. an
//! active duty window) are delayed, not bursted — the loop never "catches
//! up" by running iterations back to back.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Fixed-period ticker for one loop.
#[derive(Debug)]
pub struct Cadence {
    period: Duration,
    interval: Interval,
}

impl Cadence {
    /// Create a ticker; the first [`Cadence::wait`] completes one full
    /// period from now.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Suspend until the next tick.
    pub async fn wait(&mut self) {
        self.interval.tick().await;
    }
}
