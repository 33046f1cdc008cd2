//! The control loop set.
//!
//! One long-running task per responsibility. Loops never talk to each
//! other directly; they share sensor/actuator handles, the ledger, and two
//! single-writer flags (drain priority, evaporation run state).

pub mod common;
pub mod dataq;
pub mod discharge;
pub mod drain;
pub mod evaporation;
pub mod feed;
pub mod flush;
pub mod observer;
pub mod stirrer;
pub mod telemetry;

use crate::context::LoopCtx;
use crate::error::RuntimeResult;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Every control loop the supervisor can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopName {
    DataAcquisition,
    Stirrer,
    Feed,
    Drain,
    Flush,
    Evaporation,
    Discharge,
    Observer,
    TelemetryPrint,
}

impl LoopName {
    pub const ALL: [LoopName; 9] = [
        LoopName::DataAcquisition,
        LoopName::Stirrer,
        LoopName::Feed,
        LoopName::Drain,
        LoopName::Flush,
        LoopName::Evaporation,
        LoopName::Discharge,
        LoopName::Observer,
        LoopName::TelemetryPrint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopName::DataAcquisition => "data_acquisition",
            LoopName::Stirrer => "stirrer",
            LoopName::Feed => "feed",
            LoopName::Drain => "drain",
            LoopName::Flush => "flush",
            LoopName::Evaporation => "evaporation",
            LoopName::Discharge => "discharge",
            LoopName::Observer => "observer",
            LoopName::TelemetryPrint => "telemetry_print",
        }
    }
}

impl fmt::Display for LoopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoopName::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown loop name: {s}"))
    }
}

/// The subset of loops to run; all of them by default. Consumed by the
/// operator layer to disable individual responsibilities before start.
#[derive(Debug, Clone)]
pub struct LoopSet(HashSet<LoopName>);

impl Default for LoopSet {
    fn default() -> Self {
        Self(LoopName::ALL.into_iter().collect())
    }
}

impl LoopSet {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn none() -> Self {
        Self(HashSet::new())
    }

    pub fn enable(&mut self, name: LoopName) {
        self.0.insert(name);
    }

    pub fn disable(&mut self, name: LoopName) {
        self.0.remove(&name);
    }

    pub fn contains(&self, name: LoopName) -> bool {
        self.0.contains(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = LoopName> + '_ {
        LoopName::ALL.into_iter().filter(|n| self.0.contains(n))
    }
}

/// Run one loop body to completion.
pub(crate) async fn run_loop(name: LoopName, ctx: LoopCtx) -> RuntimeResult<()> {
    match name {
        LoopName::DataAcquisition => dataq::run(ctx).await,
        LoopName::Stirrer => stirrer::run(ctx).await,
        LoopName::Feed => feed::run(ctx).await,
        LoopName::Drain => drain::run(ctx).await,
        LoopName::Flush => flush::run(ctx).await,
        LoopName::Evaporation => evaporation::run(ctx).await,
        LoopName::Discharge => discharge::run(ctx).await,
        LoopName::Observer => observer::run(ctx).await,
        LoopName::TelemetryPrint => telemetry::run(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_names_round_trip() {
        for name in LoopName::ALL {
            assert_eq!(name.as_str().parse::<LoopName>().unwrap(), name);
        }
        assert!("not_a_loop".parse::<LoopName>().is_err());
    }

    #[test]
    fn loop_set_enable_disable() {
        let mut set = LoopSet::all();
        assert!(set.contains(LoopName::Flush));
        set.disable(LoopName::Flush);
        assert!(!set.contains(LoopName::Flush));
        set.enable(LoopName::Flush);
        assert!(set.contains(LoopName::Flush));
        assert_eq!(LoopSet::all().iter().count(), LoopName::ALL.len());
    }
}
