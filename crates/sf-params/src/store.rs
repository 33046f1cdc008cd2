//! Parameter document loading and typed access.
//!
//! Recognized key patterns:
//! - `tau_<actuator>_{interval,runtime,delay}` — duty-cycle triple, seconds
//! - `threshold_{min,max}_<sensor>` — activation thresholds
//! - `relaunch_<actuator>` — overcurrent relaunch flag
//! - `print_<sensor>` — telemetry print flag
//! - scalars: `machine_id`, `dataq_sampling_interval`, `initial_wait_time`
//!
//! Flags accept native TOML booleans as well as the legacy string
//! spellings `"True"` / `"False"` found in existing parameter files.

use crate::{ParamsError, ParamsResult};
use std::path::{Path, PathBuf};
use toml::Table;
use toml::Value;

/// Handle on the parameter document. Holds only the path; every call to
/// [`ParameterStore::load`] re-reads and re-parses the file.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    path: PathBuf,
}

impl ParameterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document. Authoritative as of this instant.
    pub fn load(&self) -> ParamsResult<ParameterSnapshot> {
        let content = std::fs::read_to_string(&self.path)?;
        let table: Table = content.parse()?;
        Ok(ParameterSnapshot { table })
    }
}

/// Duty-cycle timing triple for one actuator, seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyParams {
    pub interval: f64,
    pub runtime: f64,
    pub delay: f64,
}

impl DutyParams {
    /// The interval must exceed the runtime by more than one second,
    /// otherwise back-to-back windows leave no off-phase.
    pub fn timing_margin_ok(&self) -> bool {
        self.interval - self.runtime > 1.0
    }
}

/// One immutable parse of the parameter document.
#[derive(Debug, Clone)]
pub struct ParameterSnapshot {
    table: Table,
}

impl ParameterSnapshot {
    /// Build a snapshot directly from a TOML table. Lets tests inject
    /// parameters without touching the filesystem.
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn float(&self, key: &str) -> ParamsResult<f64> {
        let raw = match self.table.get(key) {
            Some(Value::Float(v)) => *v,
            Some(Value::Integer(v)) => *v as f64,
            Some(_) => {
                return Err(ParamsError::Malformed {
                    key: key.to_string(),
                    expected: "number",
                });
            }
            None => {
                return Err(ParamsError::Missing {
                    key: key.to_string(),
                });
            }
        };
        // TOML happily encodes inf and nan; neither is a usable timing or
        // threshold value.
        sf_core::ensure_finite(raw, "parameter value").map_err(|_| ParamsError::Malformed {
            key: key.to_string(),
            expected: "finite number",
        })
    }

    pub fn string(&self, key: &str) -> ParamsResult<&str> {
        match self.table.get(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(ParamsError::Malformed {
                key: key.to_string(),
                expected: "string",
            }),
            None => Err(ParamsError::Missing {
                key: key.to_string(),
            }),
        }
    }

    pub fn flag(&self, key: &str) -> ParamsResult<bool> {
        match self.table.get(key) {
            Some(Value::Boolean(b)) => Ok(*b),
            Some(Value::String(s)) => match s.as_str() {
                "True" | "true" => Ok(true),
                "False" | "false" => Ok(false),
                _ => Err(ParamsError::Malformed {
                    key: key.to_string(),
                    expected: "boolean or \"True\"/\"False\"",
                }),
            },
            Some(_) => Err(ParamsError::Malformed {
                key: key.to_string(),
                expected: "boolean or \"True\"/\"False\"",
            }),
            None => Err(ParamsError::Missing {
                key: key.to_string(),
            }),
        }
    }

    /// Machine identifier stamped into measurement rows.
    pub fn machine_id(&self) -> String {
        self.string("machine_id").unwrap_or("Unknown-ID").to_string()
    }

    /// Data-acquisition sampling interval, seconds.
    pub fn sampling_interval(&self) -> f64 {
        self.float("dataq_sampling_interval").unwrap_or(60.0)
    }

    /// Startup offset before the first duty window may open. Required:
    /// it has to be longer than the longest configured delay, so there is
    /// no safe default.
    pub fn initial_wait(&self) -> ParamsResult<f64> {
        self.float("initial_wait_time")
    }

    pub fn tau_interval(&self, actuator: &str) -> ParamsResult<f64> {
        self.float(&format!("tau_{actuator}_interval"))
    }

    pub fn tau_runtime(&self, actuator: &str) -> ParamsResult<f64> {
        self.float(&format!("tau_{actuator}_runtime"))
    }

    pub fn tau_delay(&self, actuator: &str) -> ParamsResult<f64> {
        self.float(&format!("tau_{actuator}_delay"))
    }

    /// Assemble the `tau_<name>_{interval,runtime,delay}` triple for one
    /// actuator. Emits a timing warning when the off-phase margin is too
    /// small; the values are returned unchanged either way.
    pub fn duty(&self, actuator: &str) -> ParamsResult<DutyParams> {
        let duty = DutyParams {
            interval: self.tau_interval(actuator)?,
            runtime: self.tau_runtime(actuator)?,
            delay: self.tau_delay(actuator)?,
        };
        if !duty.timing_margin_ok() {
            tracing::warn!(
                actuator,
                interval = duty.interval,
                runtime = duty.runtime,
                "time difference between interval and runtime should be longer than 1 sec"
            );
        }
        Ok(duty)
    }

    pub fn threshold_min(&self, sensor: &str) -> ParamsResult<f64> {
        self.float(&format!("threshold_min_{sensor}"))
    }

    pub fn threshold_max(&self, sensor: &str) -> ParamsResult<f64> {
        self.float(&format!("threshold_max_{sensor}"))
    }

    /// Hysteresis dead-band below `threshold_min_<sensor>`. Zero when the
    /// key is not configured (plain threshold switching).
    pub fn threshold_margin(&self, sensor: &str) -> ParamsResult<f64> {
        let key = format!("threshold_margin_{sensor}");
        if self.contains(&key) {
            self.float(&key)
        } else {
            Ok(0.0)
        }
    }

    /// Overcurrent relaunch flag for one actuator.
    pub fn relaunch(&self, actuator: &str) -> ParamsResult<bool> {
        self.flag(&format!("relaunch_{actuator}"))
    }

    /// Telemetry print flag for one sensor, `None` when the key is absent
    /// (a configuration-completeness condition, not an error).
    pub fn print_flag(&self, sensor: &str) -> Option<ParamsResult<bool>> {
        let key = format!("print_{sensor}");
        if self.contains(&key) {
            Some(self.flag(&key))
        } else {
            None
        }
    }
}
