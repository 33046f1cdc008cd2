//! Per-cycle measurement log with daily rotation.
//!
//! Row layout (headerless CSV, one row per device per sampling cycle):
//!
//! ```text
//! timestamp, runtime, machine_id, io_type, device_kind, name, address, state, value, aux1, aux2
//! ```
//!
//! Event and system rows reuse the trailing columns for their payload and
//! pad with zeros, matching what the analysis tooling expects.

use crate::LedgerResult;
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Daily-rotated measurement CSV under a data directory.
///
/// File name: `<YYYY-MM-DD>_<machine_id>_measurement_data.csv`. A new file
/// is started the first time a row is appended on a new calendar date; the
/// file is created empty (no header).
#[derive(Debug)]
pub struct MeasurementLog {
    data_dir: PathBuf,
    machine_id: String,
    inner: Mutex<LogState>,
}

#[derive(Debug, Default)]
struct LogState {
    current: Option<(NaiveDate, PathBuf)>,
}

impl MeasurementLog {
    pub fn new(data_dir: impl Into<PathBuf>, machine_id: impl Into<String>) -> LedgerResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            machine_id: machine_id.into(),
            inner: Mutex::new(LogState::default()),
        })
    }

    /// Path of the file rows are currently appended to, once one exists.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .as_ref()
            .map(|(_, path)| path.clone())
    }

    /// One sensor row.
    #[allow(clippy::too_many_arguments)]
    pub fn append_sensor(
        &self,
        runtime: f64,
        kind: &str,
        name: &str,
        address: &str,
        state: bool,
        value: f64,
        aux1: f64,
        aux2: f64,
    ) -> LedgerResult<()> {
        self.append_row(
            runtime,
            "Sensor",
            &format!("{kind},{name},{address},{state},{value},{aux1},{aux2}"),
        )
    }

    /// One actuator row (no measured value, only the commanded state).
    pub fn append_actuator(
        &self,
        runtime: f64,
        kind: &str,
        name: &str,
        address: &str,
        state: bool,
    ) -> LedgerResult<()> {
        self.append_row(
            runtime,
            "Actuator",
            &format!("{kind},{name},{address},{state},0,0,0"),
        )
    }

    /// One synthetic event row carrying the inflow counters.
    pub fn append_event(
        &self,
        runtime: f64,
        nbr_events: u64,
        last_event_inflow: f64,
        cumulative_inflow: f64,
    ) -> LedgerResult<()> {
        self.append_row(
            runtime,
            "Event",
            &format!("{nbr_events},{last_event_inflow},{cumulative_inflow},0,0,0,0"),
        )
    }

    /// One system row (controller board temperature).
    pub fn append_system(&self, runtime: f64, cpu_temperature: f64) -> LedgerResult<()> {
        self.append_row(runtime, "CPU", &format!("{cpu_temperature},0,0,0,0,0,0"))
    }

    fn append_row(&self, runtime: f64, io_type: &str, tail: &str) -> LedgerResult<()> {
        let now = chrono::Local::now();
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        // Rotate on date change.
        let today = now.date_naive();
        let path: PathBuf = match &state.current {
            Some((date, path)) if *date == today => path.clone(),
            _ => {
                let file_name = format!(
                    "{}_{}_measurement_data.csv",
                    today.format("%Y-%m-%d"),
                    self.machine_id
                );
                let path = self.data_dir.join(file_name);
                if !path.exists() {
                    std::fs::File::create(&path)?;
                }
                state.current = Some((today, path.clone()));
                path
            }
        };

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(
            file,
            "{},{:.2},{},{},{}",
            now.format("%Y-%m-%d %H:%M:%S"),
            runtime,
            self.machine_id,
            io_type,
            tail
        )?;
        Ok(())
    }
}
