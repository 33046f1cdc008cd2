//! Append-only event ledger with rising-edge de-duplication.

use crate::LedgerResult;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable event record store.
///
/// Rows are `timestamp,tag,value` lines. The edge map is in-memory only
/// and starts empty on every launch: prior edge history is not replayed,
/// only counters are recovered (via [`EventLedger::latest_counter`]).
#[derive(Debug)]
pub struct EventLedger {
    path: PathBuf,
    inner: Mutex<EdgeState>,
}

#[derive(Debug, Default)]
struct EdgeState {
    edges: HashMap<String, bool>,
}

impl EventLedger {
    /// Open (or create on first append) the ledger file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: Mutex::new(EdgeState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rising-edge check for one named condition.
    ///
    /// Returns true and appends a `{now, tag, value}` row iff the
    /// previously recorded state for `key` was false and `current` is
    /// true. The edge map is updated regardless of the outcome, so a
    /// sustained condition logs exactly once and each false→true
    /// transition logs exactly once.
    pub fn check_rising_edge(
        &self,
        key: &str,
        current: bool,
        tag: &str,
        value: f64,
    ) -> LedgerResult<bool> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let previous = inner.edges.insert(key.to_string(), current).unwrap_or(false);
        if !previous && current {
            self.append_line(tag, value)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Unconditional durable append.
    pub fn append(&self, tag: &str, value: f64) -> LedgerResult<()> {
        // Hold the edge-state lock to serialize the file append as well.
        let _inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.append_line(tag, value)
    }

    fn append_line(&self, tag: &str, value: f64) -> LedgerResult<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{timestamp},{tag},{value}")?;
        Ok(())
    }

    /// Scan the full ledger for the last row with `tag`; `0.0` when the
    /// file or the tag is absent. This is the counter recovery path, run
    /// once per counter at startup.
    pub fn latest_counter(&self, tag: &str) -> LedgerResult<f64> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0.0),
            Err(err) => return Err(err.into()),
        };

        let mut latest = 0.0;
        for line in content.lines() {
            let mut fields = line.splitn(3, ',');
            let (Some(_ts), Some(row_tag), Some(raw)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            if row_tag != tag {
                continue;
            }
            match raw.trim().parse::<f64>() {
                Ok(v) => latest = v,
                Err(_) => {
                    tracing::warn!(tag, row = line, "skipping unparseable ledger row");
                }
            }
        }
        Ok(latest)
    }
}
