//! Controller-board health probe.
//!
//! The data-acquisition loop stamps one system row per sampling cycle with
//! the board temperature. Where that number comes from is
//! platform-specific, so it sits behind a capability trait like the device
//! bus does.

use std::path::PathBuf;

pub trait SystemProbe: Send + Sync {
    /// Board/CPU temperature in °C, `None` when unavailable.
    fn cpu_temperature(&self) -> Option<f64>;
}

/// Reads the kernel thermal zone (millidegrees Celsius).
#[derive(Debug, Clone)]
pub struct ThermalZoneProbe {
    path: PathBuf,
}

impl Default for ThermalZoneProbe {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
        }
    }
}

impl ThermalZoneProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SystemProbe for ThermalZoneProbe {
    fn cpu_temperature(&self) -> Option<f64> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let millidegrees: f64 = raw.trim().parse().ok()?;
        Some(millidegrees / 1000.0)
    }
}

/// Constant reading for tests and simulated operation.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub f64);

impl SystemProbe for FixedProbe {
    fn cpu_temperature(&self) -> Option<f64> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn thermal_zone_parses_millidegrees() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "48250").unwrap();
        file.flush().unwrap();

        let probe = ThermalZoneProbe::new(file.path());
        assert_eq!(probe.cpu_temperature(), Some(48.25));
    }

    #[test]
    fn missing_zone_reads_none() {
        let probe = ThermalZoneProbe::new("/nonexistent/thermal");
        assert_eq!(probe.cpu_temperature(), None);
    }
}
