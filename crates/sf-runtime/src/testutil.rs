//! Shared fixtures for loop tests.

use crate::context::LoopCtx;
use crate::probe::FixedProbe;
use crate::shutdown::ShutdownSignal;
use sf_core::RunClock;
use sf_io::{IoDocument, IoRegistry, SharedBus, SimulatedBus};
use sf_ledger::{EventLedger, MeasurementLog, RoutineCounters};
use sf_params::ParameterStore;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Full NH-25-shaped metadata document for tests.
pub(crate) const IO_DOC: &str = r#"
[[sensor]]
name = "B0101"
descr = "stabilizer tank level"
kind = "PX-AI"
address = "analog_in0"
channel = "analog"

[[sensor]]
name = "B0102"
descr = "stabilizer pH"
kind = "EZO-pH"
address = "97"
channel = "analog"

[[sensor]]
name = "B0111"
descr = "collector tube level"
kind = "PX-AI"
address = "analog_in2"
channel = "analog"

[[sensor]]
name = "B0201"
descr = "evaporator tank level"
kind = "PX-AI"
address = "analog_in3"
channel = "analog"

[[sensor]]
name = "B0202"
descr = "evaporator pH"
kind = "EZO-pH"
address = "99"
channel = "analog"

[[sensor]]
name = "B0401"
descr = "concentrate tank full switch"
kind = "PX-DI"
address = "digital_in0"
channel = "digital"

[[sensor]]
name = "B0103"
descr = "feed pump current monitor"
kind = "PX-DI"
address = "digital_in1"
channel = "digital"

[[sensor]]
name = "B0203"
descr = "disc motor current monitor"
kind = "PX-DI"
address = "digital_in2"
channel = "digital"

[[actuator]]
name = "M0101"
descr = "stabilizer stirrer"
kind = "PX-DO"
address = "digital_out0"
motor = true

[[actuator]]
name = "M0102"
descr = "evaporator feed pump"
kind = "PX-DO"
address = "digital_out1"
motor = true
overcurrent_sensor = "B0103"

[[actuator]]
name = "M0111"
descr = "collector drain pump"
kind = "PX-DO"
address = "digital_out2"

[[actuator]]
name = "M0112"
descr = "collector flush pump"
kind = "PX-DO"
address = "digital_out3"

[[actuator]]
name = "M0201"
descr = "evaporator disc motor"
kind = "PX-DO"
address = "digital_out4"
motor = true
overcurrent_sensor = "B0203"

[[actuator]]
name = "M0202"
descr = "evaporator fans"
kind = "PX-DO"
address = "digital_out5"

[[actuator]]
name = "M0203"
descr = "concentrate sludge pump"
kind = "PX-DO"
address = "digital_out6"

[[actuator]]
name = "M0301"
descr = "dehumidifier"
kind = "PX-DO"
address = "digital_out7"
"#;

pub(crate) struct Harness {
    pub dir: tempfile::TempDir,
    pub bus: Arc<SimulatedBus>,
    pub ctx: LoopCtx,
}

impl Harness {
    /// Rewrite the parameter document; the next `load()` observes it.
    pub fn set_params(&self, params_toml: &str) {
        std::fs::write(self.dir.path().join("parameters.toml"), params_toml).unwrap();
    }
}

/// Build a loop context over a simulated bus and temp data directory.
/// Must run inside a tokio runtime (the clock reads tokio time).
pub(crate) fn harness(params_toml: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let params_path = dir.path().join("parameters.toml");
    std::fs::write(&params_path, params_toml).unwrap();

    let doc: IoDocument = toml::from_str(IO_DOC).unwrap();
    let registry = Arc::new(IoRegistry::from_document(doc));
    let bus = Arc::new(SimulatedBus::new());
    let shared: SharedBus = bus.clone();

    let ledger = Arc::new(EventLedger::open(dir.path().join("event_ledger.csv")));
    let counters = Arc::new(RoutineCounters::recover(&ledger).unwrap());
    let measurements = Arc::new(MeasurementLog::new(dir.path().join("data"), "TEST").unwrap());

    let ctx = LoopCtx {
        params: Arc::new(ParameterStore::new(&params_path)),
        registry,
        bus: shared,
        ledger,
        measurements,
        counters,
        probe: Arc::new(FixedProbe(47.0)),
        clock: RunClock::start(0.0),
        shutdown: ShutdownSignal::new(),
        drain_running: Arc::new(AtomicBool::new(false)),
        evaporation_running: Arc::new(AtomicBool::new(false)),
    };

    Harness { dir, bus, ctx }
}

/// Rows currently in the event ledger file.
pub(crate) fn ledger_rows(harness: &Harness) -> Vec<String> {
    std::fs::read_to_string(harness.ctx.ledger.path())
        .map(|c| c.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
