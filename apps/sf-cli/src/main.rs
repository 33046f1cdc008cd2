use clap::{Parser, Subcommand};
use sf_io::{IoRegistry, SharedBus, SimulatedBus, load_io_document};
use sf_params::ParameterStore;
use sf_runtime::{
    FixedProbe, LoopName, LoopSet, RuntimeResult, Supervisor, SupervisorConfig, SystemProbe,
    ThermalZoneProbe,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "Stillflow CLI - batch process control supervisor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the process control supervisor
    Run {
        /// Directory holding parameters.toml and io_list.toml
        config_dir: PathBuf,
        /// Directory for the event ledger and measurement CSVs
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Use the in-memory simulated device bus instead of hardware
        #[arg(long)]
        simulate: bool,
        /// Disable a control loop (repeatable)
        #[arg(long, value_name = "LOOP")]
        disable: Vec<LoopName>,
        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Validate the parameter and device metadata documents
    Validate {
        /// Directory holding parameters.toml and io_list.toml
        config_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> RuntimeResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config_dir,
            data_dir,
            simulate,
            disable,
            duration,
        } => cmd_run(&config_dir, data_dir, simulate, disable, duration).await,
        Commands::Validate { config_dir } => cmd_validate(&config_dir),
    }
}

async fn cmd_run(
    config_dir: &Path,
    data_dir: PathBuf,
    simulate: bool,
    disable: Vec<LoopName>,
    duration: Option<f64>,
) -> RuntimeResult<()> {
    let bus: SharedBus = if simulate {
        println!("Running against the simulated device bus");
        Arc::new(SimulatedBus::new())
    } else {
        // The hardware transport is a separate adapter crate wired in per
        // installation; this binary only ships the simulated bus.
        eprintln!("No hardware transport adapter is built into sf-cli; use --simulate");
        std::process::exit(2);
    };

    // Board temperature from the kernel thermal zone where available.
    let thermal = ThermalZoneProbe::default();
    let probe: Arc<dyn SystemProbe> = if thermal.cpu_temperature().is_some() {
        Arc::new(thermal)
    } else {
        Arc::new(FixedProbe(40.0))
    };

    let mut loops = LoopSet::all();
    for name in &disable {
        println!("Loop disabled: {name}");
        loops.disable(*name);
    }

    let config = SupervisorConfig {
        parameter_file: config_dir.join("parameters.toml"),
        io_file: config_dir.join("io_list.toml"),
        data_dir,
        loops,
    };

    let supervisor = Supervisor::new(config, bus, probe)?;
    let handle = supervisor.spawn();
    println!("Process control running. Press Ctrl+C to stop.");

    match duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs_f64(secs)) => {
                    println!("Configured duration elapsed.");
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\nShutdown signal received. Cleaning up...");
                }
            }
        }
        None => {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutdown signal received. Cleaning up...");
        }
    }

    handle.shutdown();
    let snapshot = handle.snapshot();
    handle.join().await?;

    println!("\nLast known plant state:");
    for (name, value) in &snapshot.sensors {
        println!("  {name}: {value}");
    }
    for (name, state) in &snapshot.actuators {
        println!("  {name}: {}", if *state { "ON" } else { "OFF" });
    }
    Ok(())
}

fn cmd_validate(config_dir: &Path) -> RuntimeResult<()> {
    let parameter_file = config_dir.join("parameters.toml");
    let io_file = config_dir.join("io_list.toml");
    println!("Validating configuration in: {}", config_dir.display());

    let snapshot = ParameterStore::new(&parameter_file).load()?;
    let document = load_io_document(&io_file)?;
    let profile = document.profile();
    let registry = IoRegistry::from_document(document.clone());

    let mut warnings = 0usize;

    // Startup scalars.
    snapshot.initial_wait()?;
    println!("  machine_id: {}", snapshot.machine_id());
    println!("  sampling interval: {} s", snapshot.sampling_interval());

    // Every device role the loops address must exist.
    for sensor in [
        &profile.stabilizer_level,
        &profile.stabilizer_ph,
        &profile.collector_level,
        &profile.evaporator_level,
        &profile.evaporator_ph,
        &profile.concentrate_full,
    ] {
        registry.sensor(sensor)?;
    }
    for actuator in [
        &profile.stirrer,
        &profile.feed_pump,
        &profile.drain_pump,
        &profile.flush_pump,
        &profile.disc_motor,
        &profile.fans,
        &profile.sludge_pump,
        &profile.dehumidifier,
    ] {
        registry.actuator(actuator)?;
    }

    // Duty triples for the cyclic loops, with the off-phase margin check.
    for actuator in [
        &profile.stirrer,
        &profile.feed_pump,
        &profile.disc_motor,
        &profile.sludge_pump,
    ] {
        let duty = snapshot.duty(actuator)?;
        if !duty.timing_margin_ok() {
            println!(
                "  WARNING: tau_{actuator}_interval - tau_{actuator}_runtime should exceed 1 s \
                 ({} - {})",
                duty.interval, duty.runtime
            );
            warnings += 1;
        }
    }
    // Triggered loops only need runtime and pre-delay.
    for actuator in [&profile.drain_pump, &profile.flush_pump] {
        snapshot.tau_runtime(actuator)?;
        snapshot.tau_delay(actuator)?;
    }

    // Thresholds the loops compare against.
    snapshot.threshold_min(&profile.stabilizer_level)?;
    snapshot.threshold_max(&profile.stabilizer_level)?;
    snapshot.threshold_min(&profile.stabilizer_ph)?;
    snapshot.threshold_min(&profile.collector_level)?;
    snapshot.threshold_min(&profile.evaporator_level)?;
    snapshot.threshold_margin(&profile.evaporator_level)?;
    snapshot.threshold_min(&profile.evaporator_ph)?;

    // Motors with a wired current monitor need their relaunch flag, and
    // the monitor itself has to exist.
    for actuator in registry.actuators() {
        let meta = actuator.meta();
        if let Some(sensor) = meta.overcurrent_sensor.as_deref() {
            registry.sensor(sensor)?;
            snapshot.relaunch(&meta.name)?;
        }
    }

    // Print-flag completeness and calibration state are notices, not errors.
    for sensor in registry.sensors() {
        if snapshot.print_flag(sensor.name()).is_none() {
            println!("  NOTE: no print_{} flag in the parameter file", sensor.name());
            warnings += 1;
        }
        let meta = sensor.meta();
        if meta.channel == sf_io::Channel::Analog && !meta.calibrated {
            println!("  NOTE: analog sensor {} is not calibrated", meta.name);
            warnings += 1;
        }
    }

    if warnings == 0 {
        println!("✓ Configuration is valid");
    } else {
        println!("✓ Configuration is valid ({warnings} warnings)");
    }
    Ok(())
}
