//! Sensor Anomaly Indicator CLI
//!
//! Drives the indicator LEDs from live converter samples, or records
//! feature tables for model training.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sensor_anomaly_indicator::{
    config::Config,
    hardware::{AnalogInput, IndicatorBank, MemoryIndicators, SimulatedAdc, HARDWARE_SUPPORT},
    model::{FittedEnsemble, ModelPaths},
    monitor::{Monitor, MonitorSettings},
    recorder::SessionRecorder,
    stats::{create_shared_log_with_persistence, SharedRunLog},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anomaly-indicator")]
#[command(version = VERSION)]
#[command(about = "Sliding-window anomaly indicator for an I2C analog sensor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample, classify and drive the indicators until interrupted
    Run {
        /// Use the simulated converter and in-memory indicators
        #[arg(long)]
        simulate: bool,

        /// Seed for the simulated converter
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Override the tick period in milliseconds
        #[arg(long)]
        period_ms: Option<u64>,

        /// Directory holding scaler.json, outlier_model.json and class_model.json
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Record a fixed number of feature vectors to a CSV table
    Record {
        /// Number of rows to record
        #[arg(long, short)]
        count: Option<usize>,

        /// Output CSV path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Use the simulated converter
        #[arg(long)]
        simulate: bool,

        /// Seed for the simulated converter
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Probe the I2C bus for a supported converter
    Probe,

    /// Show configuration summary and cumulative statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            simulate,
            seed,
            period_ms,
            model_dir,
        } => cmd_run(simulate, seed, period_ms, model_dir),
        Commands::Record {
            count,
            output,
            simulate,
            seed,
        } => cmd_record(count, output, simulate, seed),
        Commands::Probe => cmd_probe(),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(
    simulate: bool,
    seed: u64,
    period_ms: Option<u64>,
    model_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Sensor Anomaly Indicator v{VERSION}");
    println!("Program is starting ...");
    println!();

    let mut config = Config::load().context("loading configuration")?;
    if let Some(ms) = period_ms {
        config.tick_period = Duration::from_millis(ms);
    }
    if let Some(dir) = model_dir {
        config.models = ModelPaths::in_dir(&dir);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let ensemble = FittedEnsemble::load(&config.models, config.feature_len())
        .context("loading model artifacts")?;

    let running = shutdown_flag()?;
    let log = create_shared_log_with_persistence(config.stats_path());

    println!("  Channel: {}", config.adc_channel);
    println!("  Window: {} samples", config.window_len);
    println!("  Tick period: {}ms", config.tick_period.as_millis());
    println!("  Run ID: {}", log.run_id());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let ticks = if simulate {
        let adc = simulated_adc(&config, seed);
        drive(adc, MemoryIndicators::new(), ensemble, &config, &log, &running)?
    } else {
        run_hardware(ensemble, &config, &log, &running)?
    };

    println!();
    println!("Ending program after {ticks} ticks");

    if let Err(e) = log.save() {
        eprintln!("Warning: Could not save run statistics: {e}");
    }
    println!();
    println!("{}", log.summary());
    Ok(())
}

/// Run the indicator loop until interrupted.
///
/// The monitor owns both handles; they are released when it goes out of
/// scope, whether the loop ends normally or with an error.
fn drive<A, I>(
    adc: A,
    indicators: I,
    ensemble: FittedEnsemble,
    config: &Config,
    log: &SharedRunLog,
    running: &AtomicBool,
) -> anyhow::Result<u64>
where
    A: AnalogInput,
    I: IndicatorBank,
{
    let mut monitor = Monitor::new(
        adc,
        indicators,
        ensemble,
        MonitorSettings::from(config),
        Arc::clone(log),
    );
    let ticks = monitor.run(running).context("indicator loop failed")?;
    Ok(ticks)
}

#[cfg(feature = "rpi")]
fn run_hardware(
    ensemble: FittedEnsemble,
    config: &Config,
    log: &SharedRunLog,
    running: &AtomicBool,
) -> anyhow::Result<u64> {
    use sensor_anomaly_indicator::hardware::{probe, GpioIndicators};

    let adc = probe(config.i2c_bus)?;
    println!(
        "Detected {} at 0x{:02x}",
        adc.model().name(),
        adc.model().address()
    );
    let indicators = GpioIndicators::new(&config.indicator_pins)?;
    drive(adc, indicators, ensemble, config, log, running)
}

#[cfg(not(feature = "rpi"))]
fn run_hardware(
    _ensemble: FittedEnsemble,
    _config: &Config,
    _log: &SharedRunLog,
    _running: &AtomicBool,
) -> anyhow::Result<u64> {
    bail!(no_hardware_message())
}

fn cmd_record(
    count: Option<usize>,
    output: Option<PathBuf>,
    simulate: bool,
    seed: u64,
) -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let count = count.unwrap_or(config.recorder.sample_count);
    let output = output.unwrap_or_else(|| config.recorder.output_path.clone());

    let running = shutdown_flag()?;
    let log = create_shared_log_with_persistence(config.stats_path());

    println!("Recording {count} feature vectors to {output:?}");
    println!("Press Ctrl+C to stop early");
    println!();

    let settings = MonitorSettings::from(&config);
    let table = if simulate {
        SessionRecorder::new(simulated_adc(&config, seed), settings).record(count, &running)?
    } else {
        record_hardware(&config, settings, count, &running)?
    };

    table
        .write_csv(&output)
        .with_context(|| format!("writing {output:?}"))?;
    log.record_rows(table.len() as u64);

    if table.len() < count {
        println!("Recording interrupted after {} of {count} rows", table.len());
    }
    println!(
        "Wrote {} rows x {} columns to {:?}",
        table.len(),
        table.columns(),
        output
    );

    if let Err(e) = log.save() {
        eprintln!("Warning: Could not save run statistics: {e}");
    }
    Ok(())
}

#[cfg(feature = "rpi")]
fn record_hardware(
    config: &Config,
    settings: MonitorSettings,
    count: usize,
    running: &AtomicBool,
) -> anyhow::Result<sensor_anomaly_indicator::FeatureTable> {
    let adc = sensor_anomaly_indicator::hardware::probe(config.i2c_bus)?;
    Ok(SessionRecorder::new(adc, settings).record(count, running)?)
}

#[cfg(not(feature = "rpi"))]
fn record_hardware(
    _config: &Config,
    _settings: MonitorSettings,
    _count: usize,
    _running: &AtomicBool,
) -> anyhow::Result<sensor_anomaly_indicator::FeatureTable> {
    bail!(no_hardware_message())
}

#[cfg(feature = "rpi")]
fn cmd_probe() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let adc = sensor_anomaly_indicator::hardware::probe(config.i2c_bus)?;
    println!(
        "Detected {} at 0x{:02x} on I2C bus {}",
        adc.model().name(),
        adc.model().address(),
        config.i2c_bus
    );
    Ok(())
}

#[cfg(not(feature = "rpi"))]
fn cmd_probe() -> anyhow::Result<()> {
    bail!(no_hardware_message())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    println!("Sensor Anomaly Indicator Status");
    println!("===============================");
    println!();
    println!(
        "Hardware support: {}",
        if HARDWARE_SUPPORT {
            "compiled in"
        } else {
            "not compiled (simulation only)"
        }
    );
    println!();

    println!("Configuration:");
    println!("  I2C bus / channel: {} / {}", config.i2c_bus, config.adc_channel);
    println!(
        "  Indicator pins (red/green/blue): {}/{}/{}",
        config.indicator_pins.red, config.indicator_pins.green, config.indicator_pins.blue
    );
    println!(
        "  Window: {} samples, baseline {}",
        config.window_len, config.baseline_sample
    );
    println!("  Feature length: {}", config.feature_len());
    println!("  Tick period: {}ms", config.tick_period.as_millis());
    println!();

    println!("Model artifacts:");
    for (name, path) in [
        ("scaler", &config.models.scaler),
        ("outlier model", &config.models.outlier),
        ("class model", &config.models.classifier),
    ] {
        let mark = if path.exists() { "✓" } else { "✗ missing" };
        println!("  {name}: {path:?} {mark}");
    }
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                for key in [
                    "ticks",
                    "outlier_ticks",
                    "red_ticks",
                    "green_ticks",
                    "blue_ticks",
                    "rows_recorded",
                ] {
                    if let Some(value) = stats.get(key) {
                        println!("  {key}: {value}");
                    }
                }
                if let Some(updated) = stats.get("last_updated") {
                    println!("  last_updated: {updated}");
                }
            }
        }
    } else {
        println!("No previous run data found.");
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Converter used by `--simulate`: noise around the baseline with a short
/// burst every 50 reads.
fn simulated_adc(config: &Config, seed: u64) -> SimulatedAdc {
    let mut adc = SimulatedAdc::new(seed).with_spikes(50, 3, 60.0);
    adc.base_level = config.baseline_sample;
    adc
}

#[cfg(not(feature = "rpi"))]
fn no_hardware_message() -> String {
    "this build has no hardware support; rebuild with `--features rpi` or pass `--simulate`"
        .to_string()
}

/// Install the Ctrl+C handler and return the flag it clears.
fn shutdown_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;
    Ok(running)
}
