use anyhow::{Context, Result};
use clap::Parser;
use gpuwatch::core::{Monitor, ShutdownSignal};
use gpuwatch::sinks::{JsonSink, LogSink};
use gpuwatch::{AppConfig, OutputFormat};
use gpuwatch_core::EventSink;
use log::{error, warn};
use std::path::PathBuf;

/// gpuwatch - Multi-vendor GPU monitor with thermal throttling detection
#[derive(Parser, Debug)]
#[command(name = "gpuwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.json in the platform config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Milliseconds between polls
    #[arg(short = 'i', long = "interval-ms", value_name = "MS")]
    interval_ms: Option<u64>,

    /// Temperature (°C) at which throttling detection starts
    #[arg(short = 't', long = "temp-threshold", value_name = "CELSIUS")]
    temp_threshold: Option<i32>,

    /// Emit events as JSON lines on stdout
    #[arg(long = "json")]
    json: bool,

    /// Stop after this many polls
    #[arg(short = 'n', long = "ticks", value_name = "COUNT")]
    ticks: Option<u64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long = "print-config")]
    print_config: bool,

    /// Debug verbosity level (0=info, 1=debug, 2=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting gpuwatch v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    apply_cli(&mut config, &cli);
    config.validate()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let binding = gpuwatch_sources::select(&config.backend_options())?;

    let sink: Box<dyn EventSink> = match config.output {
        OutputFormat::Log => Box::new(LogSink),
        OutputFormat::Json => Box::new(JsonSink::stdout()),
    };
    let mut monitor = Monitor::new(binding, config.thresholds.clone(), sink)
        .context("Failed to start monitor")?;

    let (trigger, signal) = ShutdownSignal::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.trigger();
        }
    });

    monitor.run(signal, cli.ticks).await;
    Ok(())
}

/// Command line flags take precedence over the config file
fn apply_cli(config: &mut AppConfig, cli: &Cli) {
    if let Some(interval_ms) = cli.interval_ms {
        config.thresholds.poll_interval_ms = interval_ms;
    }
    if let Some(temp_threshold) = cli.temp_threshold {
        config.thresholds.temp_threshold = temp_threshold;
    }
    if cli.json {
        config.output = OutputFormat::Json;
    }
}
