//! GPS Tracker - follow the device position on a map

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gps_tracker::{
    haversine_distance, ConfigurationManager, LocationSource, LocationTracker, OutputFormat,
    PlatformLocationSource, Position, ReplaySource, TerminalDisplay, TrackerConfig, TrackerError,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "gps-tracker")]
#[command(author, version, about = "Follow the device position on a map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Track using the platform location service
    Run {
        /// Output format for accepted positions
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Run the tracking pipeline over a recorded track (one `lat,lon` per line)
    Replay {
        /// Track file
        file: PathBuf,
        /// Minimum movement between accepted positions (meters)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Forward every position, ignoring the movement threshold
        #[arg(long)]
        no_filter: bool,
        /// Delay between replayed positions (milliseconds)
        #[arg(short, long, default_value = "0")]
        interval_ms: u32,
        /// Output format for accepted positions
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Print the great-circle distance between two positions
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lon1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lon2: f64,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Destination (defaults to tracker.json)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let default_level = if cli.verbose || config.debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run { format } => run_platform(config, format),
        Commands::Replay {
            file,
            threshold,
            no_filter,
            interval_ms,
            format,
        } => run_replay(config, &file, threshold, no_filter, interval_ms, format),
        Commands::Distance { lat1, lon1, lat2, lon2 } => {
            let distance = haversine_distance(&Position::new(lat1, lon1), &Position::new(lat2, lon2));
            println!("{:.3} m", distance);
            Ok(())
        }
        Commands::Config { action } => run_config(action, &config, cli.config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    match path {
        Some(path) => {
            let manager = ConfigurationManager::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            Ok(manager.get_config().clone())
        }
        None => Ok(TrackerConfig::default()),
    }
}

fn run_platform(mut config: TrackerConfig, format: Option<FormatArg>) -> Result<()> {
    if let Some(format) = format {
        config.display.output_format = format.into();
    }
    let display = terminal_display(&config);
    let mut tracker = LocationTracker::new(Box::new(PlatformLocationSource::new()), display, config);

    match tracker.start() {
        Ok(()) => {}
        // Already reported by the tracker; the map stays unpositioned
        Err(TrackerError::SourceUnavailable { .. } | TrackerError::PermissionDenied { .. }) => {
            return Ok(())
        }
        Err(e) => return Err(e.into()),
    }

    loop {
        tracker.wait_and_process(POLL_INTERVAL)?;
        if tracker.is_finished() {
            break;
        }
    }
    tracker.stop()?;
    Ok(())
}

fn run_replay(
    mut config: TrackerConfig,
    file: &Path,
    threshold: Option<f64>,
    no_filter: bool,
    interval_ms: u32,
    format: Option<FormatArg>,
) -> Result<()> {
    if let Some(threshold) = threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            bail!("threshold must be a non-negative number of meters, got {}", threshold);
        }
        config.filter.threshold_m = threshold;
    }
    if no_filter {
        config.filter.enabled = false;
    }
    if let Some(format) = format {
        config.display.output_format = format.into();
    }
    config.source.min_time_ms = interval_ms;
    config.source.start_delay_ms = 0;

    let source = ReplaySource::new(file);
    info!(source = source.name(), "replaying track");

    let display = terminal_display(&config);
    let mut tracker = LocationTracker::new(Box::new(source), display, config);
    tracker
        .start()
        .with_context(|| format!("starting replay of {}", file.display()))?;

    while !tracker.is_finished() {
        tracker.wait_and_process(POLL_INTERVAL)?;
    }

    let state = tracker.state();
    info!(
        received = state.updates_received,
        accepted = state.positions_accepted,
        rejected = state.positions_rejected,
        invalid = state.invalid_samples,
        "replay finished"
    );
    tracker.stop()?;
    Ok(())
}

fn terminal_display(config: &TrackerConfig) -> TerminalDisplay<io::Stdout> {
    TerminalDisplay::new(io::stdout(), config.display.output_format)
}

fn run_config(action: ConfigAction, config: &TrackerConfig, loaded_from: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from("tracker.json"));
            if path.exists() && !force {
                error!(path = %path.display(), "config file exists");
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let mut manager = ConfigurationManager::new();
            manager.save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigAction::Show => {
            if let Some(path) = loaded_from {
                println!("# {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
