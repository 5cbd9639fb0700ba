//! CLI argument definitions
//!
//! All Clap derive structs for `signalphase` command-line parsing.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::phase::Durations;

// ============================================================================
// Root CLI
// ============================================================================

/// Eight-phase intersection signal simulator.
#[derive(Parser, Debug)]
#[command(name = "signalphase", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SIGNALPHASE_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "SIGNALPHASE_LOG_FORMAT")]
    pub log_format: OutputFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller in real time, reading operator commands from stdin.
    Run(RunArgs),

    /// Tick the controller a fixed number of times without waiting.
    Simulate(SimulateArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Where the durations and tick period come from.
///
/// Flags override the configuration file, which overrides the defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "SIGNALPHASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Green duration in seconds. Non-digits are stripped.
    #[arg(long, allow_hyphen_values = true)]
    pub green: Option<String>,

    /// Protected left-turn duration in seconds. Non-digits are stripped.
    #[arg(long, allow_hyphen_values = true)]
    pub left_turn: Option<String>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Wall-clock time per tick (e.g. `1s`, `250ms`).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub tick_interval: Option<Duration>,

    /// Start the cycle immediately instead of waiting for `start`.
    #[arg(long)]
    pub autostart: bool,

    /// Snapshot output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write JSONL events to this file.
    #[arg(long, env = "SIGNALPHASE_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "SIGNALPHASE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of ticks to run.
    #[arg(short, long)]
    pub ticks: u64,

    /// Change durations just before a tick, as `TICK:GREEN:LEFT`. Repeatable.
    #[arg(long = "set-at", value_name = "TICK:GREEN:LEFT")]
    pub set_at: Vec<ScheduledChange>,

    /// Snapshot output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write JSONL events to this file.
    #[arg(long)]
    pub events_file: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Types
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// A duration change applied before a given tick in `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledChange {
    /// 1-based tick number.
    pub tick: u64,
    pub durations: Durations,
}

impl FromStr for ScheduledChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [tick, green, left_turn] = parts.as_slice() else {
            return Err(format!("expected TICK:GREEN:LEFT, got '{s}'"));
        };
        let number = |name: &str, raw: &str| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid {name} '{raw}': {e}"))
        };
        let tick = number("tick", tick)?;
        if tick == 0 {
            return Err("tick numbers start at 1".to_string());
        }
        let green = u32::try_from(number("green", green)?).map_err(|e| e.to_string())?;
        let left_turn = u32::try_from(number("left turn", left_turn)?).map_err(|e| e.to_string())?;
        let durations = Durations::new(green, left_turn).map_err(|e| e.to_string())?;
        Ok(Self { tick, durations })
    }
}

// ============================================================================
// Tests
// ============================================================================
