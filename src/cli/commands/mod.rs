//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod run;
pub mod simulate;
pub mod validate;
pub mod version;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, OutputFormat, SourceArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::display::Snapshot;
use crate::error::{ConfigError, SignalError};
use crate::input::{DurationField, RequestedDurations};
use crate::observability::EventEmitter;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), SignalError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Simulate(args) => simulate::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Durations and tick period after layering defaults, file, and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub requested: RequestedDurations,
    pub tick_interval: Duration,
}

/// Resolves [`Settings`] from an optional config file plus flag overrides.
///
/// Without `--config` the defaults still pick up `SIGNALPHASE_*` overrides.
///
/// # Errors
///
/// Returns a config error if the file cannot be loaded or validated.
pub fn resolve_settings(source: &SourceArgs) -> Result<Settings, SignalError> {
    let loader = ConfigLoader::with_defaults();
    let loaded = match source.config.as_deref() {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            loader.load(path)?
        }
        None => loader.load_source("", "<defaults>", |name| std::env::var(name).ok())?,
    };
    log_warnings(&loaded);

    let LoadResult { config, .. } = loaded;
    let mut requested = config.requested_durations();
    if let Some(raw) = source.green.as_deref() {
        requested.green = DurationField::Green.parse(raw);
    }
    if let Some(raw) = source.left_turn.as_deref() {
        requested.left_turn = DurationField::LeftTurn.parse(raw);
    }

    let tick_interval = config
        .tick_interval()
        .map_err(|e| ConfigError::InvalidValue {
            field: "tick_interval".to_string(),
            value: config.tick_interval.clone().unwrap_or_default(),
            expected: e.to_string(),
        })?;

    Ok(Settings {
        requested,
        tick_interval,
    })
}

fn log_warnings(loaded: &LoadResult) {
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
}

/// Opens the event sink: a JSONL file when requested, otherwise nothing.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created.
pub fn event_emitter(path: Option<&Path>) -> Result<EventEmitter, SignalError> {
    Ok(match path {
        Some(path) => {
            tracing::info!(events = %path.display(), "writing events");
            EventEmitter::from_file(path)?
        }
        None => EventEmitter::noop(),
    })
}

/// Writes one snapshot to stdout in the selected format.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_snapshot(format: OutputFormat, snapshot: &Snapshot) -> Result<(), SignalError> {
    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Human => writeln!(stdout, "{}", snapshot.render_line())?,
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string(snapshot)?)?,
    }
    stdout.flush()?;
    Ok(())
}
