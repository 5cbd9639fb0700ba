//! Logging initialization.
//!
//! Logs always go to stderr; stdout is reserved for snapshots.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{ColorChoice, OutputFormat};

/// Environment variable overriding `-v`.
pub const LOG_LEVEL_ENV: &str = "SIGNALPHASE_LOG_LEVEL";

/// Installs the global subscriber for the CLI's `--log-format`, `-v` count
/// and `--color` choice.
///
/// A second call is ignored.
pub fn init_logging(format: OutputFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(directive(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let _ = match format {
        OutputFormat::Human => builder.with_ansi(use_ansi(color)).try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };
}

const fn directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}
