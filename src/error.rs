//! Error types for `signalphase`
//!
//! The controller itself has no failure modes; errors come from the
//! surrounding layers (configuration, the tick scheduler, the CLI).

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Process exit codes for CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Tick scheduler error
    pub const SCHEDULER_ERROR: i32 = 5;

    /// Usage error (invalid arguments)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid duration pair
    #[error(transparent)]
    Duration(#[from] DurationError),

    /// Tick scheduler error
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SignalError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Duration(_) => ExitCode::CONFIG_ERROR,
            Self::Scheduler(_) => ExitCode::SCHEDULER_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Duration Errors
// ============================================================================

/// Rejected phase duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Durations must be at least one second
    #[error("{field} duration must be a positive number of seconds")]
    Zero {
        /// Name of the offending field
        field: &'static str,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exists but could not be read as UTF-8 text
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "durations.green")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported but does not block loading
    Warning,
}

// ============================================================================
// Scheduler Errors
// ============================================================================

/// Tick scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The tick task panicked or was aborted
    #[error("tick task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    /// Tick interval must be non-zero
    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    /// Tick interval above the supported maximum
    #[error("tick interval must not exceed {max_secs}s")]
    IntervalTooLong {
        /// Largest accepted interval in seconds
        max_secs: u64,
    },

    /// The simulator was shut down and accepts no further starts
    #[error("simulator is shut down")]
    ShutDown,
}

// ============================================================================
// Operator Command Errors
// ============================================================================

/// Malformed interactive command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Command word not recognized
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    /// Wrong number of arguments
    #[error("'{command}' takes {expected} argument(s), got {found}")]
    Arity {
        /// Command word
        command: &'static str,
        /// Expected argument count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },
}
