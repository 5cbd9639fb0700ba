//! Configuration validation
//!
//! Validation collects every issue instead of stopping at the first one so
//! `signalphase validate` can report them all at once.

use std::time::Duration;

use crate::config::schema::{MAX_TICK_INTERVAL, SimulatorConfig};
use crate::display::MAX_COUNTER_DISPLAY;
use crate::error::{Severity, ValidationIssue};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &SimulatorConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_duration("durations.green", config.durations.green);
        self.validate_duration("durations.left_turn", config.durations.left_turn);
        self.validate_tick_interval(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_duration(&mut self, path: &str, value: Option<u32>) {
        let Some(secs) = value else {
            return;
        };
        if secs == 0 {
            self.add_error(path, "duration must be at least 1 second");
        } else if i64::from(secs) > MAX_COUNTER_DISPLAY {
            self.add_warning(
                path,
                &format!(
                    "{secs}s exceeds the two-digit counter; countdowns will show '--' until they drop below {}",
                    MAX_COUNTER_DISPLAY + 1
                ),
            );
        }
    }

    fn validate_tick_interval(&mut self, config: &SimulatorConfig) {
        match config.tick_interval() {
            Ok(interval) if interval == Duration::ZERO => {
                self.add_error("tick_interval", "tick interval must be greater than zero");
            }
            Ok(interval) if interval > MAX_TICK_INTERVAL => {
                self.add_error(
                    "tick_interval",
                    &format!(
                        "tick interval must not exceed {}",
                        humantime::format_duration(MAX_TICK_INTERVAL)
                    ),
                );
            }
            Ok(_) => {}
            Err(e) => {
                self.add_error("tick_interval", &format!("invalid duration: {e}"));
            }
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
