//! `validate` command.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, Severity, SignalError, ValidationIssue};

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validates each file and prints a report.
///
/// Every file is checked even after a failure.
///
/// # Errors
///
/// Returns a config error listing every failing file, or an I/O error if
/// the report cannot be written.
pub fn run(args: &ValidateArgs) -> Result<(), SignalError> {
    let loader = ConfigLoader::with_defaults();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check(&loader, path, args.strict))
        .collect();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let status = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {status}", report.file);
                for error in &report.errors {
                    println!("  error: {error}");
                }
                for warning in &report.warnings {
                    println!("  warning: {warning}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    let failed: Vec<&FileReport> = reports.iter().filter(|r| !r.valid).collect();
    if failed.is_empty() {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        path: failed
            .iter()
            .map(|r| r.file.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        errors: failed
            .iter()
            .flat_map(|r| r.errors.iter().chain(&r.warnings))
            .map(|message| ValidationIssue {
                path: String::new(),
                message: message.clone(),
                severity: Severity::Error,
            })
            .collect(),
    }
    .into())
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    let file = path.display().to_string();
    tracing::info!(%file, "validating configuration");

    match loader.load(path) {
        Ok(loaded) => {
            let warnings: Vec<String> = loaded
                .warnings
                .iter()
                .map(|w| match &w.location {
                    Some(location) => format!("{} at {location}", w.message),
                    None => w.message.clone(),
                })
                .collect();
            FileReport {
                valid: !(strict && !warnings.is_empty()),
                file,
                errors: Vec::new(),
                warnings,
            }
        }
        Err(ConfigError::ValidationError { errors, .. }) => FileReport {
            file,
            valid: false,
            errors: errors
                .iter()
                .map(|issue| format!("{} at {}", issue.message, issue.path))
                .collect(),
            warnings: Vec::new(),
        },
        Err(e) => FileReport {
            file,
            valid: false,
            errors: vec![e.to_string()],
            warnings: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_valid_file() {
        let file = yaml_file("durations:\n  green: 12\n  left_turn: 4\n");
        let report = check(&ConfigLoader::with_defaults(), file.path(), false);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_check_zero_green_fails() {
        let file = yaml_file("durations:\n  green: 0\n");
        let report = check(&ConfigLoader::with_defaults(), file.path(), false);
        assert!(!report.valid);
        assert!(report.errors[0].contains("durations.green"));
    }

    #[test]
    fn test_strict_rejects_warnings() {
        let file = yaml_file("durations:\n  green: 120\n");
        let loader = ConfigLoader::with_defaults();
        assert!(check(&loader, file.path(), false).valid);
        let strict = check(&loader, file.path(), true);
        assert!(!strict.valid);
        assert_eq!(strict.warnings.len(), 1);
    }
}
