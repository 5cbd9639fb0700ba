//! Configuration loader
//!
//! Pipeline:
//! 1. Size check and read
//! 2. YAML parsing into [`SimulatorConfig`]
//! 3. Environment overrides (`SIGNALPHASE_GREEN`, `SIGNALPHASE_LEFT_TURN`)
//! 4. Validation

use std::path::Path;

use crate::config::schema::SimulatorConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;
use crate::input::DurationField;

/// Environment variable overriding `durations.green`.
pub const ENV_GREEN: &str = "SIGNALPHASE_GREEN";

/// Environment variable overriding `durations.left_turn`.
pub const ENV_LEFT_TURN: &str = "SIGNALPHASE_LEFT_TURN";

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,

    /// Whether `SIGNALPHASE_*` variables override file values.
    pub env_overrides: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("SIGNALPHASE_MAX_CONFIG_SIZE", 64 * 1024),
            env_overrides: true,
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: SimulatorConfig,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, if YAML
    /// parsing fails, or if validation reports errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|e| unreadable(path, e))?;

        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| unreadable(path, e))?;

        self.load_source(&raw, &path.display().to_string(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Loads a configuration from an in-memory YAML string.
    ///
    /// Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ConfigError> {
        self.load_source(yaml, "<string>", |_| None)
    }

    /// Core pipeline with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn load_source<F>(&self, raw: &str, origin: &str, env: F) -> Result<LoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        if raw.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: origin.into(),
                size: raw.len(),
                limit: self.options.max_config_size,
            });
        }

        // An empty file is a valid "all defaults" document.
        let mut config: SimulatorConfig = if raw.trim().is_empty() {
            SimulatorConfig::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.into(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let mut warnings = Vec::new();
        if self.options.env_overrides {
            apply_env_overrides(&mut config, &env, &mut warnings);
        }

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors: result.errors,
            });
        }

        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        tracing::debug!(origin, ?config, "configuration loaded");
        Ok(LoadResult { config, warnings })
    }
}

/// Overlays duration values from the environment.
///
/// Values go through the same sanitizer as operator input; a variable that
/// sanitizes to nothing is ignored with a warning.
fn apply_env_overrides<F>(config: &mut SimulatorConfig, env: &F, warnings: &mut Vec<LoadWarning>)
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        (ENV_GREEN, DurationField::Green),
        (ENV_LEFT_TURN, DurationField::LeftTurn),
    ];
    for (var, field) in overrides {
        let Some(raw) = env(var) else {
            continue;
        };
        match field.parse(&raw) {
            Some(secs) => {
                tracing::debug!(var, secs, "duration overridden from environment");
                match field {
                    DurationField::Green => config.durations.green = Some(secs),
                    DurationField::LeftTurn => config.durations.left_turn = Some(secs),
                }
            }
            None => warnings.push(LoadWarning {
                message: format!("ignoring {var}='{raw}': not a positive number of seconds"),
                location: Some(var.to_string()),
            }),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn unreadable(path: &Path, source: std::io::Error) -> ConfigError {
    if source.kind() == std::io::ErrorKind::NotFound {
        ConfigError::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loader() -> ConfigLoader {
        ConfigLoader::new(LoaderOptions {
            max_config_size: 1024,
            env_overrides: true,
        })
    }

    #[test]
    fn test_load_from_str() {
        let result = loader()
            .load_from_str("durations:\n  green: 15\n")
            .unwrap();
        assert_eq!(result.config.durations.green, Some(15));
        assert_eq!(result.config.durations.left_turn, None);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_source_is_default() {
        let result = loader().load_from_str("   \n").unwrap();
        assert_eq!(result.config, SimulatorConfig::default());
    }

    #[test]
    fn test_parse_error_has_line() {
        let err = loader()
            .load_from_str("durations:\n  green: [oops\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_error() {
        let err = loader()
            .load_from_str("durations:\n  left_turn: 0\n")
            .unwrap_err();
        let ConfigError::ValidationError { errors, .. } = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors[0].path, "durations.left_turn");
    }

    #[test]
    fn test_env_overrides() {
        let env = |name: &str| match name {
            ENV_GREEN => Some("020".to_string()),
            ENV_LEFT_TURN => Some("abc".to_string()),
            _ => None,
        };
        let result = loader()
            .load_source("durations:\n  green: 8\n  left_turn: 3\n", "test", env)
            .unwrap();
        assert_eq!(result.config.durations.green, Some(20));
        assert_eq!(result.config.durations.left_turn, Some(3));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some(ENV_LEFT_TURN));
    }

    #[test]
    fn test_env_overrides_disabled() {
        let loader = ConfigLoader::new(LoaderOptions {
            max_config_size: 1024,
            env_overrides: false,
        });
        let result = loader
            .load_source("{}", "test", |_| Some("30".to_string()))
            .unwrap();
        assert_eq!(result.config.durations.green, None);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval: 500ms").unwrap();
        let result = loader().load(file.path()).unwrap();
        assert_eq!(result.config.tick_interval.as_deref(), Some("500ms"));
    }

    #[test]
    fn test_missing_file() {
        let err = loader()
            .load(Path::new("/nonexistent/signalphase.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_non_utf8_file_is_unreadable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"durations:\n  green: \xff\xfe\n").unwrap();
        let err = loader().load(file.path()).unwrap_err();
        match err {
            ConfigError::Unreadable { path, source } => {
                assert_eq!(path, file.path());
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_file_too_large() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'#'; 2048]).unwrap();
        let err = loader().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { size: 2048, .. }));
    }

    #[test]
    fn test_large_duration_warning_propagates() {
        let result = loader()
            .load_from_str("durations:\n  green: 150\n")
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("durations.green"));
    }
}
