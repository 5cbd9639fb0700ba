//! Simulator configuration
//!
//! YAML schema, loading pipeline and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{DEFAULT_TICK_INTERVAL, DurationSettings, MAX_TICK_INTERVAL, SimulatorConfig};
pub use validation::{ValidationResult, Validator};
