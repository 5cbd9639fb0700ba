//! Observability
//!
//! Logging, metrics, and the structured event stream.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::init_logging;
pub use metrics::init_metrics;
