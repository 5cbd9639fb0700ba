//! Configuration schema
//!
//! ```yaml
//! durations:
//!   green: 10
//!   left_turn: 5
//! tick_interval: 1s
//! ```
//!
//! Every field is optional. Missing durations fall back to the controller
//! defaults when the cycle starts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::RequestedDurations;

/// Default tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Longest accepted tick period.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(3600);

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Initial phase durations.
    #[serde(default)]
    pub durations: DurationSettings,

    /// Tick period in humantime syntax (`1s`, `250ms`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_interval: Option<String>,
}

/// Operator duration settings, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_turn: Option<u32>,
}

impl SimulatorConfig {
    /// Durations to hand to `start()`.
    #[must_use]
    pub const fn requested_durations(&self) -> RequestedDurations {
        RequestedDurations::new(self.durations.green, self.durations.left_turn)
    }

    /// Parsed tick period, or the one-second default.
    ///
    /// # Errors
    ///
    /// Returns the humantime parse error for malformed values.
    pub fn tick_interval(&self) -> Result<Duration, humantime::DurationError> {
        self.tick_interval
            .as_deref()
            .map_or(Ok(DEFAULT_TICK_INTERVAL), humantime::parse_duration)
    }
}
