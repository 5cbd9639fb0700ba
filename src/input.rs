//! Operator input surface.
//!
//! Duration fields are free text. Before anything reaches the controller the
//! text is reduced to digits with leading zeros stripped; an empty field
//! means "use the default".

use tracing::warn;

use crate::phase::cycle::{DEFAULT_GREEN_SECS, DEFAULT_LEFT_TURN_SECS, Durations};

/// Identifies a duration field in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationField {
    Green,
    LeftTurn,
}

impl DurationField {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::LeftTurn => "left_turn",
        }
    }

    #[must_use]
    pub const fn default_secs(self) -> u32 {
        match self {
            Self::Green => DEFAULT_GREEN_SECS,
            Self::LeftTurn => DEFAULT_LEFT_TURN_SECS,
        }
    }

    /// Sanitizes `raw` and parses what remains.
    ///
    /// Returns `None` for a blank field or a value too large to represent.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<u32> {
        let cleaned = sanitize_duration(self, raw);
        if cleaned.is_empty() {
            return None;
        }
        match cleaned.parse::<u32>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(field = self.name(), value = %cleaned, "duration out of range, using default");
                None
            }
        }
    }
}

impl std::fmt::Display for DurationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Drops every non-digit character, then strips leading zeros.
///
/// Logs a warning when the input had to be altered.
#[must_use]
pub fn sanitize_duration(field: DurationField, raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let cleaned = digits.trim_start_matches('0').to_string();
    if cleaned != raw {
        warn!(
            field = field.name(),
            input = raw,
            valid = %cleaned,
            "invalid duration input"
        );
    }
    cleaned
}

/// Durations handed to `start()`, straight from the input fields.
///
/// `None` stands for a blank field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedDurations {
    pub green: Option<u32>,
    pub left_turn: Option<u32>,
}

impl RequestedDurations {
    #[must_use]
    pub const fn new(green: Option<u32>, left_turn: Option<u32>) -> Self {
        Self { green, left_turn }
    }

    /// Parses both fields from raw operator text.
    #[must_use]
    pub fn from_text(green: &str, left_turn: &str) -> Self {
        Self {
            green: DurationField::Green.parse(green),
            left_turn: DurationField::LeftTurn.parse(left_turn),
        }
    }

    /// Fills blanks with the defaults.
    ///
    /// A zero that slipped past sanitization also falls back to the default;
    /// every positive value is used as given.
    #[must_use]
    pub fn resolve(self) -> Durations {
        let pick = |value: Option<u32>, field: DurationField| match value {
            Some(0) => {
                warn!(field = field.name(), "zero duration, using default");
                field.default_secs()
            }
            Some(v) => v,
            None => field.default_secs(),
        };
        let green = pick(self.green, DurationField::Green);
        let left_turn = pick(self.left_turn, DurationField::LeftTurn);
        Durations::new(green, left_turn).unwrap_or_default()
    }
}

impl From<Durations> for RequestedDurations {
    fn from(d: Durations) -> Self {
        Self {
            green: Some(d.green()),
            left_turn: Some(d.left_turn()),
        }
    }
}
