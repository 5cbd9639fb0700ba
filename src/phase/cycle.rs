//! Fixed eight-phase signal cycle.
//!
//! The cycle alternates between the north-south and east-west axes. Each
//! axis gets a green interval, a yellow interval and a protected left turn,
//! followed by an all-red clearance interval before the other axis starts.

use serde::{Deserialize, Serialize};

use crate::error::DurationError;

/// Duration of every yellow interval, in seconds.
pub const YELLOW_SECS: u32 = 2;

/// Duration of every all-red clearance interval, in seconds.
pub const CLEARANCE_SECS: u32 = 2;

/// Green duration used when the operator leaves the field blank.
pub const DEFAULT_GREEN_SECS: u32 = 10;

/// Protected left-turn duration used when the operator leaves the field blank.
pub const DEFAULT_LEFT_TURN_SECS: u32 = 5;

/// Number of phases in one full cycle.
pub const PHASE_COUNT: usize = 8;

/// One of the two conflicting traffic axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Northbound and southbound approaches.
    NorthSouth,
    /// Eastbound and westbound approaches.
    EastWest,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NorthSouth => f.write_str("N-S"),
            Self::EastWest => f.write_str("E-W"),
        }
    }
}

/// Role of a phase within its half of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Through movement has a green light.
    Green,
    /// Through movement is about to lose right of way.
    Yellow,
    /// Protected left turn; through movement shows red with a left arrow.
    LeftTurn,
    /// All approaches red.
    Clearance,
}

/// A position in the fixed cycle.
///
/// Using an enum keeps the phase index inside `[0, 7]` by construction;
/// [`Phase::next`] is the only way to move forward and it wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NorthSouthGreen,
    NorthSouthYellow,
    NorthSouthLeftTurn,
    ClearanceAfterNorthSouth,
    EastWestGreen,
    EastWestYellow,
    EastWestLeftTurn,
    ClearanceAfterEastWest,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Self; PHASE_COUNT] = [
        Self::NorthSouthGreen,
        Self::NorthSouthYellow,
        Self::NorthSouthLeftTurn,
        Self::ClearanceAfterNorthSouth,
        Self::EastWestGreen,
        Self::EastWestYellow,
        Self::EastWestLeftTurn,
        Self::ClearanceAfterEastWest,
    ];

    /// Returns the phase at `index`, wrapping modulo 8.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % PHASE_COUNT]
    }

    /// Zero-based position in the cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub const fn kind(self) -> PhaseKind {
        match self {
            Self::NorthSouthGreen | Self::EastWestGreen => PhaseKind::Green,
            Self::NorthSouthYellow | Self::EastWestYellow => PhaseKind::Yellow,
            Self::NorthSouthLeftTurn | Self::EastWestLeftTurn => PhaseKind::LeftTurn,
            Self::ClearanceAfterNorthSouth | Self::ClearanceAfterEastWest => PhaseKind::Clearance,
        }
    }

    /// Axis that holds right of way, or `None` during clearance.
    #[must_use]
    pub const fn active_axis(self) -> Option<Axis> {
        match self {
            Self::NorthSouthGreen | Self::NorthSouthYellow | Self::NorthSouthLeftTurn => {
                Some(Axis::NorthSouth)
            }
            Self::EastWestGreen | Self::EastWestYellow | Self::EastWestLeftTurn => {
                Some(Axis::EastWest)
            }
            Self::ClearanceAfterNorthSouth | Self::ClearanceAfterEastWest => None,
        }
    }

    /// Nominal length of this phase for the given durations.
    #[must_use]
    pub const fn nominal_secs(self, durations: Durations) -> u32 {
        match self.kind() {
            PhaseKind::Green => durations.green(),
            PhaseKind::Yellow => YELLOW_SECS,
            PhaseKind::LeftTurn => durations.left_turn(),
            PhaseKind::Clearance => CLEARANCE_SECS,
        }
    }

    /// Label shown in the phase list.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthSouthGreen => "N-S (green)",
            Self::NorthSouthYellow => "N-S (yellow)",
            Self::NorthSouthLeftTurn => "N-S (left turn)",
            Self::EastWestGreen => "E-W (green)",
            Self::EastWestYellow => "E-W (yellow)",
            Self::EastWestLeftTurn => "E-W (left turn)",
            Self::ClearanceAfterNorthSouth | Self::ClearanceAfterEastWest => {
                "Signal clearance interval"
            }
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The operator-adjustable pair of phase durations, in seconds.
///
/// Both values are strictly positive. Equality is structural, which is what
/// the controller uses to decide whether in-flight countdowns need
/// reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDurations", into = "RawDurations")]
pub struct Durations {
    green: u32,
    left_turn: u32,
}

impl Durations {
    /// Creates a duration pair.
    ///
    /// # Errors
    ///
    /// Returns [`DurationError::Zero`] if either value is zero.
    pub const fn new(green: u32, left_turn: u32) -> Result<Self, DurationError> {
        if green == 0 {
            return Err(DurationError::Zero { field: "green" });
        }
        if left_turn == 0 {
            return Err(DurationError::Zero { field: "left_turn" });
        }
        Ok(Self { green, left_turn })
    }

    /// Green interval for the through movement.
    #[must_use]
    pub const fn green(self) -> u32 {
        self.green
    }

    /// Protected left-turn interval.
    #[must_use]
    pub const fn left_turn(self) -> u32 {
        self.left_turn
    }

    /// How long one axis stays red while the other axis runs its half cycle:
    /// green + yellow + left turn + clearance.
    ///
    /// Computed in `i64` so any pair of `u32` durations fits.
    #[must_use]
    pub fn total_red_secs(self) -> i64 {
        i64::from(self.green)
            + i64::from(YELLOW_SECS)
            + i64::from(self.left_turn)
            + i64::from(CLEARANCE_SECS)
    }

    /// Length of a full eight-phase cycle.
    #[must_use]
    pub fn cycle_secs(self) -> i64 {
        2 * self.total_red_secs()
    }

    /// Countdown seeded into the axis that is about to go red when the other
    /// axis enters its protected left turn.
    #[must_use]
    pub fn rearm_secs(self) -> i64 {
        self.total_red_secs() + i64::from(self.left_turn) + i64::from(CLEARANCE_SECS)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            green: DEFAULT_GREEN_SECS,
            left_turn: DEFAULT_LEFT_TURN_SECS,
        }
    }
}

impl std::fmt::Display for Durations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "green={}s left_turn={}s", self.green, self.left_turn)
    }
}

#[derive(Serialize, Deserialize)]
struct RawDurations {
    green: u32,
    left_turn: u32,
}

impl TryFrom<RawDurations> for Durations {
    type Error = DurationError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        Self::new(raw.green, raw.left_turn)
    }
}

impl From<Durations> for RawDurations {
    fn from(d: Durations) -> Self {
        Self {
            green: d.green,
            left_turn: d.left_turn,
        }
    }
}
