//! Mid-cycle duration reconciliation.
//!
//! When the operator changes the green or left-turn duration while a cycle
//! is in flight, the live counters that already "contain" the old interval
//! are shifted by the difference so the displayed countdowns stay
//! continuous. Which counters contain which interval depends on where in the
//! cycle the change lands.

use serde::Serialize;

use super::cycle::{Durations, Phase};
use super::state::PhaseState;

/// Which duration deltas feed a single counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    None,
    Left,
    Green,
    GreenAndLeft,
}

impl Term {
    const fn apply(self, delta: DurationDelta) -> i64 {
        match self {
            Self::None => 0,
            Self::Left => delta.left_turn,
            Self::Green => delta.green,
            Self::GreenAndLeft => delta.green + delta.left_turn,
        }
    }
}

/// Per-phase correction row: east-west countdown, north-south countdown,
/// phase remaining.
#[derive(Debug, Clone, Copy)]
struct Correction {
    east_west: Term,
    north_south: Term,
    remaining: Term,
}

const fn row(east_west: Term, north_south: Term, remaining: Term) -> Correction {
    Correction {
        east_west,
        north_south,
        remaining,
    }
}

const fn correction(phase: Phase) -> Correction {
    use Term::{Green, GreenAndLeft, Left, None};
    match phase {
        Phase::NorthSouthGreen => row(GreenAndLeft, None, Green),
        Phase::NorthSouthYellow => row(Left, None, None),
        Phase::NorthSouthLeftTurn => row(Left, GreenAndLeft, Left),
        Phase::ClearanceAfterNorthSouth => row(None, GreenAndLeft, None),
        Phase::EastWestGreen => row(None, GreenAndLeft, Green),
        Phase::EastWestYellow => row(None, Left, None),
        Phase::EastWestLeftTurn => row(GreenAndLeft, Left, Left),
        Phase::ClearanceAfterEastWest => row(GreenAndLeft, None, None),
    }
}

/// Signed difference between two duration pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationDelta {
    /// Change in the green interval, in seconds.
    pub green: i64,
    /// Change in the left-turn interval, in seconds.
    pub left_turn: i64,
}

impl DurationDelta {
    /// `to - from`, per field.
    #[must_use]
    pub fn between(from: Durations, to: Durations) -> Self {
        Self {
            green: i64::from(to.green()) - i64::from(from.green()),
            left_turn: i64::from(to.left_turn()) - i64::from(from.left_turn()),
        }
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.green == 0 && self.left_turn == 0
    }
}

/// Folds pending duration changes into the live counters.
///
/// Returns the applied delta, or `None` if configured and applied durations
/// were already equal. On return `applied == configured`.
pub fn reconcile(state: &mut PhaseState) -> Option<DurationDelta> {
    if !state.has_pending_durations() {
        return None;
    }

    let delta = DurationDelta::between(state.applied, state.configured);
    let fix = correction(state.current_phase);

    state.countdown_east_west += fix.east_west.apply(delta);
    state.countdown_north_south += fix.north_south.apply(delta);
    state.phase_remaining += fix.remaining.apply(delta);
    state.applied = state.configured;

    Some(delta)
}
