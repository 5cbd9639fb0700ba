//! Mutable signal state owned by the controller.

use serde::Serialize;

use super::cycle::{Durations, Phase};

/// Live state of the intersection cycle.
///
/// Countdowns are signed and free running: they are decremented every tick
/// without clamping and can go negative while the axis they belong to is
/// green. Only `phase_remaining` drives phase advancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseState {
    /// Phase currently holding the intersection.
    pub current_phase: Phase,
    /// Seconds left in `current_phase`.
    pub phase_remaining: i64,
    /// Durations last requested by the operator.
    pub configured: Durations,
    /// Durations last folded into the running countdowns.
    pub applied: Durations,
    /// Seconds until the east-west approaches turn green.
    pub countdown_east_west: i64,
    /// Seconds until the north-south approaches turn green.
    pub countdown_north_south: i64,
    /// Set by the first start; countdowns are only meaningful afterwards.
    pub initialized: bool,
}

impl PhaseState {
    /// Fresh state as produced by a reset.
    #[must_use]
    pub fn new() -> Self {
        let durations = Durations::default();
        Self {
            current_phase: Phase::NorthSouthGreen,
            phase_remaining: i64::from(durations.green()),
            configured: durations,
            applied: durations,
            countdown_east_west: 0,
            countdown_north_south: 0,
            initialized: false,
        }
    }

    /// Seeds the countdowns for the first run of the cycle.
    ///
    /// North-south starts green, so its countdown is zero; east-west waits
    /// out a full north-south half cycle.
    pub fn initialize(&mut self) {
        self.applied = self.configured;
        self.countdown_east_west = self.applied.total_red_secs();
        self.countdown_north_south = 0;
        self.phase_remaining = i64::from(self.applied.green());
        self.current_phase = Phase::NorthSouthGreen;
        self.initialized = true;
    }

    /// Returns `true` when the operator changed durations since the last
    /// reconciliation.
    #[must_use]
    pub fn has_pending_durations(&self) -> bool {
        self.configured != self.applied
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}
