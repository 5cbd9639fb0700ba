//! Signal phase controller.
//!
//! The `SignalController` owns the [`PhaseState`] and exposes the operator
//! commands (`start`, `stop`, `reset`, `set_durations`) plus the `tick`
//! invoked once per period by the scheduler.

use serde::Serialize;
use tracing::{debug, info};

use crate::display::Snapshot;
use crate::input::RequestedDurations;

use super::cycle::{Axis, Durations, Phase};
use super::reconcile::{self, DurationDelta};
use super::state::PhaseState;

/// Record of a phase change produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    /// Axis whose countdown was re-armed on entry to a left-turn phase.
    pub rearmed: Option<Axis>,
}

/// What a single tick did besides counting down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub transition: Option<PhaseTransition>,
    pub reconciled: Option<DurationDelta>,
}

/// Result of a start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// First start since reset; countdowns were seeded.
    Initialized,
    /// Resumed from a stop with state retained.
    Resumed,
    /// The controller was already running; nothing changed.
    AlreadyRunning,
}

/// Finite-state controller for the eight-phase cycle.
#[derive(Debug, Clone, Default)]
pub struct SignalController {
    state: PhaseState,
    running: bool,
}

impl SignalController {
    /// Creates a controller in the reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &PhaseState {
        &self.state
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn current_phase(&self) -> Phase {
        self.state.current_phase
    }

    #[must_use]
    pub const fn phase_remaining(&self) -> i64 {
        self.state.phase_remaining
    }

    /// Discards the current state and returns to the idle display.
    pub fn reset(&mut self) {
        self.state = PhaseState::new();
        self.running = false;
        info!("signal controller reset");
    }

    /// Starts or resumes the cycle.
    ///
    /// Blank fields in `requested` fall back to the defaults. The first
    /// start after a reset seeds the countdowns; later starts keep the
    /// retained state and let the next tick reconcile any duration change.
    pub fn start(&mut self, requested: RequestedDurations) -> StartOutcome {
        if self.running {
            debug!("start ignored, already running");
            return StartOutcome::AlreadyRunning;
        }

        self.state.configured = requested.resolve();
        self.running = true;

        if self.state.initialized {
            info!(durations = %self.state.configured, phase = %self.state.current_phase, "signal cycle resumed");
            return StartOutcome::Resumed;
        }

        self.state.initialize();
        info!(
            durations = %self.state.applied,
            countdown_east_west = self.state.countdown_east_west,
            "signal cycle started"
        );
        StartOutcome::Initialized
    }

    /// Pauses the cycle, keeping all counters.
    ///
    /// Returns `false` if the controller was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            debug!("stop ignored, not running");
            return false;
        }
        self.running = false;
        info!(phase = %self.state.current_phase, remaining = self.state.phase_remaining, "signal cycle stopped");
        true
    }

    /// Records new operator durations.
    ///
    /// Counters are not touched here; the next tick folds the difference in.
    pub fn set_durations(&mut self, durations: Durations) {
        if durations != self.state.configured {
            debug!(from = %self.state.configured, to = %durations, "durations changed");
        }
        self.state.configured = durations;
    }

    /// Advances the simulation by one second.
    ///
    /// Returns `None` when the controller is stopped.
    pub fn tick(&mut self) -> Option<TickReport> {
        if !self.running {
            return None;
        }

        let state = &mut self.state;
        state.phase_remaining -= 1;
        state.countdown_east_west -= 1;
        state.countdown_north_south -= 1;

        let reconciled = reconcile::reconcile(state);
        if let Some(delta) = reconciled {
            debug!(
                phase = %state.current_phase,
                delta_green = delta.green,
                delta_left_turn = delta.left_turn,
                countdown_east_west = state.countdown_east_west,
                countdown_north_south = state.countdown_north_south,
                "countdowns reconciled"
            );
        }

        let transition = if state.phase_remaining <= 0 {
            Some(Self::advance(state))
        } else {
            None
        };

        Some(TickReport {
            transition,
            reconciled,
        })
    }

    fn advance(state: &mut PhaseState) -> PhaseTransition {
        let from = state.current_phase;
        let to = from.next();
        state.current_phase = to;
        state.phase_remaining = i64::from(to.nominal_secs(state.applied));

        let rearmed = match to {
            Phase::NorthSouthLeftTurn => {
                state.countdown_north_south = state.applied.rearm_secs();
                Some(Axis::NorthSouth)
            }
            Phase::EastWestLeftTurn => {
                state.countdown_east_west = state.applied.rearm_secs();
                Some(Axis::EastWest)
            }
            _ => None,
        };

        info!(
            from = from.index(),
            to = to.index(),
            phase = %to,
            remaining = state.phase_remaining,
            "phase transition"
        );

        PhaseTransition { from, to, rearmed }
    }

    /// Displayable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.running)
    }
}
