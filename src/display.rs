//! Display derivation for signal heads and counters.
//!
//! Everything here is a pure function of [`PhaseState`]; building a
//! [`Snapshot`] never mutates the controller.

use std::fmt::Write as _;

use serde::Serialize;

use crate::phase::cycle::{Axis, Durations, Phase, PhaseKind};
use crate::phase::state::PhaseState;

/// Counter values above this are shown as [`SATURATED_COUNTER`].
pub const MAX_COUNTER_DISPLAY: i64 = 99;

/// Placeholder for counters that do not fit the two-digit display.
pub const SATURATED_COUNTER: &str = "--";

/// Formats a countdown for a two-digit counter.
///
/// Values above 99 saturate, non-positive values blank the counter.
#[must_use]
pub fn format_countdown(value: i64) -> String {
    if value > MAX_COUNTER_DISPLAY {
        SATURATED_COUNTER.to_string()
    } else if value > 0 {
        value.to_string()
    } else {
        String::new()
    }
}

/// Lamp state of one signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Light {
    Green,
    Yellow,
    /// Red through movement with the protected left-turn arrow lit.
    RedArrow,
    Red,
}

impl Light {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::RedArrow => "RED+ARROW",
            Self::Red => "RED",
        }
    }
}

impl std::fmt::Display for Light {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compass approach into the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    North,
    South,
    East,
    West,
}

impl Approach {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::NorthSouth,
            Self::East | Self::West => Axis::EastWest,
        }
    }

    const fn short(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        }
    }
}

/// Lamp state for `axis` during `phase`.
///
/// Before the first start every head shows red.
#[must_use]
pub fn light_for(axis: Axis, phase: Phase, initialized: bool) -> Light {
    if !initialized || phase.active_axis() != Some(axis) {
        return Light::Red;
    }
    match phase.kind() {
        PhaseKind::Green => Light::Green,
        PhaseKind::Yellow => Light::Yellow,
        PhaseKind::LeftTurn => Light::RedArrow,
        PhaseKind::Clearance => Light::Red,
    }
}

/// One signal head as the presentation layer draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalHead {
    pub approach: Approach,
    pub light: Light,
    /// Counter text, already formatted.
    pub counter: String,
}

/// Entry of the phase list with the running phase highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseListEntry {
    pub index: usize,
    pub label: &'static str,
    pub current: bool,
}

/// Which operator controls are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    /// Duration fields are editable while the simulation is stopped.
    pub inputs_enabled: bool,
}

impl Controls {
    #[must_use]
    pub const fn for_running(running: bool) -> Self {
        Self {
            start_enabled: !running,
            stop_enabled: running,
            inputs_enabled: !running,
        }
    }
}

/// Immutable view of the controller after a tick or command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub phase_index: usize,
    pub phase_label: &'static str,
    pub phase_remaining: i64,
    pub countdown_east_west: i64,
    pub countdown_north_south: i64,
    pub east_west_display: String,
    pub north_south_display: String,
    pub signals: Vec<SignalHead>,
    pub phase_list: Vec<PhaseListEntry>,
    pub configured: Durations,
    pub applied: Durations,
    pub initialized: bool,
    pub running: bool,
    pub controls: Controls,
}

impl Snapshot {
    /// Derives the displayable view of `state`.
    #[must_use]
    pub fn capture(state: &PhaseState, running: bool) -> Self {
        let phase = state.current_phase;
        let east_west_display = format_countdown(state.countdown_east_west);
        let north_south_display = format_countdown(state.countdown_north_south);

        let signals = Approach::ALL
            .iter()
            .map(|&approach| {
                let axis = approach.axis();
                SignalHead {
                    approach,
                    light: light_for(axis, phase, state.initialized),
                    counter: match axis {
                        Axis::NorthSouth => north_south_display.clone(),
                        Axis::EastWest => east_west_display.clone(),
                    },
                }
            })
            .collect();

        let phase_list = Phase::ALL
            .iter()
            .map(|p| PhaseListEntry {
                index: p.index(),
                label: p.label(),
                current: *p == phase,
            })
            .collect();

        Self {
            phase,
            phase_index: phase.index(),
            phase_label: phase.label(),
            phase_remaining: state.phase_remaining,
            countdown_east_west: state.countdown_east_west,
            countdown_north_south: state.countdown_north_south,
            east_west_display,
            north_south_display,
            signals,
            phase_list,
            configured: state.configured,
            applied: state.applied,
            initialized: state.initialized,
            running,
            controls: Controls::for_running(running),
        }
    }

    /// Lamp state of a single approach.
    #[must_use]
    pub fn light(&self, approach: Approach) -> Light {
        self.signals
            .iter()
            .find(|head| head.approach == approach)
            .map_or(Light::Red, |head| head.light)
    }

    /// One-line text rendering used by the CLI.
    #[must_use]
    pub fn render_line(&self) -> String {
        let mut out = format!(
            "[{}] {} remaining={}s",
            self.phase_index, self.phase_label, self.phase_remaining
        );
        for head in &self.signals {
            let counter = if head.counter.is_empty() {
                "  "
            } else {
                head.counter.as_str()
            };
            let _ = write!(out, "  {}:{}({counter})", head.approach.short(), head.light);
        }
        if !self.running {
            out.push_str("  (stopped)");
        }
        out
    }
}
