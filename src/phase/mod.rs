//! Signal phase controller
//!
//! Implements the eight-phase intersection cycle: north-south green,
//! yellow, protected left and clearance, then the same for east-west.
//!
//! # Architecture
//!
//! - [`cycle`]: Fixed phase table, axes, duration pair
//! - [`PhaseState`]: Mutable counters owned by the controller
//! - [`reconcile`]: Mid-cycle duration correction table
//! - [`SignalController`]: Commands and the one-second tick

pub mod controller;
pub mod cycle;
pub mod reconcile;
pub mod state;

pub use controller::{PhaseTransition, SignalController, StartOutcome, TickReport};
pub use cycle::{Axis, Durations, Phase, PhaseKind};
pub use reconcile::DurationDelta;
pub use state::PhaseState;
