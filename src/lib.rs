//! `signalphase` - eight-phase intersection signal controller
//!
//! The [`phase`] module holds the controller: a fixed cycle of north-south
//! and east-west green, yellow, protected-left and all-red clearance phases
//! with per-axis countdowns that survive mid-cycle duration changes. The
//! [`scheduler`] drives it from a tokio interval; [`display`] derives what a
//! signal head would show.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod observability;
pub mod phase;
pub mod scheduler;
