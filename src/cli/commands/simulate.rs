//! `simulate` command: deterministic offline ticking.

use chrono::Utc;

use crate::cli::args::SimulateArgs;
use crate::cli::commands::{event_emitter, print_snapshot, resolve_settings};
use crate::error::SignalError;
use crate::observability::Event;
use crate::phase::SignalController;
use crate::scheduler::observe_tick;

/// Starts a controller and ticks it `args.ticks` times, printing the
/// snapshot after the start and after every tick.
///
/// # Errors
///
/// Returns a usage error for a `--set-at` tick past `--ticks`, otherwise an
/// error if configuration, the event file, or stdout fails.
pub fn run(args: &SimulateArgs) -> Result<(), SignalError> {
    if let Some(late) = args.set_at.iter().find(|c| c.tick > args.ticks) {
        return Err(SignalError::Usage(format!(
            "--set-at tick {} is after the last tick ({})",
            late.tick, args.ticks
        )));
    }
    let settings = resolve_settings(&args.source)?;
    let events = event_emitter(args.events_file.as_deref())?;

    let mut controller = SignalController::new();
    let outcome = controller.start(settings.requested);
    tracing::debug!(?outcome, ticks = args.ticks, "simulation started");
    events.emit(Event::SimulatorStarted {
        timestamp: Utc::now(),
        durations: controller.state().configured,
        resumed: false,
    });
    print_snapshot(args.format, &controller.snapshot())?;

    for tick in 1..=args.ticks {
        for change in args.set_at.iter().filter(|c| c.tick == tick) {
            controller.set_durations(change.durations);
            events.emit(Event::DurationsChanged {
                timestamp: Utc::now(),
                durations: change.durations,
            });
        }
        if let Some(report) = controller.tick() {
            observe_tick(&report, &controller, &events);
        }
        print_snapshot(args.format, &controller.snapshot())?;
    }

    tracing::info!(
        ticks = args.ticks,
        events = events.event_count(),
        phase = %controller.current_phase(),
        "simulation finished"
    );
    Ok(())
}
