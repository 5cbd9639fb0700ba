//! Metrics collection.
//!
//! Prometheus-compatible counters and gauges for the tick loop. The metrics
//! macros are no-ops until [`init_metrics`] installs a recorder.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SignalError;
use crate::phase::Phase;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// With `Some(port)` a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`; with `None` the recorder is installed without an
/// endpoint.
///
/// # Errors
///
/// Returns `SignalError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SignalError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SignalError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("signalphase_ticks_total", "Ticks processed while running");
    describe_counter!(
        "signalphase_phase_transitions_total",
        "Phase transitions by destination phase"
    );
    describe_counter!(
        "signalphase_reconciliations_total",
        "Mid-cycle duration reconciliations"
    );
    describe_gauge!("signalphase_current_phase", "Index of the active phase");
}

pub fn record_tick() {
    counter!("signalphase_ticks_total").increment(1);
}

/// Records a phase transition and updates the current-phase gauge.
pub fn record_phase_transition(to: Phase) {
    counter!("signalphase_phase_transitions_total", "to" => to.index().to_string()).increment(1);
    set_current_phase(to);
}

#[allow(clippy::cast_precision_loss)]
pub fn set_current_phase(phase: Phase) {
    gauge!("signalphase_current_phase").set(phase.index() as f64);
}

pub fn record_reconciliation() {
    counter!("signalphase_reconciliations_total").increment(1);
}

/// Resets the current-phase gauge, used after a reset command.
pub fn clear_current_phase() {
    gauge!("signalphase_current_phase").set(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_tick();
        record_phase_transition(Phase::EastWestYellow);
        set_current_phase(Phase::NorthSouthGreen);
        record_reconciliation();
        clear_current_phase();
    }
}
