//! Periodic tick scheduler.
//!
//! The [`Simulator`] owns a [`SignalController`] behind an async mutex so
//! every mutation, whether it comes from the tick task or an operator
//! command, is serialized. While the cycle runs, a background task ticks
//! the controller once per period and publishes a [`Snapshot`] on a
//! broadcast channel. Stopping cancels the task; a tick already in progress
//! always completes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL};
use crate::display::Snapshot;
use crate::error::SchedulerError;
use crate::input::RequestedDurations;
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};
use crate::phase::{Durations, SignalController, StartOutcome, TickReport};

/// Default snapshot channel capacity.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 256;

/// Scheduler settings.
#[derive(Debug, Clone, Copy)]
pub struct SimulatorOptions {
    /// Period between ticks.
    pub tick_interval: Duration,
    /// Snapshots buffered per subscriber before it starts lagging.
    pub snapshot_capacity: usize,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            snapshot_capacity: DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}

struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs a [`SignalController`] against a real-time clock.
pub struct Simulator {
    controller: Arc<Mutex<SignalController>>,
    snapshots: broadcast::Sender<Snapshot>,
    events: Arc<EventEmitter>,
    tick_interval: Duration,
    cancel: CancellationToken,
    /// Held for the duration of each command so commands never interleave.
    ticker: Mutex<Option<Ticker>>,
}

impl Simulator {
    /// Creates a stopped simulator in the reset state.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroInterval`] for a zero tick period and
    /// [`SchedulerError::IntervalTooLong`] above [`MAX_TICK_INTERVAL`].
    pub fn new(options: SimulatorOptions, events: EventEmitter) -> Result<Self, SchedulerError> {
        if options.tick_interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        if options.tick_interval > MAX_TICK_INTERVAL {
            return Err(SchedulerError::IntervalTooLong {
                max_secs: MAX_TICK_INTERVAL.as_secs(),
            });
        }
        let (snapshots, _) = broadcast::channel(options.snapshot_capacity.max(1));
        Ok(Self {
            controller: Arc::new(Mutex::new(SignalController::new())),
            snapshots,
            events: Arc::new(events),
            tick_interval: options.tick_interval,
            cancel: CancellationToken::new(),
            ticker: Mutex::new(None),
        })
    }

    /// Subscribes to snapshots published after every tick and command.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Current view of the controller.
    pub async fn snapshot(&self) -> Snapshot {
        self.controller.lock().await.snapshot()
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Starts or resumes the cycle and begins ticking.
    ///
    /// A start while running changes nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ShutDown`] after [`shutdown`](Self::shutdown).
    pub async fn start(&self, requested: RequestedDurations) -> Result<StartOutcome, SchedulerError> {
        let mut ticker = self.ticker.lock().await;
        if self.cancel.is_cancelled() {
            return Err(SchedulerError::ShutDown);
        }

        let (outcome, snapshot) = {
            let mut controller = self.controller.lock().await;
            let outcome = controller.start(requested);
            (outcome, controller.snapshot())
        };

        if outcome == StartOutcome::AlreadyRunning {
            return Ok(outcome);
        }

        self.events.emit(Event::SimulatorStarted {
            timestamp: Utc::now(),
            durations: snapshot.configured,
            resumed: outcome == StartOutcome::Resumed,
        });
        metrics::set_current_phase(snapshot.phase);
        self.publish(snapshot);

        *ticker = Some(self.spawn_ticker());
        Ok(outcome)
    }

    /// Pauses the cycle, keeping state.
    ///
    /// Returns `false` if the simulator was not running.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskFailed`] if the tick task panicked. The
    /// controller is stopped either way.
    pub async fn stop(&self) -> Result<bool, SchedulerError> {
        let mut ticker = self.ticker.lock().await;
        let halted = Self::halt(ticker.take()).await;

        let (stopped, snapshot) = {
            let mut controller = self.controller.lock().await;
            (controller.stop(), controller.snapshot())
        };
        if stopped {
            self.events.emit(Event::SimulatorStopped {
                timestamp: Utc::now(),
                phase_index: snapshot.phase_index,
                phase_remaining: snapshot.phase_remaining,
            });
            self.publish(snapshot);
        }
        halted.map(|()| stopped)
    }

    /// Stops ticking and discards all state.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskFailed`] if the tick task panicked. The
    /// controller is reset either way.
    pub async fn reset(&self) -> Result<(), SchedulerError> {
        let mut ticker = self.ticker.lock().await;
        let halted = Self::halt(ticker.take()).await;

        let snapshot = {
            let mut controller = self.controller.lock().await;
            controller.reset();
            controller.snapshot()
        };
        self.events.emit(Event::SimulatorReset {
            timestamp: Utc::now(),
        });
        metrics::clear_current_phase();
        self.publish(snapshot);
        halted
    }

    /// Records new durations; the next tick reconciles the countdowns.
    pub async fn set_durations(&self, durations: Durations) {
        let _guard = self.ticker.lock().await;
        let snapshot = {
            let mut controller = self.controller.lock().await;
            controller.set_durations(durations);
            controller.snapshot()
        };
        self.events.emit(Event::DurationsChanged {
            timestamp: Utc::now(),
            durations,
        });
        self.publish(snapshot);
    }

    /// Cancels the tick task for good and leaves the controller stopped.
    ///
    /// Later calls to [`start`](Self::start) fail.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::TaskFailed`] if the tick task panicked.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.cancel.cancel();
        let mut ticker = self.ticker.lock().await;
        let halted = Self::halt(ticker.take()).await;
        self.controller.lock().await.stop();
        halted
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn publish(&self, snapshot: Snapshot) {
        // No subscribers is fine.
        let _ = self.snapshots.send(snapshot);
    }

    async fn halt(ticker: Option<Ticker>) -> Result<(), SchedulerError> {
        if let Some(Ticker { token, handle }) = ticker {
            token.cancel();
            handle.await?;
        }
        Ok(())
    }

    fn spawn_ticker(&self) -> Ticker {
        let token = self.cancel.child_token();
        let task_token = token.clone();
        let controller = Arc::clone(&self.controller);
        let snapshots = self.snapshots.clone();
        let events = Arc::clone(&self.events);
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => {
                        debug!("tick task cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        let snapshot = {
                            let mut controller = controller.lock().await;
                            let Some(report) = controller.tick() else {
                                warn!("tick task found controller stopped, exiting");
                                break;
                            };
                            observe_tick(&report, &controller, &events);
                            controller.snapshot()
                        };
                        let _ = snapshots.send(snapshot);
                    }
                }
            }
        });

        Ticker { token, handle }
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("tick_interval", &self.tick_interval)
            .field("subscribers", &self.snapshots.receiver_count())
            .finish_non_exhaustive()
    }
}

/// Records metrics and events for one tick.
pub fn observe_tick(report: &TickReport, controller: &SignalController, events: &EventEmitter) {
    metrics::record_tick();
    let state = controller.state();

    if let Some(delta) = report.reconciled {
        metrics::record_reconciliation();
        events.emit(Event::CountdownsReconciled {
            timestamp: Utc::now(),
            phase_index: state.current_phase.index(),
            delta_green: delta.green,
            delta_left_turn: delta.left_turn,
        });
    }

    if let Some(transition) = report.transition {
        metrics::record_phase_transition(transition.to);
        events.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            phase: transition.to,
            phase_index: transition.to.index(),
            phase_label: transition.to.label(),
            rearmed: transition.rearmed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    fn simulator() -> Simulator {
        Simulator::new(SimulatorOptions::default(), EventEmitter::noop()).unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        let options = SimulatorOptions {
            tick_interval: Duration::ZERO,
            ..SimulatorOptions::default()
        };
        assert!(matches!(
            Simulator::new(options, EventEmitter::noop()),
            Err(SchedulerError::ZeroInterval)
        ));
    }

    #[test]
    fn test_overlong_interval_rejected() {
        let options = SimulatorOptions {
            tick_interval: MAX_TICK_INTERVAL + Duration::from_secs(1),
            ..SimulatorOptions::default()
        };
        assert!(matches!(
            Simulator::new(options, EventEmitter::noop()),
            Err(SchedulerError::IntervalTooLong { max_secs: 3600 })
        ));

        let options = SimulatorOptions {
            tick_interval: MAX_TICK_INTERVAL,
            ..SimulatorOptions::default()
        };
        assert!(Simulator::new(options, EventEmitter::noop()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let sim = simulator();
        let mut rx = sim.subscribe();

        sim.start(RequestedDurations::default()).await.unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.phase_remaining, 10);
        assert!(first.running);

        let before = Instant::now();
        let next = rx.recv().await.unwrap();
        assert_eq!(next.phase_remaining, 9);
        assert_eq!(before.elapsed(), Duration::from_secs(1));

        for _ in 0..9 {
            rx.recv().await.unwrap();
        }
        let snap = sim.snapshot().await;
        assert_eq!(snap.phase, Phase::NorthSouthYellow);
        assert_eq!(snap.phase_remaining, 2);

        sim.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticking() {
        let sim = simulator();
        let mut rx = sim.subscribe();
        sim.start(RequestedDurations::default()).await.unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        assert!(sim.stop().await.unwrap());
        let stopped = rx.recv().await.unwrap();
        assert!(!stopped.running);
        assert_eq!(stopped.phase_remaining, 9);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.snapshot().await.phase_remaining, 9);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        assert!(!sim.stop().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_noop() {
        let sim = simulator();
        assert_eq!(
            sim.start(RequestedDurations::default()).await.unwrap(),
            StartOutcome::Initialized
        );
        assert_eq!(
            sim.start(RequestedDurations::new(Some(30), None)).await.unwrap(),
            StartOutcome::AlreadyRunning
        );
        assert_eq!(sim.snapshot().await.configured, Durations::default());
        sim.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_durations_reconciles_on_next_tick() {
        let sim = simulator();
        let mut rx = sim.subscribe();
        sim.start(RequestedDurations::default()).await.unwrap();
        for _ in 0..5 {
            rx.recv().await.unwrap();
        }
        assert_eq!(sim.snapshot().await.phase_remaining, 6);

        sim.set_durations(Durations::new(12, 5).unwrap()).await;
        let changed = rx.recv().await.unwrap();
        assert_eq!(changed.phase_remaining, 6);
        assert_eq!(changed.applied, Durations::default());

        let ticked = rx.recv().await.unwrap();
        assert_eq!(ticked.phase_remaining, 7);
        sim.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_and_clears() {
        let sim = simulator();
        sim.start(RequestedDurations::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;

        sim.reset().await.unwrap();
        let snap = sim.snapshot().await;
        assert!(!snap.running);
        assert!(!snap.initialized);
        assert_eq!(snap.phase_remaining, 10);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sim.snapshot().await, snap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_shutdown_fails() {
        let sim = simulator();
        let mut rx = sim.subscribe();
        sim.start(RequestedDurations::default()).await.unwrap();
        rx.recv().await.unwrap();

        sim.shutdown().await.unwrap();
        assert!(!sim.snapshot().await.running);

        assert!(matches!(
            sim.start(RequestedDurations::default()).await,
            Err(SchedulerError::ShutDown)
        ));
        let snap = sim.snapshot().await;
        assert!(!snap.running);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.snapshot().await, snap);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_shutdown_without_start() {
        let sim = simulator();
        tokio_test::block_on(sim.shutdown()).unwrap();
        assert!(sim.cancellation_token().is_cancelled());
    }
}
