//! Structured event stream.
//!
//! Discrete, typed simulator events serialized as newline-delimited JSON
//! with a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::phase::{Axis, Durations, Phase};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete simulator event.
///
/// Tagged with `"type"` when serialized so consumers can dispatch on kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The cycle started or resumed.
    SimulatorStarted {
        timestamp: DateTime<Utc>,
        /// Durations in effect after the start.
        durations: Durations,
        /// `true` when this was a resume of retained state.
        resumed: bool,
    },

    /// The cycle was paused.
    SimulatorStopped {
        timestamp: DateTime<Utc>,
        phase_index: usize,
        phase_remaining: i64,
    },

    /// State was discarded.
    SimulatorReset { timestamp: DateTime<Utc> },

    /// The operator changed durations; reconciliation follows on next tick.
    DurationsChanged {
        timestamp: DateTime<Utc>,
        durations: Durations,
    },

    /// A new phase has been entered.
    PhaseEntered {
        timestamp: DateTime<Utc>,
        phase: Phase,
        phase_index: usize,
        phase_label: &'static str,
        /// Axis whose countdown was re-armed, if any.
        rearmed: Option<Axis>,
    },

    /// Pending duration changes were folded into the live counters.
    CountdownsReconciled {
        timestamp: DateTime<Utc>,
        phase_index: usize,
        delta_green: i64,
        delta_left_turn: i64,
    },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped; the event stream must never
/// stop the simulation.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn phase_entered() -> Event {
        Event::PhaseEntered {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            phase: Phase::NorthSouthLeftTurn,
            phase_index: 2,
            phase_label: Phase::NorthSouthLeftTurn.label(),
            rearmed: Some(Axis::NorthSouth),
        }
    }

    #[test]
    fn emitter_writes_flat_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(phase_entered());

        let parsed: serde_json::Value = serde_json::from_str(tw.contents().trim()).unwrap();
        assert_eq!(parsed["sequence"], 0);
        assert_eq!(parsed["type"], "PhaseEntered");
        assert_eq!(parsed["phase"], "north_south_left_turn");
        assert_eq!(parsed["phase_label"], "N-S (left turn)");
        assert_eq!(parsed["rearmed"], "north_south");
        assert!(parsed.get("event").is_none());
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(Event::SimulatorReset {
            timestamp: Utc::now(),
        });
        emitter.emit(Event::DurationsChanged {
            timestamp: Utc::now(),
            durations: Durations::new(12, 5).unwrap(),
        });

        assert_eq!(emitter.event_count(), 2);
        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["durations"]["green"], 12);
    }

    #[test]
    fn noop_emitter_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::SimulatorStopped {
            timestamp: Utc::now(),
            phase_index: 3,
            phase_remaining: 1,
        });
        assert_eq!(emitter.event_count(), 1);
    }
}
