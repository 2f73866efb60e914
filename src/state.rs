//! Shared intrusion state.
//!
//! `WatchState` is the single piece of state shared between the watch loop
//! (writer) and the API server (readers):
//!
//! - an alert flag: "was a person present in the most recently processed
//!   frame" — recomputed from scratch per frame, never accumulated
//! - the event log: an append-only chronological record of detections
//!
//! Consistency contract: the flag is an atomic and the log is mutex-guarded,
//! so readers never observe a torn flag or a corrupt log. The two fields are
//! not updated under one guard; a reader may see a log entry before the flag
//! flips (or vice versa). Callers must tolerate that window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Local;

/// A single person-detection event. Immutable once created.
#[derive(Clone, Debug)]
pub struct DetectionEvent {
    /// Unix timestamp (seconds, wall clock) at the moment of append.
    pub epoch_s: i64,
    /// Rendered human-readable message, e.g.
    /// `Intrusion detected: 2026-08-29 14:03:07`.
    pub message: String,
}

impl DetectionEvent {
    fn now() -> Self {
        let now = Local::now();
        Self {
            epoch_s: now.timestamp(),
            message: format!("Intrusion detected: {}", now.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Shared state between the watch loop and the API server.
///
/// The watch loop is the only writer; the server only reads snapshots.
pub struct WatchState {
    intrusion: AtomicBool,
    log: Mutex<Vec<DetectionEvent>>,
    /// When set, the log drops its oldest entry once it grows past the cap.
    /// `None` reproduces the reference behavior (unbounded growth).
    max_entries: Option<usize>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::with_log_cap(None)
    }

    pub fn with_log_cap(max_entries: Option<usize>) -> Self {
        Self {
            intrusion: AtomicBool::new(false),
            log: Mutex::new(Vec::new()),
            max_entries,
        }
    }

    /// Current alert flag.
    pub fn intrusion(&self) -> bool {
        self.intrusion.load(Ordering::SeqCst)
    }

    /// Reset the alert flag at the start of a frame's bookkeeping.
    pub fn clear_intrusion(&self) {
        self.intrusion.store(false, Ordering::SeqCst);
    }

    /// Record one person detection: raises the alert flag and appends one
    /// event, timestamped at the moment of append. Returns a copy of the
    /// appended event for logging.
    pub fn record_intrusion(&self) -> DetectionEvent {
        self.intrusion.store(true, Ordering::SeqCst);
        let event = DetectionEvent::now();
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        log.push(event.clone());
        if let Some(cap) = self.max_entries {
            if log.len() > cap {
                log.remove(0);
            }
        }
        event
    }

    /// Number of logged events.
    pub fn log_len(&self) -> usize {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Snapshot of all event messages, insertion order.
    pub fn log_messages(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }

    /// Snapshot of all events, insertion order.
    pub fn log_events(&self) -> Vec<DetectionEvent> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for WatchState {
    fn default() -> Self {
        Self::new()
    }
}
