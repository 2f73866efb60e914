//! Capture/detect loop.
//!
//! The loop owns the frame source and the detector backend exclusively and
//! is the only writer to the shared [`WatchState`]. Per iteration:
//!
//! 1. acquire a frame — exhaustion or failure ends the loop, no retry
//! 2. run the detector — a detector error is logged and skips the iteration,
//!    leaving state untouched for that frame
//! 3. on success, reset the alert flag, then record one event (and ring the
//!    alert sink) per person-class detection
//! 4. sleep the configured interval to bound the detector invocation rate
//!
//! The alert flag is memoryless: each frame recomputes it from scratch, so
//! there is no "ongoing intrusion" state carried between frames.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::alert::AlertSink;
use crate::detect::{DetectorBackend, PERSON_CLASS_ID};
use crate::ingest::FrameSource;
use crate::state::WatchState;

/// Default pause between iterations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

pub struct WatchLoop {
    source: Box<dyn FrameSource>,
    backend: Box<dyn DetectorBackend>,
    state: Arc<WatchState>,
    alert: Box<dyn AlertSink>,
    interval: Duration,
}

impl WatchLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        backend: Box<dyn DetectorBackend>,
        state: Arc<WatchState>,
        alert: Box<dyn AlertSink>,
    ) -> Self {
        Self {
            source,
            backend,
            state,
            alert,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Override the inter-frame pause.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the source is exhausted or fails.
    ///
    /// Returns the number of frames processed. A frame-acquisition error is
    /// returned to the caller; the shared state keeps its last-known values
    /// either way.
    pub fn run(mut self) -> Result<u64> {
        self.backend.warm_up()?;
        log::info!("watch loop running (backend: {})", self.backend.name());

        let mut frames = 0u64;
        loop {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::warn!("frame source exhausted after {} frames, stopping", frames);
                    return Ok(frames);
                }
                Err(err) => {
                    log::error!("frame acquisition failed after {} frames: {}", frames, err);
                    return Err(err);
                }
            };
            frames += 1;

            match self
                .backend
                .detect(frame.pixels(), frame.width, frame.height)
            {
                Ok(detections) => {
                    // The reset happens only once detection succeeded, so a
                    // failed invocation leaves the previous frame's verdict
                    // in place.
                    self.state.clear_intrusion();
                    for det in detections.iter().filter(|d| d.class_id == PERSON_CLASS_ID) {
                        let event = self.state.record_intrusion();
                        self.alert.ring();
                        log::info!("{} (confidence {:.2})", event.message, det.confidence);
                    }
                }
                Err(err) => {
                    log::warn!("detection failed on frame {}: {}", frames, err);
                }
            }

            std::thread::sleep(self.interval);
        }
    }
}
