//! Frame ingestion sources.
//!
//! Sources produce `RawFrame` instances for the watch loop:
//! - `stub://` synthetic scenes (testing and demos)
//! - local V4L2 devices (feature: ingest-v4l2)
//!
//! A source yields frames until it is exhausted or fails; the watch loop
//! treats both as fatal and never reconnects.

mod camera;
#[cfg(feature = "ingest-v4l2")]
mod v4l2;

pub use camera::{CameraConfig, CameraSource};

use anyhow::Result;

use crate::frame::RawFrame;

/// A source of frames.
///
/// `Ok(Some(frame))` yields the next frame, `Ok(None)` signals exhaustion,
/// `Err` signals an acquisition failure. Exhaustion and failure both end the
/// consuming loop.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<RawFrame>>;
}
