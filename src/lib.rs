//! sentrycam - single-camera intrusion detection daemon
//!
//! Two units of execution share one in-memory state object for the process
//! lifetime:
//!
//! - the **watch loop** ([`WatchLoop`]) samples frames from a [`FrameSource`],
//!   runs a [`DetectorBackend`], and records person detections into the
//!   shared [`WatchState`]
//! - the **status server** ([`api::ApiServer`]) serves read-only views of
//!   that state over HTTP (a polling status page plus JSON endpoints)
//!
//! Coupling is one-directional: the loop writes, the server reads. There is
//! no persistence; all state is lost on restart.
//!
//! # Module structure
//!
//! - `ingest`: frame sources (synthetic stub://, optional V4L2 devices)
//! - `detect`: detector backends (stub figure counting, optional ONNX)
//! - `state`: shared alert flag + append-only event log
//! - `watch`: the capture/detect loop
//! - `alert`: best-effort audible alert capability
//! - `api`: the status server
//! - `config`: daemon configuration

pub mod alert;
pub mod api;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod state;
pub mod watch;

pub use alert::{default_alert_sink, AlertSink, SilentAlert, TerminalBell};
pub use config::SentrycamConfig;
pub use detect::{BoundingBox, Detection, DetectorBackend, StubBackend, PERSON_CLASS_ID};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use frame::RawFrame;
pub use ingest::{CameraConfig, CameraSource, FrameSource};
pub use state::{DetectionEvent, WatchState};
pub use watch::{WatchLoop, DEFAULT_INTERVAL};
