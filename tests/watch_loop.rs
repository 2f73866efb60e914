use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use sentrycam::{
    AlertSink, CameraConfig, CameraSource, Detection, DetectorBackend, FrameSource, RawFrame,
    StubBackend, WatchLoop, WatchState,
};

/// Alert sink that counts rings.
#[derive(Default)]
struct CountingAlert {
    rings: Arc<AtomicUsize>,
}

impl AlertSink for CountingAlert {
    fn ring(&self) {
        self.rings.fetch_add(1, Ordering::SeqCst);
    }
}

fn scene_source(url: &str) -> CameraSource {
    CameraSource::open(CameraConfig {
        url: url.to_string(),
        width: 64,
        height: 48,
    })
    .expect("open synthetic camera")
}

fn fast_loop(
    source: Box<dyn FrameSource>,
    backend: Box<dyn DetectorBackend>,
    state: Arc<WatchState>,
    alert: Box<dyn AlertSink>,
) -> WatchLoop {
    WatchLoop::new(source, backend, state, alert).with_interval(Duration::from_millis(1))
}

#[test]
fn escalating_scene_appends_one_entry_per_person() {
    // Frame 1: 0 persons, frame 2: 1 person, frame 3: 2 persons.
    let source = scene_source("stub://scene?figures=0,1,2&frames=3");
    let state = Arc::new(WatchState::new());
    let rings = Arc::new(AtomicUsize::new(0));
    let alert = CountingAlert {
        rings: rings.clone(),
    };

    let frames = fast_loop(
        Box::new(source),
        Box::new(StubBackend::new()),
        state.clone(),
        Box::new(alert),
    )
    .run()
    .expect("loop runs to exhaustion");

    assert_eq!(frames, 3);
    assert_eq!(state.log_len(), 3);
    assert!(state.intrusion(), "last frame had persons");
    assert_eq!(rings.load(Ordering::SeqCst), 3);

    let events = state.log_events();
    for pair in events.windows(2) {
        assert!(pair[1].epoch_s >= pair[0].epoch_s);
    }
}

#[test]
fn alert_state_depends_only_on_latest_frame() {
    // Persons in frame 1, none in frame 2: the flag must drop back to false
    // and the log must keep the frame-1 entries.
    let source = scene_source("stub://scene?figures=2,0&frames=2");
    let state = Arc::new(WatchState::new());

    fast_loop(
        Box::new(source),
        Box::new(StubBackend::new()),
        state.clone(),
        Box::new(CountingAlert::default()),
    )
    .run()
    .expect("loop runs to exhaustion");

    assert!(!state.intrusion());
    assert_eq!(state.log_len(), 2);
}

#[test]
fn exhausted_source_freezes_last_known_state() {
    let source = scene_source("stub://scene?figures=0,1,2&frames=3");
    let state = Arc::new(WatchState::new());

    fast_loop(
        Box::new(source),
        Box::new(StubBackend::new()),
        state.clone(),
        Box::new(CountingAlert::default()),
    )
    .run()
    .expect("loop runs to exhaustion");

    // The loop is gone; the shared state keeps serving frame 3's verdict.
    assert!(state.intrusion());
    assert_eq!(state.log_len(), 3);
    assert_eq!(state.log_messages(), state.log_messages());
}

/// Backend that fails on a chosen frame and otherwise defers to the stub.
struct FlakyBackend {
    inner: StubBackend,
    fail_on: u64,
    seen: u64,
}

impl DetectorBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        self.seen += 1;
        if self.seen == self.fail_on {
            return Err(anyhow!("synthetic inference failure"));
        }
        self.inner.detect(pixels, width, height)
    }
}

#[test]
fn detector_error_skips_iteration_without_touching_state() {
    // Frame 1 raises the flag; frame 2's detection fails; frame 3 is empty.
    let source = scene_source("stub://scene?figures=1,1,0&frames=3");
    let state = Arc::new(WatchState::new());
    let backend = FlakyBackend {
        inner: StubBackend::new(),
        fail_on: 2,
        seen: 0,
    };

    let frames = fast_loop(
        Box::new(source),
        Box::new(backend),
        state.clone(),
        Box::new(CountingAlert::default()),
    )
    .run()
    .expect("detector errors are non-fatal");

    // All three frames were consumed; only frames 1 and 3 changed state.
    assert_eq!(frames, 3);
    assert_eq!(state.log_len(), 1);
    assert!(!state.intrusion());
}

#[test]
fn detector_error_leaves_previous_verdict_in_place() {
    // Frame 1 raises the flag, frame 2's detection fails: the flag must not
    // have been reset by the failed iteration.
    let source = scene_source("stub://scene?figures=1,1&frames=2");
    let state = Arc::new(WatchState::new());
    let backend = FlakyBackend {
        inner: StubBackend::new(),
        fail_on: 2,
        seen: 0,
    };

    fast_loop(
        Box::new(source),
        Box::new(backend),
        state.clone(),
        Box::new(CountingAlert::default()),
    )
    .run()
    .expect("detector errors are non-fatal");

    assert!(state.intrusion());
    assert_eq!(state.log_len(), 1);
}

/// Source whose acquisition fails outright (not mere exhaustion).
struct BrokenSource;

impl FrameSource for BrokenSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        Err(anyhow!("capture device unplugged"))
    }
}

#[test]
fn acquisition_failure_is_fatal() {
    let state = Arc::new(WatchState::new());
    let result = fast_loop(
        Box::new(BrokenSource),
        Box::new(StubBackend::new()),
        state.clone(),
        Box::new(CountingAlert::default()),
    )
    .run();

    assert!(result.is_err());
    assert!(!state.intrusion());
    assert_eq!(state.log_len(), 0);
}
