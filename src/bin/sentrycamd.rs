//! sentrycamd - intrusion detection daemon
//!
//! This daemon:
//! 1. Opens the configured camera once at startup
//! 2. Spawns the status API server
//! 3. Runs the capture/detect loop on its own thread
//! 4. Blocks the main thread until Ctrl-C
//!
//! If the camera stops yielding frames the loop ends, but the API keeps
//! serving the last-known state until the process exits.

use anyhow::Result;
use std::sync::mpsc;
use std::sync::Arc;

use sentrycam::{
    api::{ApiConfig, ApiServer},
    default_alert_sink, CameraSource, DetectorBackend, SentrycamConfig, StubBackend, WatchLoop,
    WatchState,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = SentrycamConfig::load()?;
    let state = Arc::new(WatchState::with_log_cap(cfg.log_max_entries));

    let api_config = ApiConfig {
        addr: cfg.api_addr.clone(),
    };
    let api_handle = ApiServer::new(api_config, state.clone()).spawn()?;
    log::info!("status api listening on {}", api_handle.addr);

    let source = CameraSource::open(cfg.camera.clone())?;
    let backend = build_backend(&cfg)?;
    log::info!(
        "watching {} at {}x{} every {:?}",
        cfg.camera.url,
        cfg.camera.width,
        cfg.camera.height,
        cfg.interval
    );

    let watch_loop = WatchLoop::new(
        Box::new(source),
        backend,
        state.clone(),
        default_alert_sink(),
    )
    .with_interval(cfg.interval);
    let watch_thread = std::thread::spawn(move || match watch_loop.run() {
        Ok(frames) => log::info!("watch loop finished after {} frames", frames),
        Err(err) => log::error!("watch loop stopped: {}", err),
    });

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .expect("error setting Ctrl-C handler");

    log::info!("sentrycamd waiting for shutdown signal (Ctrl-C)...");
    let _ = rx.recv();
    log::info!("shutdown signal received, stopping API server...");
    api_handle.stop()?;
    // The watch thread is detached; it either already finished (exhausted
    // source) or dies with the process.
    drop(watch_thread);

    Ok(())
}

/// Pick the detector backend. `SENTRYCAM_MODEL_PATH` selects ONNX inference
/// when the backend-tract feature is compiled in; the stub backend is the
/// fallback.
fn build_backend(cfg: &SentrycamConfig) -> Result<Box<dyn DetectorBackend>> {
    if let Ok(model_path) = std::env::var("SENTRYCAM_MODEL_PATH") {
        #[cfg(feature = "backend-tract")]
        {
            let backend =
                sentrycam::TractBackend::new(&model_path, cfg.camera.width, cfg.camera.height)?;
            return Ok(Box::new(backend));
        }
        #[cfg(not(feature = "backend-tract"))]
        {
            anyhow::bail!(
                "SENTRYCAM_MODEL_PATH is set ({}) but the backend-tract feature is not compiled in",
                model_path
            );
        }
    }
    let _ = cfg;
    Ok(Box::new(StubBackend::new()))
}
