use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::ingest::CameraConfig;

const DEFAULT_API_ADDR: &str = "127.0.0.1:8780";
const DEFAULT_CAMERA_URL: &str = "stub://lobby";
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Deserialize, Default)]
struct SentrycamConfigFile {
    api: Option<ApiConfigFile>,
    camera: Option<CameraConfigFile>,
    watch: Option<WatchConfigFile>,
    log: Option<LogConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct WatchConfigFile {
    interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct LogConfigFile {
    max_entries: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SentrycamConfig {
    pub api_addr: String,
    pub camera: CameraConfig,
    pub interval: Duration,
    /// Event log cap. `None` keeps the log unbounded.
    pub log_max_entries: Option<usize>,
}

impl SentrycamConfig {
    /// Load the config file named by `SENTRYCAM_CONFIG` (if any), then apply
    /// env-var overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENTRYCAM_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SentrycamConfigFile) -> Self {
        let api_addr = file
            .api
            .and_then(|api| api.addr)
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        let camera = CameraConfig {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
        };
        let interval = Duration::from_millis(
            file.watch
                .and_then(|watch| watch.interval_ms)
                .unwrap_or(DEFAULT_INTERVAL_MS),
        );
        let log_max_entries = file.log.and_then(|log| log.max_entries);
        Self {
            api_addr,
            camera,
            interval,
            log_max_entries,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("SENTRYCAM_API_ADDR") {
            if !addr.trim().is_empty() {
                self.api_addr = addr;
            }
        }
        if let Ok(url) = std::env::var("SENTRYCAM_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(interval) = std::env::var("SENTRYCAM_INTERVAL_MS") {
            let millis: u64 = interval
                .parse()
                .map_err(|_| anyhow!("SENTRYCAM_INTERVAL_MS must be an integer of milliseconds"))?;
            self.interval = Duration::from_millis(millis);
        }
        if let Ok(cap) = std::env::var("SENTRYCAM_LOG_MAX_ENTRIES") {
            let cap: usize = cap
                .parse()
                .map_err(|_| anyhow!("SENTRYCAM_LOG_MAX_ENTRIES must be an integer"))?;
            self.log_max_entries = Some(cap);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        if self.interval.is_zero() {
            return Err(anyhow!("watch interval must be greater than zero"));
        }
        if self.log_max_entries == Some(0) {
            return Err(anyhow!("log max_entries must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SentrycamConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
