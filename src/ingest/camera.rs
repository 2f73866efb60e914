//! Camera source.
//!
//! `CameraSource` opens the configured capture URL once at startup:
//! - `stub://<name>` produces synthetic scenes (with optional query
//!   parameters, see [`SyntheticCamera`])
//! - `/dev/video*` paths capture from a local V4L2 device (feature:
//!   ingest-v4l2)

use anyhow::Result;

use crate::frame::RawFrame;
use crate::ingest::FrameSource;

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Capture URL ("stub://lobby") or device path ("/dev/video0").
    pub url: String,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://lobby".to_string(),
            width: 640,
            height: 480,
        }
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCamera),
    #[cfg(feature = "ingest-v4l2")]
    V4l2(super::v4l2::V4l2Camera),
}

impl CameraSource {
    /// Open the configured source. Called once at startup.
    pub fn open(config: CameraConfig) -> Result<Self> {
        if config.url.starts_with("stub://") {
            let camera = SyntheticCamera::new(config)?;
            log::info!(
                "CameraSource: connected to {} (synthetic)",
                camera.config.url
            );
            return Ok(Self {
                backend: CameraBackend::Synthetic(camera),
            });
        }
        if config.url.starts_with("/dev/video") {
            #[cfg(feature = "ingest-v4l2")]
            {
                let camera = super::v4l2::V4l2Camera::open(config)?;
                return Ok(Self {
                    backend: CameraBackend::V4l2(camera),
                });
            }
            #[cfg(not(feature = "ingest-v4l2"))]
            {
                anyhow::bail!(
                    "capture from {} requires the ingest-v4l2 feature",
                    config.url
                );
            }
        }
        anyhow::bail!("unsupported capture url '{}'", config.url)
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        match &mut self.backend {
            CameraBackend::Synthetic(camera) => camera.next_frame(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::V4l2(camera) => camera.next_frame(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic camera (stub://)
// ----------------------------------------------------------------------------

/// Synthetic scene generator.
///
/// Renders a dark background with bright vertical bars, one per simulated
/// person, sized so the stub detector finds them. Query parameters control
/// the scene:
///
/// - `figures=a,b,c` — persons per frame, cycled (default `0`)
/// - `frames=N` — exhaust after N frames (default: never)
///
/// Example: `stub://lobby?figures=0,1,2&frames=3` yields exactly the
/// three-frame escalation scene.
struct SyntheticCamera {
    config: CameraConfig,
    figures: Vec<u32>,
    max_frames: Option<u64>,
    frame_count: u64,
}

impl SyntheticCamera {
    fn new(config: CameraConfig) -> Result<Self> {
        let (figures, max_frames) = parse_stub_query(&config.url)?;
        Ok(Self {
            config,
            figures,
            max_frames,
            frame_count: 0,
        })
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if let Some(max) = self.max_frames {
            if self.frame_count >= max {
                return Ok(None);
            }
        }
        let figures = self.figures[(self.frame_count as usize) % self.figures.len()];
        self.frame_count += 1;

        let pixels = self.render_scene(figures);
        Ok(Some(RawFrame::new(
            pixels,
            self.config.width,
            self.config.height,
        )))
    }

    /// Paint `figures` bright bars, evenly spaced, on a dark background.
    fn render_scene(&self, figures: u32) -> Vec<u8> {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let mut pixels = vec![16u8; width * height * 3];
        if figures == 0 || width == 0 || height == 0 {
            return pixels;
        }

        let slot = width / figures as usize;
        let bar_w = (width / 16).max(2).min(slot.max(1));
        for figure in 0..figures as usize {
            let start = figure * slot + (slot.saturating_sub(bar_w)) / 2;
            let end = (start + bar_w).min(width);
            for y in 0..height {
                for x in start..end {
                    let idx = (y * width + x) * 3;
                    pixels[idx..idx + 3].copy_from_slice(&[245, 245, 245]);
                }
            }
        }
        pixels
    }
}

fn parse_stub_query(url: &str) -> Result<(Vec<u32>, Option<u64>)> {
    let mut figures = vec![0u32];
    let mut max_frames = None;
    let Some(query) = url.split_once('?').map(|(_, q)| q) else {
        return Ok((figures, max_frames));
    };
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "figures" => {
                let parsed: Result<Vec<u32>, _> =
                    value.split(',').map(|part| part.trim().parse()).collect();
                let parsed = parsed
                    .map_err(|_| anyhow::anyhow!("invalid figures list '{}' in {}", value, url))?;
                if !parsed.is_empty() {
                    figures = parsed;
                }
            }
            "frames" => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid frame count '{}' in {}", value, url))?;
                max_frames = Some(parsed);
            }
            _ => {}
        }
    }
    Ok((figures, max_frames))
}
