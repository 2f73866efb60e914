use anyhow::{anyhow, Result};

use crate::detect::backend::{DetectorBackend, PERSON_CLASS_ID};
use crate::detect::result::{BoundingBox, Detection};

/// Pixel brightness above which a pixel counts as part of a figure.
const FIGURE_LUMA: u8 = 200;

/// Stub backend for testing and stub:// deployments.
///
/// Synthetic frames render each "person" as a bright vertical bar on a dark
/// background. The stub scans the frame's middle row and reports one person
/// detection per contiguous bright run.
#[derive(Default)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        if width == 0 || height == 0 {
            return Ok(vec![]);
        }

        let width = width as usize;
        let row = (height as usize / 2) * width * 3;
        let mut detections = Vec::new();
        let mut run_start: Option<usize> = None;

        for x in 0..width {
            let px = &pixels[row + x * 3..row + x * 3 + 3];
            let luma = px[0].max(px[1]).max(px[2]);
            let bright = luma >= FIGURE_LUMA;
            match (bright, run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    detections.push(figure_detection(start, x, width));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            detections.push(figure_detection(start, width, width));
        }

        Ok(detections)
    }
}

fn figure_detection(start: usize, end: usize, width: usize) -> Detection {
    Detection {
        class_id: PERSON_CLASS_ID,
        bbox: BoundingBox {
            x: start as f32 / width as f32,
            y: 0.0,
            w: (end - start) as f32 / width as f32,
            h: 1.0,
        },
        confidence: 0.9,
    }
}
