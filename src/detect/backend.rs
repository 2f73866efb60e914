use anyhow::Result;

use crate::detect::result::Detection;

/// COCO class identifier for "person".
pub const PERSON_CLASS_ID: u32 = 0;

/// Detector backend trait.
///
/// Backends receive read-only RGB24 pixel data and report the objects they
/// found. They must not retain the pixel slice beyond the `detect` call.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
