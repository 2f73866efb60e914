//! Raw frame container.
//!
//! Frames are RGB24 buffers produced by the ingestion layer and handed to
//! detector backends. Pixel data is private; backends receive a read-only
//! slice via [`RawFrame::pixels`].

/// A single captured frame (RGB24).
pub struct RawFrame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RawFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Read-only pixel access for detector backends.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Raw byte length (3 bytes per pixel for a well-formed frame).
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
