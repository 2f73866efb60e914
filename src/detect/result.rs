/// A single detected object.
///
/// Backends report class, region, and confidence. The watch loop only
/// consults `class_id`; confidence and region are carried for logging and
/// future consumers.
#[derive(Clone, Debug)]
pub struct Detection {
    /// COCO class identifier (0 = person).
    pub class_id: u32,
    /// Bounding region (normalized 0..1 coordinates).
    pub bbox: BoundingBox,
    pub confidence: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}
