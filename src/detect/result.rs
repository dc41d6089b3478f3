/// One object hypothesis from the external detector.
///
/// Box coordinates are normalized to `[0,1] x [0,1]` image space with the
/// origin at the **top-left** corner; `(x, y)` is the top-left corner of the
/// box and `(w, h)` its extent.
#[derive(Clone, Debug)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Detector confidence in `[0,1]`.
    pub confidence: f32,
    /// Class label, e.g. `"person"`. Compared verbatim during association.
    pub label: String,
    /// Optional per-pixel overlay from the detector. Carried through
    /// untouched; never blended.
    pub mask: Option<Mask>,
}

impl Detection {
    /// Box center, `((min_x + max_x) / 2, (min_y + max_y) / 2)`.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Opaque per-pixel overlay image accompanying a detection.
#[derive(Clone, Debug)]
pub struct Mask {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
