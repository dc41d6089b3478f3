//! Temporal smoothing of per-frame detections.
//!
//! Raw detections jitter in position, size and confidence frame-to-frame
//! even for a static object. The stabilizer associates each new detection
//! with the nearest same-label detection from the previous cycle and blends
//! their geometry exponentially, so the published overlay moves smoothly
//! without unbounded lag. Objects with no prior match (newly appeared, or
//! reclassified between frames) pass through unchanged.

use std::collections::VecDeque;

use super::Detection;

/// Number of detection cycles retained in history.
pub const HISTORY_CAPACITY: usize = 3;

/// Maximum center-to-center distance (normalized space) for association.
/// Keeps a person's box from blending into a nearby chair's.
pub const MATCH_DISTANCE: f32 = 0.3;

/// Blend weight on the historical estimate; the new sample gets the rest.
pub const SMOOTHING: f32 = 0.7;

/// Associates and smooths detections across cycles.
///
/// Single-writer by contract: one cycle at a time, no concurrent calls.
/// Callers that may receive overlapping detector completions must serialize
/// through [`DetectionPipeline`](super::DetectionPipeline). State is
/// memory-only and resets to cold start on reconstruction.
#[derive(Debug, Default)]
pub struct TrackStabilizer {
    previous: Vec<Detection>,
    history: VecDeque<Vec<Detection>>,
}

impl TrackStabilizer {
    pub fn new() -> Self {
        Self {
            previous: Vec::new(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Run one detection cycle. Returns the smoothed list, which also
    /// becomes the association baseline for the next cycle.
    pub fn process(&mut self, detections: Vec<Detection>) -> Vec<Detection> {
        self.history.push_back(detections.clone());
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        // Cold start: nothing to associate against yet.
        if self.history.len() < 2 {
            self.previous = detections.clone();
            return detections;
        }

        let previous = &self.previous;
        let smoothed: Vec<Detection> = detections
            .into_iter()
            .map(|det| match best_match(previous, &det) {
                Some(prev) => blend(prev, det),
                None => det,
            })
            .collect();

        self.previous = smoothed.clone();
        smoothed
    }

    /// Most recent smoothed output.
    pub fn previous_detections(&self) -> &[Detection] {
        &self.previous
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Nearest same-label detection from the prior cycle within the distance
/// gate. Strict `<` on the running minimum keeps the first-encountered
/// candidate on a tie.
fn best_match<'a>(previous: &'a [Detection], det: &Detection) -> Option<&'a Detection> {
    let (cx, cy) = det.center();
    let mut best: Option<(&'a Detection, f32)> = None;
    for prev in previous {
        if prev.label != det.label {
            continue;
        }
        let (px, py) = prev.center();
        let dist = ((cx - px).powi(2) + (cy - py).powi(2)).sqrt();
        if dist >= MATCH_DISTANCE {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((prev, dist)),
        }
    }
    best.map(|(prev, _)| prev)
}

/// Exponential blend of the four box scalars and the confidence. Label and
/// mask always come from the new detection; labels never smooth.
fn blend(prev: &Detection, cur: Detection) -> Detection {
    let mix = |p: f32, c: f32| p * SMOOTHING + c * (1.0 - SMOOTHING);
    Detection {
        x: mix(prev.x, cur.x),
        y: mix(prev.y, cur.y),
        w: mix(prev.w, cur.w),
        h: mix(prev.h, cur.h),
        confidence: mix(prev.confidence, cur.confidence),
        label: cur.label,
        mask: cur.mask,
    }
}
