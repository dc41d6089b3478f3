//! Detection post-processing: confidence filter, track stabilizer, and the
//! serialized pipeline tying them together.

mod ingest;
mod result;
mod stabilize;

pub use ingest::{filter_confident, CONFIDENCE_FLOOR};
pub use result::{Detection, Mask};
pub use stabilize::{TrackStabilizer, HISTORY_CAPACITY, MATCH_DISTANCE, SMOOTHING};

use std::sync::{Mutex, PoisonError, RwLock};

/// Single-flight front door for detection cycles.
///
/// The stabilizer is single-writer by contract. Host environments can
/// deliver detector completions from whatever thread finished inference, so
/// the pipeline serializes cycles behind a mutex: a new cycle cannot begin
/// while the previous one is still updating published state. The published
/// set is held separately behind a read lock so the overlay layer can read
/// it without contending with an in-flight cycle.
#[derive(Debug, Default)]
pub struct DetectionPipeline {
    stabilizer: Mutex<TrackStabilizer>,
    published: RwLock<Vec<Detection>>,
}

impl DetectionPipeline {
    pub fn new() -> Self {
        Self {
            stabilizer: Mutex::new(TrackStabilizer::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    /// Run one cycle: filter raw detections, stabilize, publish.
    /// Returns the published list.
    pub fn process(&self, raw: Vec<Detection>) -> Vec<Detection> {
        let filtered = filter_confident(raw);
        let mut stabilizer = self
            .stabilizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let smoothed = stabilizer.process(filtered);
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = smoothed.clone();
        smoothed
    }

    /// Most recently published detection set, for the overlay layer.
    pub fn latest(&self) -> Vec<Detection> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
