//! Frame sources feeding the frame store.
//!
//! On-device the capture pipeline publishes frames directly; these sources
//! exist so the daemon and tests can run without camera hardware. All
//! sources yield encoded JPEG bytes ready for `FrameStore::publish`.

mod stub;

pub use stub::{StubConfig, StubSource};

use anyhow::Result;

/// A producer of encoded JPEG frames.
pub trait FrameSource {
    /// Capture the next frame, pacing to the source's target rate.
    fn next_frame(&mut self) -> Result<Vec<u8>>;
}
