//! Viewfinder core
//!
//! This crate implements the systems core of a camera viewfinder app:
//! everything between the (platform-owned) capture pipeline and the
//! (platform-owned) UI overlay.
//!
//! # Architecture
//!
//! Two independent data paths share nothing but the crate:
//!
//! 1. **Live frame distribution**: the capture pipeline publishes JPEG
//!    frames into a [`FrameStore`]; a raw-TCP HTTP server fans the latest
//!    frame out to any number of MJPEG stream clients.
//! 2. **Detection stabilization**: raw per-frame object detections from an
//!    external detector are confidence-filtered and temporally smoothed
//!    into a stable, trackable set for the overlay layer.
//!
//! # Module Structure
//!
//! - `frame`: latest-frame cache (one producer, many readers)
//! - `server`: MJPEG streaming server plus diagnostic endpoints
//! - `detect`: confidence filter, track stabilizer, serialized pipeline
//! - `ingest`: frame sources for running without camera hardware
//! - `config`: daemon configuration (file + env)

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod server;

pub use detect::{filter_confident, Detection, DetectionPipeline, Mask, TrackStabilizer};
pub use frame::{Frame, FrameStore};
pub use ingest::{FrameSource, StubConfig, StubSource};
pub use server::{ServerConfig, ServerHandle, StreamServer};
