//! Latest-frame cache.
//!
//! The capture pipeline overwrites the current frame on every capture
//! callback; stream writers read it concurrently. Frames are latest-wins:
//! no queue, no sequence numbers. A reader may see a stale or repeated
//! frame, never a torn one.

use std::sync::{Arc, PoisonError, RwLock};

/// One encoded still image from the capture pipeline.
///
/// The bytes are opaque to this crate; they are handed to stream clients
/// verbatim. A frame is never mutated after construction - `publish`
/// replaces the whole reference.
#[derive(Debug)]
pub struct Frame {
    jpeg: Vec<u8>,
}

impl Frame {
    pub fn new(jpeg: Vec<u8>) -> Self {
        Self { jpeg }
    }

    /// Encoded JPEG bytes, exactly as published.
    pub fn as_jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn len(&self) -> usize {
        self.jpeg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jpeg.is_empty()
    }
}

/// Thread-safe holder of the most recent frame.
///
/// Exactly one producer calls [`publish`](FrameStore::publish) (the capture
/// callback, already serialized upstream); an unbounded number of stream
/// writer threads call [`current`](FrameStore::current). Readers share the
/// frame through an `Arc`, so publish swaps a pointer and never waits for a
/// slow client to finish sending.
#[derive(Debug, Default)]
pub struct FrameStore {
    latest: RwLock<Option<Arc<Frame>>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
        }
    }

    /// Replace the current frame. Never blocks on readers still holding
    /// the previous frame; their `Arc` keeps it alive until they drop it.
    pub fn publish(&self, jpeg: Vec<u8>) {
        let frame = Arc::new(Frame::new(jpeg));
        *self
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    /// The latest published frame, or `None` before the first publish.
    pub fn current(&self) -> Option<Arc<Frame>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn empty_store_has_no_frame() {
        let store = FrameStore::new();
        assert!(store.current().is_none());
    }

    #[test]
    fn publish_replaces_current() {
        let store = FrameStore::new();
        store.publish(vec![1, 2, 3]);
        store.publish(vec![4, 5]);
        let frame = store.current().expect("frame");
        assert_eq!(frame.as_jpeg(), &[4, 5]);
    }

    #[test]
    fn old_frame_survives_while_reader_holds_it() {
        let store = FrameStore::new();
        store.publish(vec![1; 16]);
        let held = store.current().expect("frame");
        store.publish(vec![2; 16]);
        assert_eq!(held.as_jpeg(), &[1; 16]);
        assert_eq!(store.current().expect("frame").as_jpeg(), &[2; 16]);
    }

    /// One publisher flips between two uniform payloads while readers hammer
    /// `current()`. Every observed frame must be wholly one payload or the
    /// other - a mixed buffer means a torn read.
    #[test]
    fn concurrent_readers_never_observe_torn_frames() {
        let store = Arc::new(FrameStore::new());
        let stop = Arc::new(AtomicBool::new(false));

        let writer = {
            let store = store.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut flip = false;
                while !stop.load(Ordering::Relaxed) {
                    if flip {
                        store.publish(vec![0xAA; 1024]);
                    } else {
                        store.publish(vec![0xBB; 2048]);
                    }
                    flip = !flip;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let stop = stop.clone();
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        if let Some(frame) = store.current() {
                            let bytes = frame.as_jpeg();
                            let first = bytes[0];
                            assert!(first == 0xAA || first == 0xBB);
                            assert!(bytes.iter().all(|b| *b == first));
                            let expected = if first == 0xAA { 1024 } else { 2048 };
                            assert_eq!(bytes.len(), expected);
                        }
                    }
                })
            })
            .collect();

        std::thread::sleep(Duration::from_millis(200));
        stop.store(true, Ordering::Relaxed);
        writer.join().expect("writer");
        for reader in readers {
            reader.join().expect("reader");
        }
    }
}
