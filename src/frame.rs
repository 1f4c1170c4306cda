//! Frame values and the capture hand-off cell.
//!
//! The capture loop runs on its own thread so the preview and scan timing
//! never block on a slow frame grab. It hands frames to consumers through
//! `LatestFrame`, a single-slot last-write-wins cell: stale frames are
//! overwritten, never queued.

use std::sync::{Mutex, PoisonError};

/// One captured frame: packed RGB, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 3);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Mutex-guarded single-slot frame cell.
///
/// `publish` overwrites whatever is in the slot; `snapshot` clones the most
/// recent frame. Consumers that read slower than the producer writes simply
/// miss intermediate frames. This is deliberately not a bounded channel.
#[derive(Debug, Default)]
pub struct LatestFrame {
    slot: Mutex<Option<Frame>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents with `frame`.
    pub fn publish(&self, frame: Frame) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(frame);
    }

    /// Clone out the most recently published frame, if any.
    pub fn snapshot(&self) -> Option<Frame> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }
}
