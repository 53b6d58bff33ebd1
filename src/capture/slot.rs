//! Latest-frame handoff between the capture loop and analysis

use parking_lot::RwLock;
use std::sync::Arc;

use crate::capture::frame::Frame;

/// Single-slot cell holding the most recent captured frame.
///
/// The capture loop is the only writer; analysis takes read-only snapshots.
/// Frames live behind an `Arc` and the slot only ever replaces the whole
/// `Arc`, so a snapshot can never observe a torn or half-written frame.
/// Older frames are discarded, never queued: freshest data wins.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: RwLock<Option<Arc<Frame>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new frame, discarding the previous one
    pub fn publish(&self, frame: Frame) {
        *self.latest.write() = Some(Arc::new(frame));
    }

    /// Take a read-only snapshot of the latest frame, if any
    pub fn snapshot(&self) -> Option<Arc<Frame>> {
        self.latest.read().clone()
    }

    /// Drop whatever frame is currently held
    pub fn clear(&self) {
        *self.latest.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seed: u8) -> Frame {
        Frame::new(vec![seed; 4 * 4 * 3], 4, 4, 3)
    }

    #[test]
    fn test_empty_slot_has_no_snapshot() {
        let slot = FrameSlot::new();
        assert!(slot.snapshot().is_none());
    }

    #[test]
    fn test_publish_overwrites() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.publish(frame(2));
        let snap = slot.snapshot().unwrap();
        assert_eq!(snap.data[0], 2);
    }

    #[test]
    fn test_snapshot_survives_later_publishes() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        let snap = slot.snapshot().unwrap();
        slot.publish(frame(9));
        // The earlier snapshot still sees the frame it took.
        assert_eq!(snap.data[0], 1);
        assert_eq!(slot.snapshot().unwrap().data[0], 9);
    }

    #[test]
    fn test_clear_empties_slot() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.clear();
        assert!(slot.snapshot().is_none());
    }
}
