//! Frame data structures for captured camera content

use chrono::{DateTime, Utc};

/// A frame pulled from the capture device
///
/// Pixel data is interleaved, 8 bits per channel, BGR(A) channel order for
/// color formats. Frames are never mutated after capture; the capture loop
/// publishes each one behind an `Arc` and analysis only ever sees snapshots.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw interleaved pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Channels per pixel (1 = mono, 3 = BGR)
    pub channels: u8,
    /// Timestamp when the frame was captured
    pub timestamp: DateTime<Utc>,
}

impl Frame {
    /// Create a new frame stamped with the current time
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "pixel buffer does not match dimensions"
        );
        Self {
            data,
            width,
            height,
            channels,
            timestamp: Utc::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
