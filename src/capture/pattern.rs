//! Synthetic frame source for demos and tests
//!
//! Stands in for a vendor camera adapter when no hardware is attached.

use tracing::debug;

use super::{DeviceError, FrameSource};
use crate::capture::frame::Frame;
use crate::config::CameraSettings;

/// Frame source that synthesizes a moving gradient pattern.
///
/// The label names what is nominally printed on the inspected object; it
/// seeds the gradient so different labels produce different scenes, and a
/// stubbed recognizer downstream reports it verbatim.
pub struct PatternSource {
    width: u32,
    height: u32,
    seed: u64,
    channels: u8,
    connected: bool,
    frames_pulled: u64,
}

impl PatternSource {
    pub fn new(width: u32, height: u32, label: impl AsRef<str>) -> Self {
        let seed = label.as_ref().bytes().map(u64::from).sum();
        Self {
            width,
            height,
            seed,
            channels: 3,
            connected: false,
            frames_pulled: 0,
        }
    }
}

impl FrameSource for PatternSource {
    fn connect(&mut self) -> Result<(), DeviceError> {
        if self.connected {
            return Err(DeviceError::Connect("device already connected".into()));
        }
        self.connected = true;
        self.frames_pulled = 0;
        Ok(())
    }

    fn configure(&mut self, settings: &CameraSettings) -> Result<(), DeviceError> {
        if !self.connected {
            return Err(DeviceError::Configure("device not connected".into()));
        }
        // Honor a mono format request; everything else renders as BGR.
        self.channels = if settings.pixel_format.starts_with("Mono") {
            1
        } else {
            3
        };
        debug!(
            "pattern source configured: {} channels, {} fps nominal",
            self.channels, settings.frame_rate
        );
        Ok(())
    }

    fn pull(&mut self) -> Result<Frame, DeviceError> {
        if !self.connected {
            return Err(DeviceError::Pull("device not connected".into()));
        }

        let (w, h, c) = (
            self.width as usize,
            self.height as usize,
            self.channels as usize,
        );
        let phase = self.frames_pulled.wrapping_add(self.seed);
        let mut data = vec![0u8; w * h * c];
        for y in 0..h {
            for x in 0..w {
                let value = ((x + y) as u64).wrapping_add(phase) as u8;
                let base = (y * w + x) * c;
                for ch in 0..c {
                    data[base + ch] = value;
                }
            }
        }
        self.frames_pulled += 1;

        Ok(Frame::new(data, self.width, self.height, self.channels))
    }

    fn disconnect(&mut self) -> Result<(), DeviceError> {
        if !self.connected {
            return Err(DeviceError::Disconnect("device not connected".into()));
        }
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_requires_connect() {
        let mut source = PatternSource::new(8, 8, "X");
        assert!(source.pull().is_err());
        source.connect().unwrap();
        let frame = source.pull().unwrap();
        assert_eq!(frame.dimensions(), (8, 8));
        assert_eq!(frame.channels, 3);
    }

    #[test]
    fn test_connect_disconnect_lifecycle() {
        let mut source = PatternSource::new(8, 8, "X");
        assert!(source.disconnect().is_err());
        source.connect().unwrap();
        assert!(source.connect().is_err());
        source.disconnect().unwrap();
        // Fresh session after a disconnect.
        source.connect().unwrap();
    }

    #[test]
    fn test_mono_format_yields_single_channel() {
        let mut source = PatternSource::new(8, 8, "X");
        source.connect().unwrap();
        let settings = CameraSettings {
            pixel_format: "Mono8".to_string(),
            ..Default::default()
        };
        source.configure(&settings).unwrap();
        let frame = source.pull().unwrap();
        assert_eq!(frame.channels, 1);
        assert_eq!(frame.data.len(), 8 * 8);
    }

    #[test]
    fn test_pattern_advances_between_pulls() {
        let mut source = PatternSource::new(8, 8, "X");
        source.connect().unwrap();
        let first = source.pull().unwrap();
        let second = source.pull().unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_label_seeds_the_scene() {
        let mut a = PatternSource::new(8, 8, "LOT-1");
        let mut b = PatternSource::new(8, 8, "LOT-2");
        a.connect().unwrap();
        b.connect().unwrap();
        assert_ne!(a.pull().unwrap().data, b.pull().unwrap().data);
    }
}
