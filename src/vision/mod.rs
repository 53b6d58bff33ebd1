//! Vision/OCR Layer
//!
//! Conditions frames for recognition and defines the OCR engine boundary.
//! The engine itself is an external collaborator: it arrives preconfigured
//! behind the `Recognizer` trait and this layer only hands it conditioned
//! frames and consumes its ordered text hits.

pub mod annotate;
pub mod echo;
pub mod preprocess;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::frame::Frame;

pub use echo::EchoRecognizer;
pub use preprocess::preprocess;

/// Engine-level recognition failure
#[derive(Debug, Error)]
#[error("recognition failed: {0}")]
pub struct RecognitionError(pub String);

/// One recognized text region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionHit {
    /// Bounding quadrilateral in pixel coordinates
    pub region: [(f32, f32); 4],
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl RecognitionHit {
    /// Axis-aligned bounds of the region as (x, y, width, height)
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        let min_x = self.region.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let min_y = self.region.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_x = self
            .region
            .iter()
            .map(|p| p.0)
            .fold(f32::NEG_INFINITY, f32::max);
        let max_y = self
            .region
            .iter()
            .map(|p| p.1)
            .fold(f32::NEG_INFINITY, f32::max);

        (
            min_x.max(0.0) as u32,
            min_y.max(0.0) as u32,
            (max_x - min_x).max(0.0) as u32,
            (max_y - min_y).max(0.0) as u32,
        )
    }
}

/// OCR engine boundary. No language or model selection logic lives here;
/// implementations arrive fully configured.
pub trait Recognizer: Send + Sync {
    /// Run recognition over a conditioned frame, returning hits in
    /// reading order.
    fn recognize(&self, frame: &Frame) -> Result<Vec<RecognitionHit>, RecognitionError>;
}
