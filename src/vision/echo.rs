//! Fixed-answer recognizer for demos and tests
//!
//! Stands in for a real OCR engine when exercising the pipeline without
//! models attached.

use super::{RecognitionError, RecognitionHit, Recognizer};
use crate::capture::frame::Frame;

/// Recognizer that always reports the same single hit spanning the frame.
/// An empty text configures an engine that never finds anything.
pub struct EchoRecognizer {
    text: String,
    confidence: f32,
}

impl EchoRecognizer {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

impl Recognizer for EchoRecognizer {
    fn recognize(&self, frame: &Frame) -> Result<Vec<RecognitionHit>, RecognitionError> {
        if self.text.is_empty() {
            return Ok(Vec::new());
        }
        let w = frame.width as f32;
        let h = frame.height as f32;
        Ok(vec![RecognitionHit {
            region: [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)],
            text: self.text.clone(),
            confidence: self.confidence,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_reports_configured_text() {
        let frame = Frame::new(vec![0; 4 * 4 * 3], 4, 4, 3);
        let hits = EchoRecognizer::new("LOT-4821", 0.97)
            .recognize(&frame)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "LOT-4821");
        assert!((hits[0].confidence - 0.97).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_text_reports_nothing() {
        let frame = Frame::new(vec![0; 4 * 4 * 3], 4, 4, 3);
        let hits = EchoRecognizer::new("", 0.0).recognize(&frame).unwrap();
        assert!(hits.is_empty());
    }
}
