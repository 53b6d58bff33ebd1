//! Status events published to the presentation boundary
//!
//! The core emits these instead of doing any rendering itself. A consumer
//! wanting the live frame for display polls `FrameSlot::snapshot`
//! separately, so the event channel never turns into a frame queue.

/// Status transitions observable by whatever front-end is attached
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Capture session started; frames are being pulled
    CaptureStarted,
    /// Capture session stopped; the device has been released
    CaptureStopped,
    /// An analysis request was accepted and is running
    Analyzing,
    /// Analysis finished and its record was persisted
    AnalysisCompleted { text: String },
    /// The recognizer found nothing; no record was persisted
    NoTextFound,
    /// Analysis was abandoned; nothing was persisted
    AnalysisFailed { message: String },
    /// The session is closed for good
    ShutDown,
}
