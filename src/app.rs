//! Application Coordinator
//!
//! Wires the session state machine, the capture loop, and the inspection
//! controller together and relays status events to whatever front-end is
//! attached.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

use crate::capture::frame::Frame;
use crate::capture::slot::FrameSlot;
use crate::capture::{CaptureLoop, DeviceError, FrameSource};
use crate::config::AppConfig;
use crate::inspection::{AnalysisError, InspectionController};
use crate::session::{Session, SessionError, SessionState};
use crate::shared::StatusEvent;
use crate::storage::ResultSink;
use crate::vision::Recognizer;

/// Builds a fresh device handle for each capture session, the way the
/// operator tool reconnects the camera on every Start.
pub type SourceFactory = Box<dyn Fn() -> Box<dyn FrameSource> + Send + Sync>;

/// Lifecycle errors surfaced by the coordinator
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Main application coordinator
pub struct InspectionApp {
    config: AppConfig,
    session: Arc<Session>,
    slot: Arc<FrameSlot>,
    controller: InspectionController,
    source_factory: SourceFactory,
    /// Held across start/stop/shutdown so session transitions and
    /// capture-loop ownership change together.
    capture: Mutex<Option<CaptureLoop>>,
    events_tx: Sender<StatusEvent>,
    events_rx: Receiver<StatusEvent>,
}

impl InspectionApp {
    pub fn new(
        config: AppConfig,
        source_factory: SourceFactory,
        recognizer: Arc<dyn Recognizer>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        let session = Arc::new(Session::new());
        let slot = Arc::new(FrameSlot::new());
        let controller = InspectionController::new(
            session.clone(),
            slot.clone(),
            recognizer,
            sink,
            config.preprocess.clone(),
            config.storage.annotated_image_path.clone(),
            events_tx.clone(),
        );

        Self {
            config,
            session,
            slot,
            controller,
            source_factory,
            capture: Mutex::new(None),
            events_tx,
            events_rx,
        }
    }

    /// Receiver for status events; the presentation layer drains this
    pub fn events(&self) -> Receiver<StatusEvent> {
        self.events_rx.clone()
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Read-only snapshot of the latest frame, for display
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.slot.snapshot()
    }

    /// Connect the device and start the capture loop
    pub fn start(&self) -> Result<(), AppError> {
        let mut capture = self.capture.lock();
        self.session.start()?;
        // A new session never serves frames captured by a previous one.
        self.slot.clear();

        let source = (self.source_factory)();
        match CaptureLoop::spawn(source, &self.config.camera, self.slot.clone()) {
            Ok(capture_loop) => {
                *capture = Some(capture_loop);
                info!("capture started");
                let _ = self.events_tx.send(StatusEvent::CaptureStarted);
                Ok(())
            }
            Err(e) => {
                // Roll the state machine back so Start can be retried.
                let _ = self.session.stop();
                Err(e.into())
            }
        }
    }

    /// Stop the capture loop and release the device. No frame is pulled
    /// after this returns. Calling it again while Idle is a no-op.
    pub fn stop(&self) -> Result<(), AppError> {
        let mut capture = self.capture.lock();
        self.session.stop()?;
        if let Some(mut capture_loop) = capture.take() {
            capture_loop.stop();
            info!("capture stopped");
            let _ = self.events_tx.send(StatusEvent::CaptureStopped);
        }
        Ok(())
    }

    /// Request analysis of the latest frame; never blocks on the pipeline
    pub fn analyze(&self) -> Result<(), AnalysisError> {
        self.controller.analyze()
    }

    /// Terminal teardown: stop capturing, let any in-flight analysis
    /// finish and persist, close the session for good.
    pub fn shutdown(&self) {
        let mut capture = self.capture.lock();
        self.session.shutdown();
        if let Some(mut capture_loop) = capture.take() {
            capture_loop.stop();
            let _ = self.events_tx.send(StatusEvent::CaptureStopped);
        }
        drop(capture);

        if self.controller.is_in_flight() {
            info!("waiting for in-flight analysis to finish");
        }
        self.controller.join_in_flight();
        info!("session shut down");
        let _ = self.events_tx.send(StatusEvent::ShutDown);
    }
}

impl Drop for InspectionApp {
    fn drop(&mut self) {
        if self.session.state() != SessionState::Stopped {
            self.shutdown();
        }
    }
}
