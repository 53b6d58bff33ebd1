//! On-demand inspection orchestration
//!
//! Runs snapshot -> preprocess -> recognize -> persist off the capture
//! path. At most one analysis is ever in flight; further requests are
//! rejected rather than queued, matching single-operator
//! Start/Inspect/Stop usage. A queued request would also end up analyzing
//! a staler frame than the operator asked for.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capture::frame::Frame;
use crate::capture::slot::FrameSlot;
use crate::config::PreprocessSettings;
use crate::session::{Session, SessionState};
use crate::shared::StatusEvent;
use crate::storage::{PersistenceError, RecognitionRecord, ResultSink};
use crate::vision::{annotate, preprocess, RecognitionError, Recognizer};

/// Why an analysis request was not accepted, or why a running analysis
/// was abandoned
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no frame captured yet")]
    NoFrameAvailable,
    #[error("an analysis is already in flight")]
    AnalysisInProgress,
    #[error("session has been shut down")]
    SessionClosed,
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Releases the in-flight flag when the analysis worker finishes,
/// including on panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates one analysis request at a time without blocking capture.
pub struct InspectionController {
    session: Arc<Session>,
    slot: Arc<FrameSlot>,
    recognizer: Arc<dyn Recognizer>,
    sink: Arc<dyn ResultSink>,
    preprocess: PreprocessSettings,
    artifact_path: Option<PathBuf>,
    events: Sender<StatusEvent>,
    in_flight: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl InspectionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Arc<Session>,
        slot: Arc<FrameSlot>,
        recognizer: Arc<dyn Recognizer>,
        sink: Arc<dyn ResultSink>,
        preprocess: PreprocessSettings,
        artifact_path: Option<PathBuf>,
        events: Sender<StatusEvent>,
    ) -> Self {
        Self {
            session,
            slot,
            recognizer,
            sink,
            preprocess,
            artifact_path,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Request one analysis of the latest frame.
    ///
    /// Returns as soon as the worker is scheduled; completion, empty
    /// results, and stage failures are all reported as `StatusEvent`s.
    pub fn analyze(&self) -> Result<(), AnalysisError> {
        // Hold the worker slot from the state check through the spawn so a
        // handle stored here is never missed by a concurrent
        // `join_in_flight`: either the request sees Stopped and is
        // rejected, or the join waits for the slot and finds the handle.
        let mut worker = self.worker.lock();

        match self.session.state() {
            SessionState::Stopped => return Err(AnalysisError::SessionClosed),
            SessionState::Idle => return Err(AnalysisError::NoFrameAvailable),
            SessionState::Capturing => {}
        }
        let frame = self
            .slot
            .snapshot()
            .ok_or(AnalysisError::NoFrameAvailable)?;

        // Claim the in-flight slot only once the preconditions hold, so a
        // rejected request leaves the flag untouched.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AnalysisError::AnalysisInProgress);
        }
        let guard = InFlightGuard(self.in_flight.clone());

        let recognizer = self.recognizer.clone();
        let sink = self.sink.clone();
        let settings = self.preprocess.clone();
        let artifact_path = self.artifact_path.clone();
        let events = self.events.clone();

        let _ = events.send(StatusEvent::Analyzing);

        let handle = std::thread::spawn(move || {
            let _guard = guard;
            let started = Instant::now();
            let outcome = run_analysis(
                &frame,
                &settings,
                recognizer.as_ref(),
                sink.as_ref(),
                artifact_path.as_deref(),
            );
            match outcome {
                Ok(Some(record)) => {
                    debug!(
                        "analysis complete in {:?}: {} hits",
                        started.elapsed(),
                        record.hits.len()
                    );
                    let _ = events.send(StatusEvent::AnalysisCompleted {
                        text: record.full_text,
                    });
                }
                Ok(None) => {
                    debug!("analysis complete in {:?}: no text", started.elapsed());
                    let _ = events.send(StatusEvent::NoTextFound);
                }
                Err(e) => {
                    warn!("analysis abandoned: {e}");
                    let _ = events.send(StatusEvent::AnalysisFailed {
                        message: e.to_string(),
                    });
                }
            }
        });

        // A previous handle here has already finished; dropping it just
        // detaches.
        *worker = Some(handle);

        Ok(())
    }

    /// Whether an analysis worker is currently running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Wait for any in-flight analysis to finish. It is allowed to
    /// complete and persist; new requests are gated by the session state.
    pub fn join_in_flight(&self) {
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                warn!("analysis worker panicked");
            }
        }
    }
}

/// Pipeline stages for one snapshot. `Ok(None)` means the recognizer found
/// nothing, so nothing was persisted.
fn run_analysis(
    frame: &Frame,
    settings: &PreprocessSettings,
    recognizer: &dyn Recognizer,
    sink: &dyn ResultSink,
    artifact_path: Option<&Path>,
) -> Result<Option<RecognitionRecord>, AnalysisError> {
    let (width, height) = frame.dimensions();
    debug!("conditioning {width}x{height} snapshot");
    let conditioned = preprocess(frame, settings);
    let hits = recognizer.recognize(&conditioned)?;
    if hits.is_empty() {
        return Ok(None);
    }

    let mut record = RecognitionRecord::from_hits(hits);
    if let Some(path) = artifact_path {
        // Operator-review artifact only; never fails the analysis.
        match annotate::write_annotated(frame, &record.hits, path) {
            Ok(()) => record.artifact_path = Some(path.to_path_buf()),
            Err(e) => warn!("failed to write annotated image: {e}"),
        }
    }
    sink.persist(&record)?;

    Ok(Some(record))
}
