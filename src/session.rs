//! Capture session lifecycle state machine

use parking_lot::Mutex;
use thiserror::Error;

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture running; analysis unavailable
    Idle,
    /// Capture loop active; analysis may be requested
    Capturing,
    /// Terminal state, reached only via shutdown
    Stopped,
}

/// Invalid session transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("capture is already running")]
    AlreadyRunning,
    #[error("session has been shut down")]
    SessionClosed,
}

/// Thread-safe session state machine.
///
/// Frame pulls happen only while `Capturing`; no transition out of
/// `Stopped` is ever allowed.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Idle -> Capturing
    pub fn start(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Idle => {
                *state = SessionState::Capturing;
                Ok(())
            }
            SessionState::Capturing => Err(SessionError::AlreadyRunning),
            SessionState::Stopped => Err(SessionError::SessionClosed),
        }
    }

    /// Capturing -> Idle; no-op when already Idle
    pub fn stop(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Idle | SessionState::Capturing => {
                *state = SessionState::Idle;
                Ok(())
            }
            SessionState::Stopped => Err(SessionError::SessionClosed),
        }
    }

    /// Any -> Stopped. Terminal and idempotent.
    pub fn shutdown(&self) {
        *self.state.lock() = SessionState::Stopped;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
