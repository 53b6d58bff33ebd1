//! Camera Capture Layer
//!
//! Owns the device session and continuously publishes the newest frame to
//! the shared slot. The vendor SDK sits behind the `FrameSource` trait so
//! the pipeline runs unchanged against stub devices in tests.

pub mod frame;
pub mod pattern;
pub mod slot;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CameraSettings;
use frame::Frame;
use slot::FrameSlot;

/// Capture or connection failure reported by a device adapter
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device connection failed: {0}")]
    Connect(String),
    #[error("device configuration rejected: {0}")]
    Configure(String),
    #[error("frame pull failed: {0}")]
    Pull(String),
    #[error("device disconnect failed: {0}")]
    Disconnect(String),
}

/// Capture device boundary: connect, configure, pull frames, disconnect.
///
/// Configuration values are opaque passthroughs; the adapter decides what
/// the vendor SDK can honor (e.g. falling back from BGR8 to Mono8).
pub trait FrameSource: Send {
    fn connect(&mut self) -> Result<(), DeviceError>;
    fn configure(&mut self, settings: &CameraSettings) -> Result<(), DeviceError>;
    fn pull(&mut self) -> Result<Frame, DeviceError>;
    fn disconnect(&mut self) -> Result<(), DeviceError>;
}

/// Background worker that pulls frames on a fixed period and publishes
/// them to the shared slot.
///
/// Pull failures are transient: they are logged, the previous frame stays
/// in the slot, and polling continues. The device is connected before the
/// worker starts and disconnected exactly once when it exits.
pub struct CaptureLoop {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureLoop {
    /// Connect and configure the source, then start pulling in a
    /// background thread. Connection and configuration errors surface to
    /// the caller; the device is released again if configuration fails.
    pub fn spawn(
        mut source: Box<dyn FrameSource>,
        settings: &CameraSettings,
        slot: Arc<FrameSlot>,
    ) -> Result<Self, DeviceError> {
        source.connect()?;
        if let Err(e) = source.configure(settings) {
            if let Err(e) = source.disconnect() {
                warn!("device disconnect failed: {e}");
            }
            return Err(e);
        }

        let period = Duration::from_millis(settings.poll_interval_ms.max(1));
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = std::thread::spawn(move || {
            info!("capture loop started, period {:?}", period);
            loop {
                match source.pull() {
                    Ok(frame) => slot.publish(frame),
                    // Transient: keep the previous frame, keep polling.
                    Err(e) => warn!("frame pull failed: {e}"),
                }
                // Parking on the stop channel instead of sleeping lets
                // stop() interrupt the wait mid-period.
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            if let Err(e) = source.disconnect() {
                warn!("device disconnect failed: {e}");
            }
            info!("capture loop stopped");
        });

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop pulling and release the device. Interrupts the worker even
    /// mid-period and blocks until it has exited, so no pull can happen
    /// after this returns. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.stop_tx.try_send(());
            if handle.join().is_err() {
                warn!("capture worker panicked");
            }
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
