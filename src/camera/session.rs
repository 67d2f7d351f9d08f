//! Single-frame capture on an already opened device.

use std::thread;
use std::time::Duration;

use super::driver::CameraHandle;
use super::types::{CameraError, Frame};

/// Why a session produced no frame.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("camera {index} read failed: {source}")]
    ReadFailed {
        index: u32,
        #[source]
        source: CameraError,
    },
    #[error("camera {index} returned an empty frame")]
    EmptyFrame { index: u32 },
}

/// Warm up, read exactly one frame, validate it.
///
/// The session borrows the handle; releasing it is the caller's scope's job.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSession {
    warmup: Duration,
}

impl CaptureSession {
    pub fn new(warmup: Duration) -> Self {
        Self { warmup }
    }

    pub fn warmup(&self) -> Duration {
        self.warmup
    }

    /// Capture one frame.
    ///
    /// Sleeps for the warm-up interval first so auto-exposure can settle;
    /// consumer webcams often return a black frame on the very first read.
    /// There is no retry.
    pub fn capture_one(&self, handle: &mut CameraHandle) -> Result<Frame, SessionError> {
        if !self.warmup.is_zero() {
            thread::sleep(self.warmup);
        }

        let index = handle.index();
        let frame = handle
            .read()
            .map_err(|source| SessionError::ReadFailed { index, source })?;

        if frame.is_empty() {
            return Err(SessionError::EmptyFrame { index });
        }

        log::debug!(
            "Camera {} captured {}x{} frame",
            index,
            frame.width,
            frame.height
        );
        Ok(frame)
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
