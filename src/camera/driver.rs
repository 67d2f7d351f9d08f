//! Device driver seam and the scoped camera handle.
//!
//! The acquisition and capture logic only talks to [`CameraDriver`] and
//! [`CameraDevice`]. [`NokhwaDriver`] is the implementation backed by real
//! hardware; tests provide scripted ones.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use super::backend::Backend;
use super::frame_utils::{convert_to_rgb, is_permission_error};
use super::types::{CameraError, CaptureHints, Frame};

/// Opens camera devices by index.
pub trait CameraDriver {
    /// Construct a device for `index` using `backend`.
    ///
    /// A returned device is not yet streaming; call
    /// [`CameraDevice::open_stream`] before reading.
    fn open(&self, index: u32, backend: Backend) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// An exclusive-access camera device.
pub trait CameraDevice {
    /// Apply resolution and buffer-depth hints. Failure is not fatal.
    fn apply_hints(&mut self, hints: &CaptureHints) -> Result<(), CameraError>;

    /// Start streaming. An error here means the device is not usable.
    fn open_stream(&mut self) -> Result<(), CameraError>;

    /// Perform one blocking read.
    fn read(&mut self) -> Result<Frame, CameraError>;

    /// Give the device back to the OS.
    fn release(&mut self);
}

/// An opened device together with the index it was found at.
///
/// The device is released exactly once, when the handle is dropped. That
/// includes early returns and unwinding out of a panicking driver call.
pub struct CameraHandle {
    device: Box<dyn CameraDevice>,
    index: u32,
}

impl CameraHandle {
    pub fn new(device: Box<dyn CameraDevice>, index: u32) -> Self {
        Self { device, index }
    }

    /// Device index this handle was opened at.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn apply_hints(&mut self, hints: &CaptureHints) -> Result<(), CameraError> {
        self.device.apply_hints(hints)
    }

    pub fn open_stream(&mut self) -> Result<(), CameraError> {
        self.device.open_stream()
    }

    pub fn read(&mut self) -> Result<Frame, CameraError> {
        self.device.read()
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.device.release();
        log::debug!("Released camera {}", self.index);
    }
}

/// Driver backed by nokhwa's native capture backends.
#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaDriver;

impl CameraDriver for NokhwaDriver {
    fn open(&self, index: u32, backend: Backend) -> Result<Box<dyn CameraDevice>, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
        let camera = Camera::with_backend(CameraIndex::Index(index), requested, backend.into())
            .map_err(|e| {
                let message = e.to_string();
                if is_permission_error(&message) {
                    CameraError::PermissionDenied
                } else {
                    CameraError::OpenFailed { index, message }
                }
            })?;

        Ok(Box::new(NokhwaDevice {
            camera: Some(camera),
        }))
    }
}

/// One nokhwa camera. `None` once released.
struct NokhwaDevice {
    camera: Option<Camera>,
}

impl NokhwaDevice {
    fn camera(&mut self) -> Result<&mut Camera, CameraError> {
        self.camera.as_mut().ok_or(CameraError::NotOpened)
    }
}

impl CameraDevice for NokhwaDevice {
    fn apply_hints(&mut self, hints: &CaptureHints) -> Result<(), CameraError> {
        let camera = self.camera()?;
        if hints.buffer_size != 1 {
            // nokhwa has no buffer-depth control; its backends already hand
            // out the most recent frame.
            log::debug!(
                "Buffer size hint {} not supported by this backend",
                hints.buffer_size
            );
        }
        let res = nokhwa::utils::Resolution::new(hints.resolution.width, hints.resolution.height);
        camera
            .set_resolution(res)
            .map_err(|e| CameraError::StreamFailed(e.to_string()))
    }

    fn open_stream(&mut self) -> Result<(), CameraError> {
        let camera = self.camera()?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;
        if camera.is_stream_open() {
            Ok(())
        } else {
            Err(CameraError::StreamFailed(
                "stream reported closed after open".to_string(),
            ))
        }
    }

    fn read(&mut self) -> Result<Frame, CameraError> {
        let camera = self.camera()?;
        if !camera.is_stream_open() {
            return Err(CameraError::NotOpened);
        }
        let buffer = camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        convert_to_rgb(&buffer)
            .ok_or_else(|| CameraError::ReadFailed("could not decode frame".to_string()))
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if camera.is_stream_open() {
                if let Err(e) = camera.stop_stream() {
                    log::warn!("Failed to stop camera stream: {}", e);
                }
            }
        }
    }
}
