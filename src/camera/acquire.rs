//! Device acquisition with fallback across consecutive indices.

use super::backend::Backend;
use super::driver::{CameraDriver, CameraHandle};
use super::types::CaptureHints;
use crate::config::CameraConfig;

/// Opens the first working camera in a bounded index range.
pub struct DeviceAcquirer<'a> {
    driver: &'a dyn CameraDriver,
    backend: Backend,
    hints: CaptureHints,
    start_index: u32,
    max_attempts: u32,
}

impl<'a> DeviceAcquirer<'a> {
    /// Build an acquirer from the camera section of the configuration,
    /// using the backend for the host OS.
    pub fn new(config: &CameraConfig, driver: &'a dyn CameraDriver) -> Self {
        Self {
            driver,
            backend: Backend::for_host(),
            hints: config.hints(),
            start_index: config.camera_index,
            max_attempts: config.max_camera_try,
        }
    }

    /// Override the backend. Mostly useful in tests.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Try the configured index range.
    pub fn acquire(&self) -> Option<CameraHandle> {
        self.acquire_from(self.start_index, self.max_attempts)
    }

    /// Try `start_index .. start_index + max_attempts` in order and return
    /// the first device whose stream opens.
    ///
    /// Returns `None` when every candidate failed. Each failed candidate is
    /// released before moving on, so a `None` result holds no devices.
    pub fn acquire_from(&self, start_index: u32, max_attempts: u32) -> Option<CameraHandle> {
        let attempts = max_attempts.max(1);
        let end = start_index.saturating_add(attempts);

        for index in start_index..end {
            let device = match self.driver.open(index, self.backend) {
                Ok(device) => device,
                Err(e) => {
                    log::error!("Error opening camera {}: {}", index, e);
                    continue;
                }
            };

            let mut handle = CameraHandle::new(device, index);
            if let Err(e) = handle.apply_hints(&self.hints) {
                log::debug!("Camera {} ignored capture hints: {}", index, e);
            }

            match handle.open_stream() {
                Ok(()) => {
                    log::info!(
                        "Successfully opened camera {} ({} backend)",
                        index,
                        self.backend
                    );
                    return Some(handle);
                }
                Err(e) => {
                    log::warn!("Camera {} opened but is not ready: {}", index, e);
                    // handle dropped here, releasing the device
                }
            }
        }

        log::error!(
            "Failed to open any camera after trying {} devices",
            attempts
        );
        None
    }
}
