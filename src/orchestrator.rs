//! End-to-end "capture one security image" operation.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::annotate::{Annotator, Metadata};
use crate::camera::{
    Backend, CameraDriver, CameraHandle, CaptureSession, DeviceAcquirer, SessionError,
};
use crate::config::{CameraConfig, Config};
use crate::storage::{self, CaptureStore, StorageError};

/// Sentinel reported in place of a device index when none opened.
pub const NO_DEVICE: i64 = -1;

/// What happened to the annotation step of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStatus {
    /// No metadata supplied, or the capture never got that far
    NotRequested,
    /// Caption and sidecar written
    Annotated,
    /// Raw image saved but annotation failed
    RawOnly,
}

/// Result of one orchestrated capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub success: bool,
    pub path: Option<PathBuf>,
    /// Index of the device that was opened, if any
    pub device_index: Option<u32>,
    pub annotation: AnnotationStatus,
}

impl CaptureRecord {
    fn failed(device_index: Option<u32>) -> Self {
        Self {
            success: false,
            path: None,
            device_index,
            annotation: AnnotationStatus::NotRequested,
        }
    }

    /// Device index, or -1 when no device was opened.
    pub fn index_or_sentinel(&self) -> i64 {
        self.device_index.map_or(NO_DEVICE, i64::from)
    }
}

impl fmt::Display for CaptureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.success) {
            (Some(path), true) => write!(
                f,
                "captured {} with camera {}",
                path.display(),
                self.index_or_sentinel()
            ),
            _ => write!(f, "capture failed (camera {})", self.index_or_sentinel()),
        }
    }
}

/// Faults that abort a capture after a device was found.
#[derive(Debug, thiserror::Error)]
enum CaptureFault {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Composes acquisition, capture, storage and annotation.
pub struct CaptureOrchestrator<'a> {
    camera: CameraConfig,
    backend: Backend,
    store: CaptureStore,
    quality: u8,
    driver: &'a dyn CameraDriver,
    annotator: &'a dyn Annotator,
}

impl<'a> CaptureOrchestrator<'a> {
    pub fn new(
        config: &Config,
        driver: &'a dyn CameraDriver,
        annotator: &'a dyn Annotator,
    ) -> Self {
        Self {
            camera: config.camera.clone(),
            backend: Backend::for_host(),
            store: CaptureStore::new(&config.storage.capture_dir),
            quality: config.storage.image_quality,
            driver,
            annotator,
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Capture one image, save it under today's directory and annotate it
    /// when `metadata` is non-empty.
    ///
    /// Never panics and never returns an error: every failure, including a
    /// panicking driver, becomes a failed record. The camera is released
    /// before this returns on every path.
    pub fn capture_intruder_image(&self, metadata: Option<&Metadata>) -> CaptureRecord {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_capture(metadata))) {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                log::error!("Error capturing image: {}", e);
                CaptureRecord::failed(None)
            }
            Err(payload) => {
                log::error!("Error capturing image: {}", panic_message(&*payload));
                CaptureRecord::failed(None)
            }
        }
    }

    fn try_capture(&self, metadata: Option<&Metadata>) -> Result<CaptureRecord, StorageError> {
        let day_dir = self.store.day_dir(&Local::now())?;

        let acquirer = DeviceAcquirer::new(&self.camera, self.driver).with_backend(self.backend);
        let Some(mut handle) = acquirer.acquire() else {
            log::error!("Failed to initialize any camera");
            return Ok(CaptureRecord::failed(None));
        };
        let index = handle.index();

        let saved = {
            let session = CaptureSession::new(self.camera.warmup());
            self.capture_and_save(&session, &mut handle, &day_dir)
        };
        // release before touching the file again
        drop(handle);

        let (path, captured_at) = match saved {
            Ok(saved) => saved,
            Err(CaptureFault::Session(e)) => {
                log::error!("Failed to capture frame: {}", e);
                return Ok(CaptureRecord::failed(Some(index)));
            }
            Err(CaptureFault::Storage(e)) => {
                log::error!("Error capturing image: {}", e);
                return Ok(CaptureRecord::failed(None));
            }
        };
        log::info!("Security image saved: {}", path.display());

        let annotation = match metadata.filter(|m| !m.is_empty()) {
            None => AnnotationStatus::NotRequested,
            Some(md) => self.annotate(&path, md, &captured_at),
        };

        Ok(CaptureRecord {
            success: true,
            path: Some(path),
            device_index: Some(index),
            annotation,
        })
    }

    /// Read one frame and write it as JPEG. The file name and the returned
    /// time are taken after the read, not when the run started.
    fn capture_and_save(
        &self,
        session: &CaptureSession,
        handle: &mut CameraHandle,
        day_dir: &Path,
    ) -> Result<(PathBuf, DateTime<Local>), CaptureFault> {
        let frame = session.capture_one(handle)?;
        let captured_at = Local::now();
        let path = storage::image_path(day_dir, &captured_at);
        storage::write_jpeg(&frame, &path, self.quality)?;
        Ok((path, captured_at))
    }

    /// Annotation faults, panics included, downgrade to `RawOnly`.
    fn annotate(
        &self,
        path: &Path,
        metadata: &Metadata,
        captured_at: &DateTime<Local>,
    ) -> AnnotationStatus {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.annotator.annotate(path, metadata, captured_at)
        }));
        match outcome {
            Ok(Ok(())) => AnnotationStatus::Annotated,
            Ok(Err(e)) => {
                log::error!("Error adding metadata to image: {}", e);
                AnnotationStatus::RawOnly
            }
            Err(payload) => {
                log::error!("Error adding metadata to image: {}", panic_message(&*payload));
                AnnotationStatus::RawOnly
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
