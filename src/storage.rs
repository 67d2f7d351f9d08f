//! Date-partitioned capture store.
//!
//! Layout: `<root>/<YYYY-MM-DD>/intruder_<YYYYMMDD_HHMMSS>.jpg`, with the
//! sidecar metadata next to it under the same stem. Day directories are
//! created on first use and never removed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::camera::Frame;

/// Filename prefix for captured images.
pub const IMAGE_PREFIX: &str = "intruder_";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create capture directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Frame is empty, nothing to write")]
    EmptyFrame,
    #[error("Failed to write image '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode image '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Root of the capture store.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for the calendar day of `at`, created if missing.
    pub fn day_dir(&self, at: &DateTime<Local>) -> Result<PathBuf, StorageError> {
        let path = self.root.join(at.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&path).map_err(|source| StorageError::CreateDir {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Image path inside `dir` for a capture taken at `at`.
pub fn image_path(dir: &Path, at: &DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}{}.jpg",
        IMAGE_PREFIX,
        at.format("%Y%m%d_%H%M%S")
    ))
}

/// Sidecar metadata path for an image: same stem, `.json` extension.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("json")
}

/// Encode `frame` as JPEG at `quality` and write it to `path`.
pub fn write_jpeg(frame: &Frame, path: &Path, quality: u8) -> Result<(), StorageError> {
    let image = frame.to_rgb_image().ok_or(StorageError::EmptyFrame)?;
    write_rgb_jpeg(&image, path, quality)
}

/// Encode an RGB image as JPEG. Quality is clamped to 1-100; the encoder
/// has no quality 0.
pub fn write_rgb_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), StorageError> {
    let file = File::create(path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|source| StorageError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}
