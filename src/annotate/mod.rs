//! Post-capture annotation: a visible caption on the image and a JSON
//! sidecar with the same metadata.

mod font;
mod overlay;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::storage::{self, StorageError};

pub use overlay::draw_caption;

/// Human-readable timestamp format used in captions and sidecars.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Key the capture timestamp is stored under in the sidecar.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Caller-supplied key/value pairs, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of this mapping with the formatted `timestamp` entry set.
    pub fn stamped(&self, at: &DateTime<Local>) -> Metadata {
        let mut out = self.clone();
        out.insert(TIMESTAMP_KEY, at.format(TIMESTAMP_FORMAT).to_string());
        out
    }

    /// Caption lines: the timestamp first, then one `key: value` per entry.
    pub fn caption_lines(&self, at: &DateTime<Local>) -> Vec<String> {
        std::iter::once(format!("Timestamp: {}", at.format(TIMESTAMP_FORMAT)))
            .chain(self.iter().map(|(k, v)| format!("{}: {}", k, v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("Failed to open image '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to write metadata '{}': {source}", path.display())]
    Sidecar {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Adds metadata to a capture already on disk.
pub trait Annotator {
    fn annotate(
        &self,
        image: &Path,
        metadata: &Metadata,
        captured_at: &DateTime<Local>,
    ) -> Result<(), AnnotateError>;
}

/// Burns a caption into the JPEG and writes a `.json` sidecar.
#[derive(Debug, Clone, Copy)]
pub struct OverlayAnnotator {
    quality: u8,
}

impl OverlayAnnotator {
    /// `quality` is used when re-encoding the captioned image.
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Annotator for OverlayAnnotator {
    fn annotate(
        &self,
        image: &Path,
        metadata: &Metadata,
        captured_at: &DateTime<Local>,
    ) -> Result<(), AnnotateError> {
        let mut rgb = image::open(image)
            .map_err(|source| AnnotateError::Open {
                path: image.to_path_buf(),
                source,
            })?
            .to_rgb8();

        draw_caption(&mut rgb, &metadata.caption_lines(captured_at));
        storage::write_rgb_jpeg(&rgb, image, self.quality)?;

        let sidecar = storage::sidecar_path(image);
        write_sidecar(&sidecar, &metadata.stamped(captured_at))?;

        log::info!("Added metadata to image: {}", image.display());
        Ok(())
    }
}

/// Write `metadata` as a JSON object indented by four spaces.
pub fn write_sidecar(path: &Path, metadata: &Metadata) -> Result<(), AnnotateError> {
    let io_err = |source| AnnotateError::Sidecar {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    metadata.serialize(&mut ser)?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)
}
