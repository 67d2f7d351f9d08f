//! Camera types and data structures.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use image::RgbImage;
use serde::{Deserialize, Deserializer};

/// Camera resolution hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 1280x720, the default capture request.
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(|| {
            format!(
                "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 1280x720)",
                s
            )
        })?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid width '{}' in resolution", w))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid height '{}' in resolution", h))?;
        if width == 0 || height == 0 {
            return Err("Resolution width and height must be greater than 0".to_string());
        }
        Ok(Self { width, height })
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Best-effort hints applied to a freshly opened device.
///
/// Drivers that cannot honor a hint log it and carry on; a rejected hint
/// never fails an open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHints {
    /// Requested frame size
    pub resolution: Resolution,
    /// Driver-side buffer depth; 1 keeps the next read fresh
    pub buffer_size: u32,
}

impl Default for CaptureHints {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            buffer_size: 1,
        }
    }
}

/// Channel order of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
    /// BGR format (3 bytes per pixel), as some drivers deliver it
    Bgr,
}

/// A single captured frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: FrameFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            timestamp: Instant::now(),
        }
    }

    /// Get the number of bytes per pixel (3 for RGB and BGR).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb | FrameFormat::Bgr => 3,
        }
    }

    /// True when the frame carries no usable pixels.
    pub fn is_empty(&self) -> bool {
        let expected = self.width as usize * self.height as usize * self.bytes_per_pixel();
        expected == 0 || self.data.len() < expected
    }

    /// Convert into an RGB image buffer, swapping channels for BGR input.
    ///
    /// Returns `None` for an empty frame.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.is_empty() {
            return None;
        }
        let len = self.width as usize * self.height as usize * 3;
        let mut data = self.data[..len].to_vec();
        if self.format == FrameFormat::Bgr {
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
        RgbImage::from_raw(self.width, self.height, data)
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Failed to open camera
    #[error("Failed to open camera {index}: {message}")]
    OpenFailed { index: u32, message: String },
    /// Camera permission denied by the OS
    #[error("Camera permission denied. Grant camera access to this program in the OS privacy settings")]
    PermissionDenied,
    /// Device constructed but the stream could not start
    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
    /// Device reported a failed read
    #[error("Failed to read frame: {0}")]
    ReadFailed(String),
    /// Read attempted before the stream was started
    #[error("Camera stream is not open")]
    NotOpened,
}
