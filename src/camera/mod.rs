//! Camera access for single-shot captures.
//!
//! This module provides:
//! - Device acquisition with index fallback via [`DeviceAcquirer`]
//! - One-frame capture via [`CaptureSession`]
//! - A diagnostic probe via [`scan`]
//! - The driver seam ([`CameraDriver`], [`CameraDevice`]) and its nokhwa
//!   implementation [`NokhwaDriver`]

mod acquire;
mod backend;
mod driver;
mod frame_utils;
mod scan;
mod session;
mod types;

pub use acquire::DeviceAcquirer;
pub use backend::{select_backend, Backend};
pub use driver::{CameraDevice, CameraDriver, CameraHandle, NokhwaDriver};
pub use scan::{scan, DEFAULT_SCAN_RANGE};
pub use session::{CaptureSession, SessionError};
pub use types::{CameraError, CaptureHints, Frame, FrameFormat, Resolution};
