//! Platform capture backend selection.
//!
//! Windows raises a camera permission dialog when a device is opened through
//! the generic probing path, so there the native backend is named explicitly.
//! Every other OS goes through automatic selection.

use std::fmt;

use nokhwa::utils::ApiBackend;

/// Capture API used to open a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Let the camera library pick
    Auto,
    /// Windows Media Foundation, opened directly
    MediaFoundation,
}

impl Backend {
    /// Backend for the OS this binary is running on.
    pub fn for_host() -> Self {
        select_backend(std::env::consts::OS)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Auto => write!(f, "auto"),
            Backend::MediaFoundation => write!(f, "media-foundation"),
        }
    }
}

impl From<Backend> for ApiBackend {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Auto => ApiBackend::Auto,
            Backend::MediaFoundation => ApiBackend::MediaFoundation,
        }
    }
}

/// Pick a backend for an OS name as reported by `std::env::consts::OS`.
pub fn select_backend(os: &str) -> Backend {
    match os {
        "windows" => Backend::MediaFoundation,
        _ => Backend::Auto,
    }
}
