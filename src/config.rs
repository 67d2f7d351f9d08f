//! Configuration file handling for intruder-cam.
//!
//! Loads configuration from the platform config directory
//! (`~/.config/intruder-cam/config.toml` on Linux) or a custom path.
//! The resulting [`Config`] is built once at startup and handed to each
//! component; nothing reads settings from global state.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{CaptureHints, Resolution};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// First device index to probe
    pub camera_index: u32,
    /// How many consecutive indices to probe
    pub max_camera_try: u32,
    /// Requested capture size, "WIDTHxHEIGHT"
    pub resolution: Resolution,
    /// Driver buffer depth hint
    pub buffer_size: u32,
    /// Seconds to wait between open and read
    pub warmup_time: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            max_camera_try: 3,
            resolution: Resolution::default(),
            buffer_size: 1,
            warmup_time: 0.5,
        }
    }
}

impl CameraConfig {
    pub fn hints(&self) -> CaptureHints {
        CaptureHints {
            resolution: self.resolution,
            buffer_size: self.buffer_size,
        }
    }

    /// Warm-up as a `Duration`. Call after [`Config::validate`].
    pub fn warmup(&self) -> Duration {
        Duration::try_from_secs_f64(self.warmup_time).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the date-partitioned capture store
    pub capture_dir: PathBuf,
    /// JPEG quality, 0-100
    pub image_quality: u8,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capture_dir: PathBuf::from("Captures"),
            image_quality: 85,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("camera_log.txt"),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// out-of-range values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::from_toml(&content).map_err(|e| match e {
                ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.image_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "image_quality must be between 0 and 100, got {}",
                self.storage.image_quality
            )));
        }
        if self.camera.max_camera_try == 0 {
            return Err(ConfigError::Invalid(
                "max_camera_try must be at least 1".to_string(),
            ));
        }
        let warmup = self.camera.warmup_time;
        if !warmup.is_finite() || warmup < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "warmup_time must be a non-negative number of seconds, got {}",
                warmup
            )));
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("intruder-cam").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/intruder-cam/config.toml")
        })
}

/// Contents written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# intruder-cam configuration

[camera]
# First camera index to try
camera_index = 0
# Number of consecutive indices to try
max_camera_try = 3
# Requested capture resolution
resolution = "1280x720"
# Driver buffer depth (1 avoids stale frames)
buffer_size = 1
# Seconds to let exposure settle before the read
warmup_time = 0.5

[storage]
# Captures land in <capture_dir>/<YYYY-MM-DD>/
capture_dir = "Captures"
# JPEG quality (0-100)
image_quality = 85

[logging]
file = "camera_log.txt"
level = "info"
"#;
