//! Handlers for the default capture run, `--test` and `config` actions.

use std::path::Path;
use std::process::ExitCode;

use super::args::ConfigAction;
use crate::annotate::{Metadata, OverlayAnnotator};
use crate::camera::{self, Backend, CameraDriver};
use crate::config::{default_path, Config, DEFAULT_CONFIG_TOML};
use crate::orchestrator::CaptureOrchestrator;

/// Metadata attached to a capture triggered from the command line.
pub fn default_metadata(reason: &str, camera_index: u32) -> Metadata {
    [
        ("source", "security_system".to_string()),
        ("reason", reason.to_string()),
        ("camera", camera_index.to_string()),
    ]
    .into_iter()
    .collect()
}

/// Run one annotated capture. Exit code 0 on success, 1 on failure.
pub fn run_capture(config: &Config, driver: &dyn CameraDriver, reason: &str) -> ExitCode {
    let annotator = OverlayAnnotator::new(config.storage.image_quality);
    let orchestrator = CaptureOrchestrator::new(config, driver, &annotator);
    let metadata = default_metadata(reason, config.camera.camera_index);

    let record = orchestrator.capture_intruder_image(Some(&metadata));
    log::info!("{}", record);
    if record.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Probe `0..range` and print the working indices. Always succeeds.
pub fn run_scan(driver: &dyn CameraDriver, range: u32) -> ExitCode {
    println!("Testing available cameras...");
    let working = camera::scan(driver, Backend::for_host(), range);
    println!("Working cameras: {:?}", working);
    ExitCode::SUCCESS
}

/// Handle config subcommand actions.
///
/// Errors carry a message for the user; the caller decides the exit code.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    path: Option<&Path>,
) -> Result<(), String> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Camera index: {}", config.camera.camera_index);
            println!("  Cameras to try: {}", config.camera.max_camera_try);
            println!("  Resolution: {}", config.camera.resolution);
            println!("  Buffer size: {}", config.camera.buffer_size);
            println!("  Warm-up: {}s", config.camera.warmup_time);
            println!("  Capture dir: {}", config.storage.capture_dir.display());
            println!("  Image quality: {}", config.storage.image_quality);
            println!("  Log file: {}", config.logging.file.display());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'intruder-cam config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
