//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::camera::DEFAULT_SCAN_RANGE;

/// Capture a still from the first working camera when a security event fires
#[derive(Parser, Debug)]
#[command(name = "intruder-cam")]
#[command(version, about = "Single-shot security camera capture", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Probe camera indices and print the ones that deliver frames
    #[arg(long)]
    pub test: bool,

    /// Number of indices probed by --test, starting at 0
    #[arg(long, default_value_t = DEFAULT_SCAN_RANGE)]
    pub scan_range: u32,

    /// First camera index to try (overrides the config file)
    #[arg(long)]
    pub camera: Option<u32>,

    /// Reason recorded in the capture metadata
    #[arg(long, default_value = "login_attempt")]
    pub reason: String,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
