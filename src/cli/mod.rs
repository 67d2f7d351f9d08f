//! Command-line interface definitions and helpers.
//!
//! This module contains CLI argument parsing and the handlers behind each mode.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction};
pub use commands::{default_metadata, handle_config_action, run_capture, run_scan};
