//! intruder-cam library crate.
//!
//! Single-shot security capture: find a working camera, take one frame,
//! store it under a per-day directory and annotate it.

pub mod annotate;
pub mod camera;
pub mod cli;
pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod storage;
