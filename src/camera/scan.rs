//! Diagnostic probe over a fixed range of device indices.

use std::panic::{self, AssertUnwindSafe};

use super::backend::Backend;
use super::driver::{CameraDriver, CameraHandle};

/// Number of indices probed by the `--test` mode.
pub const DEFAULT_SCAN_RANGE: u32 = 5;

/// Probe every index in `0..max_index_exclusive` and return the ones that
/// open and deliver a frame, in ascending order.
///
/// Unlike acquisition this never stops early. A broken index, including a
/// driver that panics, is skipped.
pub fn scan(driver: &dyn CameraDriver, backend: Backend, max_index_exclusive: u32) -> Vec<u32> {
    (0..max_index_exclusive)
        .filter(|&index| {
            let probe = panic::catch_unwind(AssertUnwindSafe(|| probe(driver, backend, index)));
            match probe {
                Ok(working) => working,
                Err(_) => {
                    log::debug!("Camera {} probe panicked", index);
                    false
                }
            }
        })
        .collect()
}

fn probe(driver: &dyn CameraDriver, backend: Backend, index: u32) -> bool {
    let device = match driver.open(index, backend) {
        Ok(device) => device,
        Err(e) => {
            log::debug!("Camera {} did not open: {}", index, e);
            return false;
        }
    };
    let mut handle = CameraHandle::new(device, index);

    if let Err(e) = handle.open_stream() {
        log::debug!("Camera {} stream failed: {}", index, e);
        return false;
    }

    match handle.read() {
        Ok(frame) if !frame.is_empty() => {
            log::info!("Camera {} is working", index);
            true
        }
        Ok(_) => {
            log::debug!("Camera {} returned an empty frame", index);
            false
        }
        Err(e) => {
            log::debug!("Camera {} read failed: {}", index, e);
            false
        }
    }
}
