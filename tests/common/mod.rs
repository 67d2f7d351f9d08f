//! Scripted camera driver for integration tests.
//!
//! Each index is given a [`Behavior`]; indices without one fail to open.
//! Every open, read and release is recorded in shared [`Counters`].

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use intruder_cam::camera::{
    Backend, CameraDevice, CameraDriver, CameraError, CaptureHints, Frame, FrameFormat,
};
use intruder_cam::config::Config;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// `open` returns an error, no device is created
    FailOpen,
    /// device is created but its stream never starts
    NotReady,
    /// stream starts, reads report failure
    ReadFails,
    /// stream starts, reads return a zero-sized frame
    EmptyFrame,
    /// stream starts, the read panics
    PanicOnRead,
    /// delivers frames of this size
    Working { width: u32, height: u32 },
}

#[derive(Debug, Default)]
pub struct Counters {
    /// every index passed to `open`, in call order
    pub open_calls: Vec<u32>,
    /// indices for which a device was actually created
    pub devices: Vec<u32>,
    pub releases: Vec<u32>,
    pub reads: u32,
    pub hints: Vec<CaptureHints>,
    pub backends: Vec<Backend>,
}

#[derive(Clone, Default)]
pub struct MockDriver {
    behaviors: HashMap<u32, Behavior>,
    pub counters: Rc<RefCell<Counters>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, index: u32, behavior: Behavior) -> Self {
        self.behaviors.insert(index, behavior);
        self
    }

    pub fn open_calls(&self) -> Vec<u32> {
        self.counters.borrow().open_calls.clone()
    }

    pub fn releases(&self) -> Vec<u32> {
        self.counters.borrow().releases.clone()
    }

    pub fn devices(&self) -> Vec<u32> {
        self.counters.borrow().devices.clone()
    }

    pub fn reads(&self) -> u32 {
        self.counters.borrow().reads
    }
}

impl CameraDriver for MockDriver {
    fn open(&self, index: u32, backend: Backend) -> Result<Box<dyn CameraDevice>, CameraError> {
        let behavior = self
            .behaviors
            .get(&index)
            .copied()
            .unwrap_or(Behavior::FailOpen);
        {
            let mut c = self.counters.borrow_mut();
            c.open_calls.push(index);
            c.backends.push(backend);
        }
        if let Behavior::FailOpen = behavior {
            return Err(CameraError::OpenFailed {
                index,
                message: "no such device".to_string(),
            });
        }
        self.counters.borrow_mut().devices.push(index);
        Ok(Box::new(MockDevice {
            index,
            behavior,
            streaming: false,
            released: false,
            counters: Rc::clone(&self.counters),
        }))
    }
}

struct MockDevice {
    index: u32,
    behavior: Behavior,
    streaming: bool,
    released: bool,
    counters: Rc<RefCell<Counters>>,
}

impl CameraDevice for MockDevice {
    fn apply_hints(&mut self, hints: &CaptureHints) -> Result<(), CameraError> {
        self.counters.borrow_mut().hints.push(*hints);
        // hints are advisory; pretend some devices reject them
        if hints.buffer_size > 1 {
            return Err(CameraError::StreamFailed("buffer size".to_string()));
        }
        Ok(())
    }

    fn open_stream(&mut self) -> Result<(), CameraError> {
        match self.behavior {
            Behavior::NotReady => Err(CameraError::StreamFailed("not ready".to_string())),
            _ => {
                self.streaming = true;
                Ok(())
            }
        }
    }

    fn read(&mut self) -> Result<Frame, CameraError> {
        assert!(self.streaming, "read before open_stream");
        self.counters.borrow_mut().reads += 1;
        match self.behavior {
            Behavior::ReadFails => Err(CameraError::ReadFailed("timeout".to_string())),
            Behavior::EmptyFrame => Ok(Frame::new(Vec::new(), 0, 0, FrameFormat::Bgr)),
            Behavior::PanicOnRead => panic!("driver fault on camera {}", self.index),
            Behavior::Working { width, height } => Ok(test_frame(width, height)),
            Behavior::FailOpen | Behavior::NotReady => unreachable!(),
        }
    }

    fn release(&mut self) {
        assert!(!self.released, "camera {} released twice", self.index);
        self.released = true;
        self.counters.borrow_mut().releases.push(self.index);
    }
}

/// A BGR gradient frame.
pub fn test_frame(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y % 256) as u8);
            data.push(128);
        }
    }
    Frame::new(data, width, height, FrameFormat::Bgr)
}

/// Default config with no warm-up, storing under `root`.
pub fn test_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.camera.warmup_time = 0.0;
    config.storage.capture_dir = root.join("Captures");
    config
}
