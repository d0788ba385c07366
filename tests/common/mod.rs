//! Scripted codec used by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use frame_encoder::{CodecSession, EncoderConfig, EncoderError, FrameCodec, Frames, Result};

pub const MAX_FRAME: usize = 64;
pub const DEFAULT_FRAME_BYTES: i32 = 4;

#[derive(Default)]
pub struct Calls {
    /// Sample count passed to every encode call, in order.
    pub encodes: Vec<usize>,
    /// First sample of every non-empty encode call.
    pub first_samples: Vec<f32>,
    pub inits: u32,
    pub closes: u32,
}

/// Answers encode calls from `script` first; once that runs dry, non-empty
/// input yields `DEFAULT_FRAME_BYTES` and empty input yields 0.
#[derive(Clone)]
pub struct MockCodec {
    pub samples_per_frame: Frames,
    pub fail_init: bool,
    pub script: Rc<RefCell<VecDeque<i32>>>,
    pub calls: Rc<RefCell<Calls>>,
}

pub struct MockSession {
    samples_per_frame: Frames,
    script: Rc<RefCell<VecDeque<i32>>>,
    calls: Rc<RefCell<Calls>>,
}

impl MockCodec {
    pub fn new(samples_per_frame: u64) -> MockCodec {
        MockCodec {
            samples_per_frame: Frames::new(samples_per_frame),
            fail_init: false,
            script: Rc::new(RefCell::new(VecDeque::new())),
            calls: Rc::new(RefCell::new(Calls::default())),
        }
    }

    pub fn script(&self, responses: &[i32]) {
        self.script.borrow_mut().extend(responses.iter().copied());
    }

    pub fn encodes(&self) -> Vec<usize> {
        self.calls.borrow().encodes.clone()
    }

    pub fn closes(&self) -> u32 {
        self.calls.borrow().closes
    }
}

impl FrameCodec for MockCodec {
    type Session = MockSession;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn session_init(&self, _config: &EncoderConfig) -> Result<MockSession> {
        if self.fail_init {
            return Err(EncoderError::init_failure("scripted failure"));
        }
        self.calls.borrow_mut().inits += 1;
        Ok(MockSession { samples_per_frame: self.samples_per_frame, script: self.script.clone(), calls: self.calls.clone() })
    }
}

impl CodecSession for MockSession {
    fn samples_per_frame(&self) -> Frames {
        self.samples_per_frame
    }

    fn max_coded_frame_size(&self) -> usize {
        MAX_FRAME
    }

    fn encode_quantum(&mut self, frame: &mut [u8], samples: &[f32]) -> i32 {
        let mut calls = self.calls.borrow_mut();
        calls.encodes.push(samples.len());
        if let Some(first) = samples.first() {
            calls.first_samples.push(*first);
        }

        let index = calls.encodes.len() as u8;
        let default = if samples.is_empty() { 0 } else { DEFAULT_FRAME_BYTES };
        let size = self.script.borrow_mut().pop_front().unwrap_or(default);

        if size > 0 {
            for byte in frame.iter_mut().take(size as usize) {
                *byte = index;
            }
        }
        size
    }

    fn close(self) {
        self.calls.borrow_mut().closes += 1;
    }
}

/// Sink that remembers every individual write.
#[derive(Default)]
pub struct RecordingSink {
    pub writes: Vec<Vec<u8>>,
}

impl RecordingSink {
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn stereo() -> EncoderConfig {
    EncoderConfig::new(2, frame_encoder::SampleRate::Hz48000)
}
