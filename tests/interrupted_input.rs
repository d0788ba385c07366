use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use frame_encoder::{EncoderConfig, EncoderState, FrameEncoder, InterruptibleReader, PcmCodec, SampleRate};

/// Hands out at most `chunk` bytes per read, like a `BufReader`, and clears
/// `running` after the first read as a Ctrl-C would.
struct InterruptAfterFirstRead {
    data: Cursor<Vec<u8>>,
    chunk: usize,
    running: Arc<AtomicBool>,
}

impl Read for InterruptAfterFirstRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = buf.len().min(self.chunk);
        let read = self.data.read(&mut buf[..limit])?;
        self.running.store(false, Ordering::SeqCst);
        Ok(read)
    }
}

fn surround_encoder() -> FrameEncoder<frame_encoder::PcmSession> {
    FrameEncoder::new(&PcmCodec, EncoderConfig::new(6, SampleRate::Hz48000)).unwrap()
}

#[test]
fn interrupt_mid_quantum_flushes_whole_frames() {
    let running = Arc::new(AtomicBool::new(true));
    let inner = InterruptAfterFirstRead { data: Cursor::new(vec![0u8; 30_000]), chunk: 8192, running: running.clone() };
    let mut input = InterruptibleReader::new(inner, running);

    let mut encoder = surround_encoder();
    input.set_frame_bytes(encoder.channels() * 4);
    assert!(encoder.quantum() * 4 > 8192);

    let mut out = Vec::new();
    encoder.encode_reader(&mut input, &mut out).unwrap();

    // 8192 bytes end 8 bytes into a 24 byte frame; the frame is completed.
    assert_eq!(encoder.state(), EncoderState::Flushed);
    assert_eq!(u64::from(encoder.frames_in()), 342);
    assert_eq!(out.len(), 342 * 6 * 2);
}

#[test]
fn interrupt_on_frame_boundary_stops_immediately() {
    let running = Arc::new(AtomicBool::new(true));
    let inner = InterruptAfterFirstRead { data: Cursor::new(vec![0u8; 30_000]), chunk: 24 * 100, running: running.clone() };
    let mut input = InterruptibleReader::new(inner, running);

    let mut encoder = surround_encoder();
    input.set_frame_bytes(encoder.channels() * 4);

    let mut out = Vec::new();
    encoder.encode_reader(&mut input, &mut out).unwrap();

    assert_eq!(u64::from(encoder.frames_in()), 100);
    assert_eq!(out.len(), 100 * 6 * 2);
}
