use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LE};
use log::{debug, error, info, warn};

use crate::accumulator::SampleAccumulator;
use crate::codec::{CodecSession, FrameCodec};
use crate::config::{EncoderConfig, StreamLayout};
use crate::error::{EncoderError, Result};
use crate::frames::Frames;
use crate::remap::RemapFn;
use crate::session::SessionGuard;

const BYTES_PER_INPUT_SAMPLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    Ready,
    Flushed,
    Failed,
    Closed,
}

/// Runs the codec over one buffer and appends whatever it produced.
struct FrameEmitter<S: CodecSession> {
    session: SessionGuard<S>,
    frame: Vec<u8>,
    layout: StreamLayout,
    remap: Option<RemapFn>,
    frames_emitted: u64,
    bytes_written: u64,
}

impl<S: CodecSession> FrameEmitter<S> {
    fn emit<W: Write + ?Sized>(&mut self, samples: &mut [f32], sink: &mut W) -> Result<usize> {
        if !samples.is_empty() {
            if let Some(remap) = self.remap.as_mut() {
                remap(samples, &self.layout);
            }
        }

        let session = self.session.get_mut().ok_or(EncoderError::SessionFinalized)?;
        let code = session.encode_quantum(&mut self.frame, samples);

        if code < 0 || code as usize > self.frame.len() {
            error!("codec failed on frame {} with {}", self.frames_emitted, code);
            return Err(EncoderError::EncodingFailure { frame: self.frames_emitted, code });
        }

        let size = code as usize;
        if size > 0 {
            sink.write_all(&self.frame[..size])?;
            debug!("frame {}: {} samples in, {} bytes out", self.frames_emitted, samples.len(), size);
            self.frames_emitted += 1;
            self.bytes_written += size as u64;
        }

        Ok(size)
    }
}

/// Streams interleaved `f32` samples through a frame codec.
///
/// Input of any length is gathered into quanta of `samples_per_frame x
/// channels` samples; each full quantum is encoded as soon as it is complete
/// and the coded bytes are appended to the sink passed to that call. `flush`
/// encodes the final partial quantum and drains the codec, after which the
/// session only accepts `close`.
///
/// The codec session is released exactly once, by `close` or on drop.
pub struct FrameEncoder<S: CodecSession> {
    accumulator: SampleAccumulator,
    emitter: FrameEmitter<S>,
    config: EncoderConfig,
    state: EncoderState,
    frames_in: Frames,
}

impl<S: CodecSession> FrameEncoder<S> {
    pub fn new<C>(codec: &C, config: EncoderConfig) -> Result<FrameEncoder<S>>
    where
        C: FrameCodec<Session = S>,
    {
        let config = codec.set_defaults(config);
        let session = SessionGuard::new(codec.session_init(&config)?);

        // From here on dropping `session` releases it.
        let channels = config.channels as usize;
        let (samples_per_frame, max_frame_size) = match session.get() {
            Some(session) => (session.samples_per_frame(), session.max_coded_frame_size()),
            None => return Err(EncoderError::SessionFinalized),
        };
        if channels == 0 {
            return Err(EncoderError::init_failure("channel count must be positive"));
        }
        if samples_per_frame.is_zero() {
            return Err(EncoderError::init_failure("codec reported an empty frame"));
        }
        if max_frame_size == 0 {
            return Err(EncoderError::init_failure("codec reported a zero maximum frame size"));
        }

        let quantum = samples_per_frame.as_samples(channels);

        info!(
            "opened {} encoder: {} channels at {} Hz, {} frames per quantum, frames up to {} bytes",
            codec.name(), channels, config.sample_rate, samples_per_frame, max_frame_size
        );

        Ok(FrameEncoder {
            accumulator: SampleAccumulator::new(quantum, channels),
            emitter: FrameEmitter {
                session,
                frame: vec![0; max_frame_size],
                layout: config.layout(),
                remap: None,
                frames_emitted: 0,
                bytes_written: 0,
            },
            config,
            state: EncoderState::Ready,
            frames_in: Frames::default(),
        })
    }

    pub fn with_remap<C>(codec: &C, config: EncoderConfig, remap: RemapFn) -> Result<FrameEncoder<S>>
    where
        C: FrameCodec<Session = S>,
    {
        let mut encoder = FrameEncoder::new(codec, config)?;
        encoder.set_remap(remap);
        Ok(encoder)
    }

    pub fn set_remap(&mut self, remap: RemapFn) {
        self.emitter.remap = Some(remap);
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn channels(&self) -> usize {
        self.accumulator.channels()
    }

    /// Interleaved samples per encode call.
    pub fn quantum(&self) -> usize {
        self.accumulator.quantum()
    }

    pub fn carry_over(&self) -> usize {
        self.accumulator.carry_over()
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Coded frames written to sinks so far.
    pub fn frames_emitted(&self) -> u64 {
        self.emitter.frames_emitted
    }

    pub fn bytes_written(&self) -> u64 {
        self.emitter.bytes_written
    }

    /// Sample frames accepted so far.
    pub fn frames_in(&self) -> Frames {
        self.frames_in
    }

    pub fn session(&self) -> Option<&S> {
        self.emitter.session.get()
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            EncoderState::Ready => Ok(()),
            _ => Err(EncoderError::SessionFinalized),
        }
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref err) = result {
            if !err.is_recoverable() {
                self.state = EncoderState::Failed;
            }
        }
        result
    }

    /// Encodes an interleaved block; its length must be a multiple of the
    /// channel count.
    pub fn encode<W: Write + ?Sized>(&mut self, samples: &[f32], sink: &mut W) -> Result<()> {
        self.ensure_ready()?;

        let emitter = &mut self.emitter;
        let result = self.accumulator.push(samples, |quantum| emitter.emit(quantum, &mut *sink).map(|_| ()));
        let result = self.track(result);

        if result.is_ok() {
            self.frames_in += Frames::from_samples(samples.len(), self.accumulator.channels());
        }
        result.map(|_| ())
    }

    /// Encodes the first `frames` sample frames of `samples`.
    pub fn encode_frames<W: Write + ?Sized>(&mut self, samples: &[f32], frames: Frames, sink: &mut W) -> Result<()> {
        let requested = frames.as_samples(self.channels());
        if requested > samples.len() {
            return Err(EncoderError::InsufficientSamples { requested, available: samples.len() });
        }
        self.encode(&samples[..requested], sink)
    }

    pub fn encode_to_vec(&mut self, samples: &[f32]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(samples, &mut out)?;
        Ok(out)
    }

    /// Encodes the pending partial quantum, then keeps calling the codec with
    /// no input until it stops producing frames.
    pub fn flush<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<()> {
        self.ensure_ready()?;

        let pending = self.accumulator.take_pending();
        debug!("flushing {} pending samples", pending.len());

        let result = self.emitter.emit(pending, sink);
        let mut size = self.track(result)?;
        while size > 0 {
            let result = self.emitter.emit(&mut [], sink);
            size = self.track(result)?;
        }

        self.state = EncoderState::Flushed;
        info!("flushed after {} frames, {} bytes", self.emitter.frames_emitted, self.emitter.bytes_written);
        Ok(())
    }

    pub fn flush_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.flush(&mut out)?;
        Ok(out)
    }

    /// Reads little-endian `f32` samples until end of input, encodes them and
    /// flushes.
    pub fn encode_reader<R, W>(&mut self, reader: &mut R, sink: &mut W) -> Result<()>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        self.ensure_ready()?;

        let mut bytes = vec![0u8; self.quantum() * BYTES_PER_INPUT_SAMPLE];
        let mut samples = vec![0f32; self.quantum()];

        loop {
            let read = read_full(reader, &mut bytes)?;
            if read % BYTES_PER_INPUT_SAMPLE != 0 {
                warn!("input ends with a partial sample ({} stray bytes)", read % BYTES_PER_INPUT_SAMPLE);
                return Err(EncoderError::InvalidInputShape { samples: read / BYTES_PER_INPUT_SAMPLE, channels: self.channels() });
            }

            let count = read / BYTES_PER_INPUT_SAMPLE;
            LE::read_f32_into(&bytes[..read], &mut samples[..count]);
            self.encode(&samples[..count], sink)?;

            if read < bytes.len() {
                break;
            }
        }

        self.flush(sink)
    }

    /// Releases the codec session. Safe to call more than once.
    pub fn close(&mut self) {
        if self.emitter.session.close() {
            info!("closed encoder after {} frames, {} bytes", self.emitter.frames_emitted, self.emitter.bytes_written);
        }
        self.state = EncoderState::Closed;
    }
}

fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::PcmCodec;
    use crate::sample_rate::SampleRate;

    use std::io::Cursor;

    fn pcm_encoder(frames: u64) -> FrameEncoder<crate::pcm::PcmSession> {
        let mut config = EncoderConfig::new(2, SampleRate::Hz48000);
        config.set_frames_per_packet(Frames::new(frames));
        FrameEncoder::new(&PcmCodec, config).unwrap()
    }

    #[test]
    fn encodes_whole_quanta_only() {
        let mut encoder = pcm_encoder(4);
        assert_eq!(encoder.quantum(), 8);

        let out = encoder.encode_to_vec(&[0.0; 10]).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(encoder.carry_over(), 2);
        assert_eq!(encoder.frames_in(), Frames::new(5));

        let out = encoder.flush_to_vec().unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(encoder.state(), EncoderState::Flushed);
    }

    #[test]
    fn encode_frames_checks_length() {
        let mut encoder = pcm_encoder(4);
        let err = encoder.encode_frames(&[0.0; 6], Frames::new(4), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, EncoderError::InsufficientSamples { requested: 8, available: 6 }));
        assert_eq!(encoder.state(), EncoderState::Ready);

        let mut out = Vec::new();
        encoder.encode_frames(&[0.0; 12], Frames::new(4), &mut out).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(encoder.carry_over(), 0);
    }

    #[test]
    fn reads_f32_stream_and_flushes() {
        let mut encoder = pcm_encoder(4);
        let mut input = Vec::new();
        for i in 0..10 {
            input.extend_from_slice(&(i as f32 / 10.0).to_le_bytes());
        }

        let mut out = Vec::new();
        encoder.encode_reader(&mut Cursor::new(input), &mut out).unwrap();

        assert_eq!(out.len(), 20);
        assert_eq!(encoder.state(), EncoderState::Flushed);
    }

    #[test]
    fn rejects_stray_bytes_in_stream() {
        let mut encoder = pcm_encoder(4);
        let input = vec![0u8; 10];
        let err = encoder.encode_reader(&mut Cursor::new(input), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, EncoderError::InvalidInputShape { .. }));
    }

    #[test]
    fn rejects_odd_sample_count_in_stream() {
        let mut encoder = pcm_encoder(4);
        let input = vec![0u8; 12];
        let err = encoder.encode_reader(&mut Cursor::new(input), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, EncoderError::InvalidInputShape { samples: 3, channels: 2 }));
    }

    #[test]
    fn closed_encoder_refuses_work() {
        let mut encoder = pcm_encoder(4);
        encoder.close();
        encoder.close();

        assert!(matches!(encoder.encode_to_vec(&[0.0; 8]), Err(EncoderError::SessionFinalized)));
        assert!(matches!(encoder.flush_to_vec(), Err(EncoderError::SessionFinalized)));
        assert!(encoder.session().is_none());
    }
}
