use byteorder::{ByteOrder, BE};
use log::info;

use crate::codec::{CodecSession, FrameCodec};
use crate::config::EncoderConfig;
use crate::error::{EncoderError, Result};
use crate::frames::Frames;

pub const DEFAULT_FRAMES_PER_PACKET: Frames = Frames::new(352);
pub const MAX_CHANNELS: u8 = 8;

const BYTES_PER_SAMPLE: usize = 2;

/// Uncompressed big-endian signed 16-bit output (L16).
#[derive(Debug, Clone, Copy, Default)]
pub struct PcmCodec;

pub struct PcmSession {
    frames_per_packet: Frames,
    channels: usize,
}

pub(crate) fn to_i16(sample: f32) -> i16 {
    (sample.max(-1.0).min(1.0) * 32767.0).round() as i16
}

impl FrameCodec for PcmCodec {
    type Session = PcmSession;

    fn name(&self) -> &'static str {
        "PCM"
    }

    fn set_defaults(&self, mut config: EncoderConfig) -> EncoderConfig {
        config.fill_channel_layout();
        config.frames_per_packet.get_or_insert(DEFAULT_FRAMES_PER_PACKET);
        config
    }

    fn session_init(&self, config: &EncoderConfig) -> Result<PcmSession> {
        if config.channels == 0 || config.channels > MAX_CHANNELS {
            return Err(EncoderError::InitFailure(format!("PCM supports 1 to {} channels, got {}", MAX_CHANNELS, config.channels)));
        }

        config.ensure_fixed_rate(self.name())?;

        let frames_per_packet = config.frames_per_packet.unwrap_or(DEFAULT_FRAMES_PER_PACKET);
        if frames_per_packet.is_zero() {
            return Err(EncoderError::init_failure("frames per packet must be positive"));
        }

        info!("PCM session: {} channels, {} frames per packet", config.channels, frames_per_packet);

        Ok(PcmSession { frames_per_packet, channels: config.channels as usize })
    }
}

impl CodecSession for PcmSession {
    fn samples_per_frame(&self) -> Frames {
        self.frames_per_packet
    }

    fn max_coded_frame_size(&self) -> usize {
        self.frames_per_packet.as_samples(self.channels) * BYTES_PER_SAMPLE
    }

    fn encode_quantum(&mut self, frame: &mut [u8], samples: &[f32]) -> i32 {
        let size = samples.len() * BYTES_PER_SAMPLE;
        if samples.len() > self.frames_per_packet.as_samples(self.channels) || size > frame.len() {
            return -1;
        }

        for (sample, out) in samples.iter().zip(frame.chunks_exact_mut(BYTES_PER_SAMPLE)) {
            BE::write_i16(out, to_i16(*sample));
        }

        size as i32
    }

    fn close(self) {}
}
