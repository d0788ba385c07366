use alac_encoder::{AlacEncoder, FormatDescription, MAX_ESCAPE_HEADER_BYTES};
use log::info;

use crate::codec::{CodecSession, FrameCodec};
use crate::config::EncoderConfig;
use crate::error::{EncoderError, Result};
use crate::frames::Frames;
use crate::pcm::to_i16;

pub const DEFAULT_FRAMES_PER_PACKET: Frames = Frames::new(4096);
pub const MAX_CHANNELS: u8 = 8;

/// Apple Lossless, 16-bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlacCodec;

pub struct AlacSession {
    encoder: AlacEncoder,
    input_format: FormatDescription,
    input: Vec<u8>,
    frames_per_packet: Frames,
    channels: usize,
}

impl FrameCodec for AlacCodec {
    type Session = AlacSession;

    fn name(&self) -> &'static str {
        "ALAC"
    }

    fn set_defaults(&self, mut config: EncoderConfig) -> EncoderConfig {
        config.fill_channel_layout();
        config.frames_per_packet.get_or_insert(DEFAULT_FRAMES_PER_PACKET);
        config
    }

    fn session_init(&self, config: &EncoderConfig) -> Result<AlacSession> {
        if config.channels == 0 || config.channels > MAX_CHANNELS {
            return Err(EncoderError::InitFailure(format!("ALAC supports 1 to {} channels, got {}", MAX_CHANNELS, config.channels)));
        }

        config.ensure_fixed_rate(self.name())?;

        let frames_per_packet = config.frames_per_packet.unwrap_or(DEFAULT_FRAMES_PER_PACKET);
        if frames_per_packet.is_zero() || u64::from(frames_per_packet) > u64::from(u32::MAX) {
            return Err(EncoderError::InitFailure(format!("invalid frames per packet: {}", frames_per_packet)));
        }

        let sample_rate = u64::from(config.sample_rate) as f64;
        let channels = config.channels as u32;
        let input_format = FormatDescription::pcm::<i16>(sample_rate, channels);
        let output_format = FormatDescription::alac(sample_rate, u64::from(frames_per_packet) as u32, channels);
        let encoder = AlacEncoder::new(&output_format);

        info!("ALAC session: {} channels at {} Hz, {} frames per packet", channels, config.sample_rate, frames_per_packet);

        Ok(AlacSession {
            encoder,
            input_format,
            input: Vec::with_capacity(frames_per_packet.as_samples(channels as usize) * 2),
            frames_per_packet,
            channels: channels as usize,
        })
    }
}

impl CodecSession for AlacSession {
    fn samples_per_frame(&self) -> Frames {
        self.frames_per_packet
    }

    // The size `AlacEncoder::encode` requires of its output buffer.
    fn max_coded_frame_size(&self) -> usize {
        self.frames_per_packet.as_samples(self.channels) * 2 + MAX_ESCAPE_HEADER_BYTES
    }

    fn encode_quantum(&mut self, frame: &mut [u8], samples: &[f32]) -> i32 {
        // No lookahead: an empty call has nothing left to drain.
        if samples.is_empty() {
            return 0;
        }
        if samples.len() > self.frames_per_packet.as_samples(self.channels) || samples.len() % self.channels != 0 {
            return -1;
        }

        self.input.clear();
        self.input.extend(samples.iter().flat_map(|sample| to_i16(*sample).to_ne_bytes()));

        let size = self.encoder.encode(&self.input_format, &self.input, frame);
        if size > frame.len() {
            return -1;
        }
        size as i32
    }

    fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingMode;
    use crate::sample_rate::SampleRate;

    fn session() -> AlacSession {
        let mut config = EncoderConfig::new(2, SampleRate::Hz44100);
        config.set_frames_per_packet(Frames::new(352));
        let config = AlacCodec.set_defaults(config);
        AlacCodec.session_init(&config).unwrap()
    }

    #[test]
    fn defaults_to_4096_frames() {
        let config = AlacCodec.set_defaults(EncoderConfig::new(2, SampleRate::Hz48000));
        assert_eq!(config.frames_per_packet, Some(DEFAULT_FRAMES_PER_PACKET));
    }

    #[test]
    fn encodes_a_full_packet() {
        let mut session = session();
        let mut frame = vec![0; session.max_coded_frame_size()];
        let samples: Vec<f32> = (0..704).map(|i| ((i as f32) / 50.0).sin() * 0.5).collect();

        let size = session.encode_quantum(&mut frame, &samples);
        assert!(size > 0);
        assert!((size as usize) <= session.max_coded_frame_size());
    }

    #[test]
    fn nothing_to_drain() {
        let mut session = session();
        let mut frame = vec![0; session.max_coded_frame_size()];
        assert_eq!(session.encode_quantum(&mut frame, &[]), 0);
    }

    #[test]
    fn frame_bound_covers_escaped_packets() {
        let session = session();
        assert_eq!(session.max_coded_frame_size(), 352 * 2 * 2 + MAX_ESCAPE_HEADER_BYTES);
    }

    #[test]
    fn rejects_rate_control() {
        let mut config = AlacCodec.set_defaults(EncoderConfig::new(2, SampleRate::Hz44100));
        config.set_bitrate(256);
        assert!(matches!(AlacCodec.session_init(&config), Err(EncoderError::InitFailure(_))));

        let mut config = AlacCodec.set_defaults(EncoderConfig::new(2, SampleRate::Hz44100));
        config.set_encoding_mode(EncodingMode::Vbr);
        assert!(matches!(AlacCodec.session_init(&config), Err(EncoderError::InitFailure(_))));
    }

    #[test]
    fn rejects_too_many_channels() {
        let config = EncoderConfig::new(9, SampleRate::Hz48000);
        assert!(matches!(AlacCodec.session_init(&config), Err(EncoderError::InitFailure(_))));
    }
}
