mod accumulator;
mod alac;
mod codec;
mod config;
mod encoder;
mod error;
mod frames;
mod input;
mod pcm;
pub mod remap;
mod sample_rate;
mod session;
pub mod wav;

pub use crate::accumulator::SampleAccumulator;
pub use crate::alac::{AlacCodec, AlacSession};
pub use crate::codec::{Codec, CodecHandle, CodecSession, FrameCodec};
pub use crate::config::{AudioCodingMode, EncoderConfig, EncodingMode, SampleFormat, StreamLayout};
pub use crate::encoder::{EncoderState, FrameEncoder};
pub use crate::error::{EncoderError, Result};
pub use crate::frames::Frames;
pub use crate::input::InterruptibleReader;
pub use crate::pcm::{PcmCodec, PcmSession};
pub use crate::remap::RemapFn;
pub use crate::sample_rate::{IntoSampleRateError, SampleRate};
pub use crate::session::SessionGuard;

/// A config with every field the codec knows about filled in.
pub fn defaults<C: FrameCodec>(codec: &C) -> EncoderConfig {
    codec.set_defaults(EncoderConfig::default())
}
