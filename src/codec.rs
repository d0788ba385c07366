use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::alac::{AlacCodec, AlacSession};
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::frames::Frames;
use crate::pcm::{PcmCodec, PcmSession};

/// Factory side of a frame codec: fills defaults and opens sessions.
pub trait FrameCodec {
    type Session: CodecSession;

    fn name(&self) -> &'static str;

    /// Returns `config` with every unset field filled in.
    fn set_defaults(&self, mut config: EncoderConfig) -> EncoderConfig {
        config.fill_channel_layout();
        config
    }

    /// Allocates codec state for `config`, failing with `InitFailure` when the
    /// combination is not supported.
    fn session_init(&self, config: &EncoderConfig) -> Result<Self::Session>;
}

/// Live codec state behind an encoder.
///
/// `close` is not required to be idempotent; callers hold sessions in a
/// [`SessionGuard`](crate::session::SessionGuard) which calls it at most once.
pub trait CodecSession {
    /// Frames per channel consumed by one full encode call.
    fn samples_per_frame(&self) -> Frames;

    /// Upper bound on the bytes a single encode call writes, fixed for the
    /// lifetime of the session.
    fn max_coded_frame_size(&self) -> usize;

    /// Encodes `samples` (interleaved, possibly fewer than a full frame, and
    /// empty when draining) into `frame`. Returns the number of bytes
    /// written, 0 when no frame was produced, or a negative value on error.
    fn encode_quantum(&mut self, frame: &mut [u8], samples: &[f32]) -> i32;

    fn close(self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Alac,
    Pcm,
}

pub enum CodecHandle {
    Alac(Box<AlacSession>),
    Pcm(PcmSession),
}

impl FrameCodec for Codec {
    type Session = CodecHandle;

    fn name(&self) -> &'static str {
        match self {
            Codec::Alac => AlacCodec.name(),
            Codec::Pcm => PcmCodec.name(),
        }
    }

    fn set_defaults(&self, config: EncoderConfig) -> EncoderConfig {
        match self {
            Codec::Alac => AlacCodec.set_defaults(config),
            Codec::Pcm => PcmCodec.set_defaults(config),
        }
    }

    fn session_init(&self, config: &EncoderConfig) -> Result<CodecHandle> {
        match self {
            Codec::Alac => Ok(CodecHandle::Alac(Box::new(AlacCodec.session_init(config)?))),
            Codec::Pcm => Ok(CodecHandle::Pcm(PcmCodec.session_init(config)?)),
        }
    }
}

impl CodecSession for CodecHandle {
    fn samples_per_frame(&self) -> Frames {
        match self {
            CodecHandle::Alac(session) => session.samples_per_frame(),
            CodecHandle::Pcm(session) => session.samples_per_frame(),
        }
    }

    fn max_coded_frame_size(&self) -> usize {
        match self {
            CodecHandle::Alac(session) => session.max_coded_frame_size(),
            CodecHandle::Pcm(session) => session.max_coded_frame_size(),
        }
    }

    fn encode_quantum(&mut self, frame: &mut [u8], samples: &[f32]) -> i32 {
        match self {
            CodecHandle::Alac(session) => session.encode_quantum(frame, samples),
            CodecHandle::Pcm(session) => session.encode_quantum(frame, samples),
        }
    }

    fn close(self) {
        match self {
            CodecHandle::Alac(session) => session.close(),
            CodecHandle::Pcm(session) => session.close(),
        }
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alac" => Ok(Codec::Alac),
            "pcm" | "l16" => Ok(Codec::Pcm),
            other => Err(format!("unknown codec: {}", other)),
        }
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Codec::Alac => write!(f, "ALAC"),
            Codec::Pcm => write!(f, "PCM"),
        }
    }
}
