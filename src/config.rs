use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{EncoderError, Result};
use crate::frames::Frames;
use crate::sample_rate::SampleRate;

pub const DEFAULT_QUALITY: u16 = 220;
pub const DEFAULT_DIALNORM: u8 = 31;

const CHANNEL_MASK_LFE: u32 = 0x08;

/// Sample format of the data handed to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    S16,
    S20,
    S24,
    S32,
    Float,
    Double,
    S8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    Cbr,
    Vbr,
}

/// A/52 audio coding mode (acmod), naming front and rear channel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodingMode {
    DualMono,
    Mono,
    Stereo,
    Front3Rear0,
    Front2Rear1,
    Front3Rear1,
    Front2Rear2,
    Front3Rear2,
}

impl AudioCodingMode {
    /// Full-bandwidth channels carried by this mode, LFE excluded.
    pub fn channels(self) -> u8 {
        match self {
            AudioCodingMode::DualMono => 2,
            AudioCodingMode::Mono => 1,
            AudioCodingMode::Stereo => 2,
            AudioCodingMode::Front3Rear0 => 3,
            AudioCodingMode::Front2Rear1 => 3,
            AudioCodingMode::Front3Rear1 => 4,
            AudioCodingMode::Front2Rear2 => 4,
            AudioCodingMode::Front3Rear2 => 5,
        }
    }

    /// Picks the mode for a plain interleaved stream of `channels` channels.
    ///
    /// An unset `lfe` is taken to mean LFE present only for six channels. An
    /// explicit `acmod` is kept when its channel count agrees with the stream
    /// and rejected otherwise.
    pub fn from_channels(channels: u8, acmod: Option<AudioCodingMode>, lfe: Option<bool>) -> Option<(AudioCodingMode, bool)> {
        let lfe = lfe.unwrap_or(channels == 6);
        let full = if lfe { channels.checked_sub(1)? } else { channels };

        match acmod {
            Some(acmod) if acmod.channels() == full => Some((acmod, lfe)),
            Some(_) => None,
            None => {
                let acmod = match full {
                    1 => AudioCodingMode::Mono,
                    2 => AudioCodingMode::Stereo,
                    3 => AudioCodingMode::Front3Rear0,
                    4 => AudioCodingMode::Front2Rear2,
                    5 => AudioCodingMode::Front3Rear2,
                    _ => return None,
                };
                Some((acmod, lfe))
            }
        }
    }

    /// Picks the mode from a WAVE_FORMAT_EXTENSIBLE speaker mask.
    pub fn from_channel_mask(channels: u8, mask: u32, acmod: Option<AudioCodingMode>, lfe: Option<bool>) -> Option<(AudioCodingMode, bool)> {
        let lfe = lfe.unwrap_or(mask & CHANNEL_MASK_LFE != 0);
        let (full, mask) = if lfe { (channels.checked_sub(1)?, mask & !CHANNEL_MASK_LFE) } else { (channels, mask) };

        if let Some(acmod) = acmod {
            return if acmod.channels() == full { Some((acmod, lfe)) } else { None };
        }

        let acmod = match (mask, full) {
            (0x04, 1) => AudioCodingMode::Mono,
            (0x03, 2) => AudioCodingMode::Stereo,
            (0x07, 3) => AudioCodingMode::Front3Rear0,
            (0x103, 3) => AudioCodingMode::Front2Rear1,
            (0x107, 4) => AudioCodingMode::Front3Rear1,
            (0x33, 4) => AudioCodingMode::Front2Rear2,
            (0x37, 5) | (0x607, 5) => AudioCodingMode::Front3Rear2,
            _ => return None,
        };
        Some((acmod, lfe))
    }
}

impl Display for AudioCodingMode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            AudioCodingMode::DualMono => "1+1",
            AudioCodingMode::Mono => "1/0",
            AudioCodingMode::Stereo => "2/0",
            AudioCodingMode::Front3Rear0 => "3/0",
            AudioCodingMode::Front2Rear1 => "2/1",
            AudioCodingMode::Front3Rear1 => "3/1",
            AudioCodingMode::Front2Rear2 => "2/2",
            AudioCodingMode::Front3Rear2 => "3/2",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cbr" => Ok(EncodingMode::Cbr),
            "vbr" => Ok(EncodingMode::Vbr),
            other => Err(format!("unknown encoding mode: {}", other)),
        }
    }
}

/// What a remapping hook needs to know about the interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLayout {
    pub channels: u8,
    pub sample_format: SampleFormat,
    pub acmod: Option<AudioCodingMode>,
    pub lfe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub channels: u8,
    pub sample_rate: SampleRate,
    pub sample_format: SampleFormat,
    pub acmod: Option<AudioCodingMode>,
    pub lfe: Option<bool>,
    pub channel_mask: Option<u32>,
    pub encoding_mode: EncodingMode,
    /// Target bitrate in kbps, 0 lets the codec choose.
    pub bitrate: u32,
    pub quality: u16,
    pub dialnorm: u8,
    pub frames_per_packet: Option<Frames>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            channels: 2,
            sample_rate: SampleRate::Hz48000,
            sample_format: SampleFormat::Float,
            acmod: None,
            lfe: None,
            channel_mask: None,
            encoding_mode: EncodingMode::Cbr,
            bitrate: 0,
            quality: DEFAULT_QUALITY,
            dialnorm: DEFAULT_DIALNORM,
            frames_per_packet: None,
        }
    }
}

impl EncoderConfig {
    pub fn new(channels: u8, sample_rate: SampleRate) -> Self {
        EncoderConfig { channels, sample_rate, ..Self::default() }
    }

    pub fn set_bitrate(&mut self, kbps: u32) {
        self.bitrate = kbps;
    }

    pub fn set_encoding_mode(&mut self, encoding_mode: EncodingMode) {
        self.encoding_mode = encoding_mode;
    }

    pub fn set_frames_per_packet(&mut self, frames: Frames) {
        self.frames_per_packet = Option::from(frames);
    }

    pub fn set_channel_mask(&mut self, mask: u32) {
        self.channel_mask = Option::from(mask);
    }

    /// Fills `acmod` and `lfe` when unset, from the channel mask if one is
    /// known and from the plain channel count otherwise. Leaves both alone
    /// when no layout fits, so session init can reject the config.
    pub fn fill_channel_layout(&mut self) {
        let layout = match self.channel_mask {
            Some(mask) => AudioCodingMode::from_channel_mask(self.channels, mask, self.acmod, self.lfe),
            None => AudioCodingMode::from_channels(self.channels, self.acmod, self.lfe),
        };

        if let Some((acmod, lfe)) = layout {
            self.acmod = Some(acmod);
            self.lfe = Some(lfe);
        }
    }

    /// Rejects rate control and A/52 metadata settings, for codecs whose
    /// output size follows from the input alone.
    pub fn ensure_fixed_rate(&self, codec: &str) -> Result<()> {
        if self.sample_format != SampleFormat::Float {
            return Err(EncoderError::InitFailure(format!("{} takes float input, got {:?}", codec, self.sample_format)));
        }
        if self.bitrate != 0 {
            return Err(EncoderError::InitFailure(format!("{} has no target bitrate, got {} kbps", codec, self.bitrate)));
        }
        if self.encoding_mode != EncodingMode::Cbr || self.quality != DEFAULT_QUALITY {
            return Err(EncoderError::InitFailure(format!("{} has no VBR mode", codec)));
        }
        if self.dialnorm != DEFAULT_DIALNORM {
            return Err(EncoderError::InitFailure(format!("{} carries no dialogue normalization", codec)));
        }
        Ok(())
    }

    pub fn layout(&self) -> StreamLayout {
        StreamLayout {
            channels: self.channels,
            sample_format: self.sample_format,
            acmod: self.acmod,
            lfe: self.lfe.unwrap_or(false),
        }
    }
}
