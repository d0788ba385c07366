use std::io::{self, Read};

use byteorder::{ByteOrder, ReadBytesExt, LE};
use log::debug;
use thiserror::Error;

use crate::frames::Frames;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("not a RIFF file")]
    NotRiff,
    #[error("RIFF file is not WAVE")]
    NotWave,
    #[error("data chunk before fmt chunk")]
    MissingFormat,
    #[error("invalid fmt chunk: {0}")]
    InvalidFormat(&'static str),
    #[error("unsupported WAVE format {tag:#06x} with {bits_per_sample} bits per sample")]
    UnsupportedFormat { tag: u16, bits_per_sample: u16 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavSampleFormat {
    U8,
    S16,
    S24,
    S32,
    F32,
    F64,
}

impl WavSampleFormat {
    fn bytes(self) -> usize {
        match self {
            WavSampleFormat::U8 => 1,
            WavSampleFormat::S16 => 2,
            WavSampleFormat::S24 => 3,
            WavSampleFormat::S32 | WavSampleFormat::F32 => 4,
            WavSampleFormat::F64 => 8,
        }
    }

    fn convert(self, bytes: &[u8]) -> f32 {
        match self {
            WavSampleFormat::U8 => (bytes[0] as i32 - 128) as f32 / 128.0,
            WavSampleFormat::S16 => LE::read_i16(bytes) as f32 / 32_768.0,
            WavSampleFormat::S24 => LE::read_i24(bytes) as f32 / 8_388_608.0,
            WavSampleFormat::S32 => (LE::read_i32(bytes) as f64 / 2_147_483_648.0) as f32,
            WavSampleFormat::F32 => LE::read_f32(bytes),
            WavSampleFormat::F64 => LE::read_f64(bytes) as f32,
        }
    }
}

/// Streaming WAVE decoder producing interleaved `f32` samples.
pub struct WavReader<R: Read> {
    reader: R,
    format: WavSampleFormat,
    channels: u16,
    sample_rate: u32,
    block_align: usize,
    channel_mask: u32,
    data_remaining: Option<u64>,
    data_frames: Option<Frames>,
    bytes: Vec<u8>,
}

fn default_channel_mask(channels: u16) -> u32 {
    match channels {
        1 => 0x04,
        2 => 0x03,
        3 => 0x07,
        4 => 0x107,
        5 => 0x37,
        6 => 0x3F,
        _ => 0,
    }
}

fn skip<R: Read>(reader: &mut R, bytes: u64) -> io::Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(bytes), &mut io::sink())?;
    if skipped < bytes {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated chunk"));
    }
    Ok(())
}

impl<R: Read> WavReader<R> {
    pub fn new(mut reader: R) -> Result<WavReader<R>, WavError> {
        let mut id = [0u8; 4];

        reader.read_exact(&mut id)?;
        if &id != b"RIFF" {
            return Err(WavError::NotRiff);
        }
        reader.read_u32::<LE>()?;
        reader.read_exact(&mut id)?;
        if &id != b"WAVE" {
            return Err(WavError::NotWave);
        }

        let mut format = None;

        loop {
            reader.read_exact(&mut id)?;
            let size = reader.read_u32::<LE>()?;

            match &id {
                b"fmt " => {
                    if size < 16 {
                        return Err(WavError::InvalidFormat("fmt chunk shorter than 16 bytes"));
                    }
                    let mut tag = reader.read_u16::<LE>()?;
                    let channels = reader.read_u16::<LE>()?;
                    let sample_rate = reader.read_u32::<LE>()?;
                    reader.read_u32::<LE>()?;
                    let block_align = reader.read_u16::<LE>()?;
                    let bits_per_sample = reader.read_u16::<LE>()?;
                    let mut rest = u64::from(size) - 16;

                    if channels == 0 {
                        return Err(WavError::InvalidFormat("zero channels"));
                    }
                    if sample_rate == 0 {
                        return Err(WavError::InvalidFormat("zero sample rate"));
                    }
                    if block_align == 0 || block_align % channels != 0 {
                        return Err(WavError::InvalidFormat("bad block alignment"));
                    }

                    let mut channel_mask = 0;
                    if tag == WAVE_FORMAT_EXTENSIBLE && rest >= 10 {
                        reader.read_u32::<LE>()?;
                        channel_mask = reader.read_u32::<LE>()?;
                        tag = reader.read_u16::<LE>()?;
                        rest -= 10;
                    }
                    if channel_mask == 0 {
                        channel_mask = default_channel_mask(channels);
                    }
                    skip(&mut reader, rest + u64::from(size & 1))?;

                    let container = block_align / channels;
                    let sample_format = match (tag, container) {
                        (WAVE_FORMAT_PCM, 1) => WavSampleFormat::U8,
                        (WAVE_FORMAT_PCM, 2) => WavSampleFormat::S16,
                        (WAVE_FORMAT_PCM, 3) => WavSampleFormat::S24,
                        (WAVE_FORMAT_PCM, 4) => WavSampleFormat::S32,
                        (WAVE_FORMAT_IEEE_FLOAT, 4) => WavSampleFormat::F32,
                        (WAVE_FORMAT_IEEE_FLOAT, 8) => WavSampleFormat::F64,
                        _ => return Err(WavError::UnsupportedFormat { tag, bits_per_sample }),
                    };

                    format = Some((sample_format, channels, sample_rate, block_align as usize, channel_mask));
                }
                b"data" => {
                    let (format, channels, sample_rate, block_align, channel_mask) = format.ok_or(WavError::MissingFormat)?;

                    // Streamed files leave the size at 0 or all ones.
                    let data_remaining = if size == 0 || size == u32::MAX { None } else { Some(u64::from(size)) };
                    let data_frames = data_remaining.map(|size| Frames::new(size / block_align as u64));

                    debug!(
                        "wav: {:?}, {} channels (mask {:#x}), {} Hz, {} frames",
                        format,
                        channels,
                        channel_mask,
                        sample_rate,
                        data_frames.map(|frames| frames.to_string()).unwrap_or_else(|| "unknown".to_owned())
                    );

                    return Ok(WavReader {
                        reader,
                        format,
                        channels,
                        sample_rate,
                        block_align,
                        channel_mask,
                        data_remaining,
                        data_frames,
                        bytes: Vec::new(),
                    });
                }
                _ => skip(&mut reader, u64::from(size) + u64::from(size & 1))?,
            }
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_mask(&self) -> u32 {
        self.channel_mask
    }

    pub fn sample_format(&self) -> WavSampleFormat {
        self.format
    }

    /// Bytes per sample frame in the data chunk.
    pub fn block_align(&self) -> usize {
        self.block_align
    }

    /// The underlying reader, positioned inside the data chunk.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Length of the data chunk, when the header states one.
    pub fn frames(&self) -> Option<Frames> {
        self.data_frames
    }

    /// Fills `out` with as many whole frames as fit, returning the number of
    /// frames read. 0 means end of data.
    pub fn read_frames(&mut self, out: &mut [f32]) -> Result<usize, WavError> {
        let channels = self.channels as usize;
        let mut wanted = (out.len() / channels * self.block_align) as u64;
        if let Some(remaining) = self.data_remaining {
            wanted = wanted.min(remaining);
        }

        self.bytes.resize(wanted as usize, 0);
        let mut filled = 0;
        while filled < self.bytes.len() {
            match self.reader.read(&mut self.bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }

        let frames = filled / self.block_align;
        if let Some(remaining) = self.data_remaining.as_mut() {
            *remaining -= filled as u64;
        }

        let container = self.block_align / channels;
        let width = self.format.bytes();
        for (index, out) in out.iter_mut().take(frames * channels).enumerate() {
            let start = index * container;
            *out = self.format.convert(&self.bytes[start..start + width]);
        }

        Ok(frames)
    }
}
