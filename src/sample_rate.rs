use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub enum SampleRate {
    Hz8000,
    Hz11025,
    Hz16000,
    Hz22050,
    Hz24000,
    Hz32000,
    Hz44100,
    Hz48000,
    Hz96000,
    Hz192000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntoSampleRateError {
    #[error("unsupported sample rate: {0} Hz")]
    InvalidSampleRate(u64),
    #[error("sample rate is not a number")]
    NotANumber,
}

impl From<SampleRate> for u64 {
    fn from(sample_rate: SampleRate) -> u64 {
        match sample_rate {
            SampleRate::Hz8000 => 8_000,
            SampleRate::Hz11025 => 11_025,
            SampleRate::Hz16000 => 16_000,
            SampleRate::Hz22050 => 22_050,
            SampleRate::Hz24000 => 24_000,
            SampleRate::Hz32000 => 32_000,
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz96000 => 96_000,
            SampleRate::Hz192000 => 192_000,
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(sample_rate: SampleRate) -> u32 {
        u64::from(sample_rate) as u32
    }
}

impl TryFrom<u64> for SampleRate {
    type Error = IntoSampleRateError;

    fn try_from(value: u64) -> Result<SampleRate, Self::Error> {
        match value {
            8_000 => Ok(SampleRate::Hz8000),
            11_025 => Ok(SampleRate::Hz11025),
            16_000 => Ok(SampleRate::Hz16000),
            22_050 => Ok(SampleRate::Hz22050),
            24_000 => Ok(SampleRate::Hz24000),
            32_000 => Ok(SampleRate::Hz32000),
            44_100 => Ok(SampleRate::Hz44100),
            48_000 => Ok(SampleRate::Hz48000),
            96_000 => Ok(SampleRate::Hz96000),
            192_000 => Ok(SampleRate::Hz192000),
            value => Err(IntoSampleRateError::InvalidSampleRate(value)),
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = IntoSampleRateError;

    fn try_from(value: u32) -> Result<SampleRate, Self::Error> {
        SampleRate::try_from(u64::from(value))
    }
}

impl FromStr for SampleRate {
    type Err = IntoSampleRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u64>().map_err(|_| IntoSampleRateError::NotANumber)?;
        SampleRate::try_from(value)
    }
}

impl Display for SampleRate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", u64::from(*self))
    }
}
