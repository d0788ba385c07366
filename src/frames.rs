use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::ops::{Add, AddAssign, Div, Sub};
use std::str::FromStr;
use std::time::Duration;

use crate::sample_rate::SampleRate;

/// A count of sample frames, i.e. samples per channel.
#[derive(Debug, Clone, Copy, Default, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct Frames(u64);

impl Frames {
    pub const fn new(value: u64) -> Frames {
        Frames(value)
    }

    /// Number of interleaved samples these frames occupy.
    pub const fn as_samples(self, channels: usize) -> usize {
        (self.0 as usize) * channels
    }

    pub const fn from_samples(samples: usize, channels: usize) -> Frames {
        Frames((samples / channels) as u64)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<Frames> for u64 {
    fn from(frames: Frames) -> u64 {
        frames.0
    }
}

impl From<u64> for Frames {
    fn from(value: u64) -> Frames {
        Frames(value)
    }
}

impl Add for Frames {
    type Output = Frames;

    fn add(self, other: Frames) -> Frames {
        Frames(self.0 + other.0)
    }
}

impl AddAssign for Frames {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0
    }
}

impl Div<SampleRate> for Frames {
    type Output = Duration;

    fn div(self, other: SampleRate) -> Duration {
        let sample_rate = u64::from(other);
        let nanos = (self.0 % sample_rate) * 1_000_000_000 / sample_rate;
        Duration::new(self.0 / sample_rate, nanos as u32)
    }
}

impl Sub for Frames {
    type Output = Frames;

    fn sub(self, other: Frames) -> Frames {
        Frames(self.0 - other.0)
    }
}

impl FromStr for Frames {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Frames)
    }
}

impl Display for Frames {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_frames_and_samples() {
        assert_eq!(Frames::new(1536).as_samples(2), 3072);
        assert_eq!(Frames::from_samples(3072, 2), Frames::new(1536));
        assert_eq!(Frames::from_samples(7, 2), Frames::new(3));
    }

    #[test]
    fn divides_into_duration() {
        assert_eq!(Frames::new(48_000) / SampleRate::Hz48000, Duration::from_secs(1));
        assert_eq!(Frames::new(72_000) / SampleRate::Hz48000, Duration::from_millis(1500));
        assert_eq!(Frames::new(441) / SampleRate::Hz44100, Duration::from_millis(10));
    }

    #[test]
    fn arithmetic() {
        let mut total = Frames::new(10);
        total += Frames::new(5);
        assert_eq!(total, Frames::new(15));
        assert_eq!(total - Frames::new(15), Frames::default());
        assert!((total - Frames::new(15)).is_zero());
    }
}
