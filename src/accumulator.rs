use log::trace;

use crate::error::{EncoderError, Result};

/// Collects interleaved samples into fixed-size quanta.
///
/// The first `carry_over` samples of the working buffer are always valid;
/// everything past them is scratch.
pub struct SampleAccumulator {
    buffer: Vec<f32>,
    carry_over: usize,
    channels: usize,
}

impl SampleAccumulator {
    /// `quantum` must be a non-zero multiple of `channels`.
    pub fn new(quantum: usize, channels: usize) -> SampleAccumulator {
        debug_assert!(channels > 0 && quantum > 0 && quantum % channels == 0);
        SampleAccumulator { buffer: vec![0.0; quantum], carry_over: 0, channels }
    }

    pub fn quantum(&self) -> usize {
        self.buffer.len()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn carry_over(&self) -> usize {
        self.carry_over
    }

    pub fn check_shape(&self, samples: &[f32]) -> Result<()> {
        if samples.len() % self.channels != 0 {
            return Err(EncoderError::InvalidInputShape { samples: samples.len(), channels: self.channels });
        }
        Ok(())
    }

    /// Appends `samples`, handing every completed quantum to `on_quantum`.
    /// Returns how many quanta were completed.
    ///
    /// An error from `on_quantum` stops the push immediately; the samples
    /// after the failing quantum are not retained.
    pub fn push<F>(&mut self, samples: &[f32], mut on_quantum: F) -> Result<usize>
    where
        F: FnMut(&mut [f32]) -> Result<()>,
    {
        if samples.is_empty() {
            return Ok(0);
        }
        self.check_shape(samples)?;

        trace!("accumulating {} samples onto {} carried over", samples.len(), self.carry_over);

        let quantum = self.buffer.len();
        let mut consumed = 0;
        let mut completed = 0;

        while samples.len() - consumed >= quantum - self.carry_over {
            let needed = quantum - self.carry_over;
            self.buffer[self.carry_over..].copy_from_slice(&samples[consumed..consumed + needed]);
            consumed += needed;
            self.carry_over = 0;

            on_quantum(&mut self.buffer[..])?;
            completed += 1;
        }

        let rest = &samples[consumed..];
        self.buffer[self.carry_over..self.carry_over + rest.len()].copy_from_slice(rest);
        self.carry_over += rest.len();

        trace!("completed {} quanta, {} samples carried over", completed, self.carry_over);

        Ok(completed)
    }

    /// Hands out the partial quantum and resets the carry-over to zero.
    pub fn take_pending(&mut self) -> &mut [f32] {
        let pending = self.carry_over;
        self.carry_over = 0;
        &mut self.buffer[..pending]
    }
}
