use crate::config::{AudioCodingMode, StreamLayout};

/// Hook invoked on the interleaved working buffer right before it is encoded.
pub type RemapFn = Box<dyn FnMut(&mut [f32], &StreamLayout) + Send>;

const WAV_TO_A52_6CH: [usize; 6] = [0, 2, 1, 4, 5, 3];

/// Reorders WAVE channel order (L, R, C, LFE, SL, SR) into A/52 order
/// (L, C, R, SL, SR, LFE).
pub fn wav_to_a52(samples: &mut [f32], layout: &StreamLayout) {
    let channels = layout.channels as usize;
    if channels <= 3 {
        return;
    }
    if matches!(layout.acmod, Some(AudioCodingMode::Front2Rear1) | Some(AudioCodingMode::Front2Rear2)) {
        return;
    }

    if channels == 6 {
        for frame in samples.chunks_exact_mut(6) {
            let mut tmp = [0.0f32; 6];
            tmp.copy_from_slice(frame);
            for (out, &from) in frame.iter_mut().zip(WAV_TO_A52_6CH.iter()) {
                *out = tmp[from];
            }
        }
    } else {
        for frame in samples.chunks_exact_mut(channels) {
            frame.swap(1, 2);
        }
    }
}

pub fn wav_to_a52_hook() -> RemapFn {
    Box::new(wav_to_a52)
}
