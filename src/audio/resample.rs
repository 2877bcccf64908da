//! Sample-rate conversion and channel mixing.
//!
//! 1. [`downmix_to_mono`] — average interleaved channels into one.
//! 2. [`resample`] — convert between arbitrary rates by nearest-index
//!    selection.
//!
//! ## Nearest-index selection
//!
//! The resampler does not interpolate sample *values*.  It spreads
//! `new_len` evenly spaced positions over `[0, len - 1]`, rounds each to the
//! nearest index and copies that sample.  Downsampling therefore decimates
//! and upsampling repeats samples.  No anti-alias filter is applied; the
//! resulting aliasing and staircase artefacts are what the SNR experiments
//! are meant to expose.

use super::signal::{Signal, SignalError};

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; a trailing partial frame
/// is dropped.
///
/// * If `channels == 1` the input is copied unchanged.
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```rust
/// use sampling_lab::audio::downmix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Number of samples [`resample`] produces for an input of `len` samples.
///
/// `round(len * target_rate / source_rate)`, ties to even.  Returns `0` when
/// `source_rate == 0` (the caller rejects that case before using the value).
pub fn resampled_len(len: usize, source_rate: u32, target_rate: u32) -> usize {
    if source_rate == 0 {
        return 0;
    }
    (len as f64 * target_rate as f64 / source_rate as f64).round_ties_even() as usize
}

/// Resample `samples` from `source_rate` Hz to `target_rate` Hz by
/// nearest-index selection.
///
/// * `target_rate == source_rate` returns a copy of the input.
/// * Empty input or `target_rate == 0` returns an empty vector.
///
/// # Errors
///
/// [`SignalError::InvalidSampleRate`] when `source_rate == 0`.
///
/// # Example
///
/// ```rust
/// use sampling_lab::audio::resample;
///
/// // Upsampling repeats samples rather than interpolating between them.
/// let out = resample(&[0.0, 1.0, 2.0], 1_000, 2_000).unwrap();
/// assert_eq!(out, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
/// ```
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, SignalError> {
    if source_rate == 0 {
        return Err(SignalError::InvalidSampleRate(source_rate));
    }

    if target_rate == source_rate {
        return Ok(samples.to_vec());
    }

    let new_len = resampled_len(samples.len(), source_rate, target_rate);
    if samples.is_empty() || new_len == 0 {
        return Ok(Vec::new());
    }

    let last = samples.len() - 1;
    let spacing = if new_len > 1 {
        last as f64 / (new_len - 1) as f64
    } else {
        0.0
    };

    let output = (0..new_len)
        .map(|i| {
            let idx = (i as f64 * spacing).round_ties_even() as usize;
            samples[idx.min(last)]
        })
        .collect();

    Ok(output)
}

impl Signal {
    /// Resample this signal to `target_rate` Hz.
    ///
    /// # Errors
    ///
    /// [`SignalError::InvalidSampleRate`] when `target_rate == 0`: a
    /// `Signal` always carries a positive rate.
    pub fn resample(&self, target_rate: u32) -> Result<Signal, SignalError> {
        if target_rate == 0 {
            return Err(SignalError::InvalidSampleRate(target_rate));
        }
        let samples = resample(self.samples(), self.sample_rate(), target_rate)?;
        Signal::new(samples, target_rate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    // ---- downmix_to_mono ---------------------------------------------------

    #[test]
    fn downmix_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn downmix_two_channel() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = downmix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6); // (1.0 + -1.0) / 2
        assert!((out[1] - 0.5).abs() < 1e-6); // (0.5 + 0.5) / 2
    }

    #[test]
    fn downmix_drops_partial_frame() {
        let out = downmix_to_mono(&[0.2_f32, 0.4, 0.6], 2);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels() {
        assert!(downmix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample ----------------------------------------------------------

    #[test]
    fn same_rate_is_identity() {
        let input: Vec<f32> = (0..160).map(|i| (i as f32 * 0.1).sin()).collect();
        for rate in [1, 8_000, 44_100, 96_000] {
            assert_eq!(resample(&input, rate, rate).unwrap(), input);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(resample(&[], 44_100, 8_000).unwrap().is_empty());
        assert!(resample(&[], 8_000, 44_100).unwrap().is_empty());
    }

    #[test]
    fn zero_source_rate_rejected() {
        let err = resample(&[0.5], 0, 8_000).unwrap_err();
        assert_eq!(err, SignalError::InvalidSampleRate(0));
    }

    #[test]
    fn zero_target_rate_gives_empty_output() {
        assert!(resample(&ramp(100), 44_100, 0).unwrap().is_empty());
    }

    #[test]
    fn output_length_is_rounded_ratio() {
        let cases = [
            (44_100, 44_100, 16_000, 16_000),
            (1_000, 44_100, 8_000, 181), // 181.40
            (480, 48_000, 16_000, 160),
            (80, 8_000, 16_000, 160),
            (3, 2, 3, 4), // 4.5 ties to even
            (5, 2, 3, 8), // 7.5 ties to even
        ];
        for (len, from, to, expected) in cases {
            let out = resample(&vec![0.1_f32; len], from, to).unwrap();
            assert_eq!(out.len(), expected, "{len} samples {from} -> {to}");
            assert_eq!(resampled_len(len, from, to), expected);
        }
    }

    #[test]
    fn downsampling_picks_nearest_indices() {
        // positions 0, 2.25, 4.5, 6.75, 9 → 0, 2, 4, 7, 9
        let out = resample(&ramp(10), 10, 5).unwrap();
        assert_eq!(out, vec![0.0, 2.0, 4.0, 7.0, 9.0]);
    }

    #[test]
    fn upsampling_repeats_samples() {
        // positions i * 4/9 → 0,0,1,1,2,2,3,3,4,4
        let out = resample(&ramp(5), 10, 20).unwrap();
        assert_eq!(
            out,
            vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]
        );
    }

    #[test]
    fn single_output_sample_takes_first() {
        // round(4 * 1/4) = 1 sample
        let out = resample(&[0.3, 0.1, 0.2, 0.4], 4, 1).unwrap();
        assert_eq!(out, vec![0.3]);
    }

    #[test]
    fn endpoints_are_preserved() {
        let input = ramp(1_000);
        let out = resample(&input, 44_100, 22_050).unwrap();
        assert_eq!(out.first(), input.first());
        assert_eq!(out.last(), input.last());
    }

    #[test]
    fn output_values_come_from_input() {
        let input: Vec<f32> = (0..997).map(|i| (i as f32 * 0.37).sin()).collect();
        let out = resample(&input, 44_100, 32_000).unwrap();
        assert!(out.iter().all(|s| input.contains(s)));
    }

    #[test]
    fn signal_resample_tags_new_rate() {
        let signal = Signal::new(vec![0.25_f32; 441], 44_100).unwrap();
        let out = signal.resample(8_000).unwrap();
        assert_eq!(out.sample_rate(), 8_000);
        assert_eq!(out.len(), 80);
        // the source signal is untouched
        assert_eq!(signal.len(), 441);
    }

    #[test]
    fn signal_resample_rejects_zero_target() {
        let signal = Signal::new(vec![0.25_f32; 10], 44_100).unwrap();
        assert_eq!(
            signal.resample(0).unwrap_err(),
            SignalError::InvalidSampleRate(0)
        );
    }
}
