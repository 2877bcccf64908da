//! Uniform quantization to an N-bit ladder.
//!
//! The ladder is derived from the peak of the signal being quantized, not from
//! a fixed full-scale reference:
//!
//! ```text
//! levels = 2^bits
//! step   = 2 * peak / (levels - 1)
//! q(x)   = round(x / step) * step          (round half to even)
//! ```
//!
//! Quantization error therefore scales with the loudest sample of each input,
//! so SNR figures are comparable per file regardless of recording level.
//! There is no dithering and no clipping, so an output may exceed the input
//! peak by up to half a step.  With a peak of `1.0` at 8 bits, `1.0 / step`
//! is `127.5`, which rounds to `128` and yields `1.0039`.

use serde::{Deserialize, Serialize};

use super::signal::{peak, Signal, SignalError};

// ---------------------------------------------------------------------------
// BitDepth
// ---------------------------------------------------------------------------

/// Quantization resolution in bits (always >= 1).
///
/// Depths above ~24 are accepted but add nothing beyond `f32` precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BitDepth(u32);

/// The depths the menu generates unless configured otherwise.
pub const DEFAULT_BIT_DEPTHS: [BitDepth; 3] = [BitDepth(4), BitDepth(8), BitDepth(16)];

impl BitDepth {
    /// # Errors
    ///
    /// [`SignalError::InvalidBitDepth`] when `bits == 0`.
    pub fn new(bits: u32) -> Result<Self, SignalError> {
        if bits == 0 {
            return Err(SignalError::InvalidBitDepth(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Number of ladder levels, `2^bits`.
    pub fn levels(self) -> f64 {
        2.0_f64.powf(self.0 as f64)
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = SignalError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<BitDepth> for u32 {
    fn from(depth: BitDepth) -> Self {
        depth.0
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Quantizer
// ---------------------------------------------------------------------------

/// A fixed ladder: every output is an integer multiple of [`step`](Self::step).
///
/// A quantizer built once and applied twice is a no-op the second time.
/// Building a fresh one from already-quantized data is not, because rounding
/// can push the peak past the original amplitude and widen the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    depth: BitDepth,
    step: f64,
}

impl Quantizer {
    /// Ladder spanning `[-max_amplitude, max_amplitude]` at `depth` bits.
    ///
    /// A zero (silent) amplitude yields `step == 0`, which maps every sample
    /// to itself instead of dividing by zero.
    pub fn for_peak(max_amplitude: f32, depth: BitDepth) -> Self {
        let max_amplitude = max_amplitude.abs() as f64;
        let step = 2.0 * max_amplitude / (depth.levels() - 1.0);
        Self { depth, step }
    }

    /// Ladder derived from the peak absolute value of `samples`.
    pub fn for_signal(samples: &[f32], depth: BitDepth) -> Self {
        Self::for_peak(peak(samples), depth)
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Distance between adjacent ladder values.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Snap one sample onto the ladder.
    pub fn quantize_sample(&self, sample: f32) -> f32 {
        if self.step == 0.0 {
            return sample;
        }
        ((sample as f64 / self.step).round_ties_even() * self.step) as f32
    }

    /// Snap every sample onto the ladder.  Output length equals input length.
    pub fn apply(&self, samples: &[f32]) -> Vec<f32> {
        samples.iter().map(|&s| self.quantize_sample(s)).collect()
    }
}

/// Quantize `samples` to `depth` bits using a ladder derived from their peak.
///
/// # Example
///
/// ```rust
/// use sampling_lab::audio::{quantize, BitDepth};
///
/// // 2 bits: step = 2 * 1.0 / 3
/// let out = quantize(&[1.0, 0.5, 0.1], BitDepth::new(2).unwrap());
/// assert!((out[0] - 4.0 / 3.0).abs() < 1e-6);
/// assert!((out[1] - 2.0 / 3.0).abs() < 1e-6);
/// assert_eq!(out[2], 0.0);
/// ```
pub fn quantize(samples: &[f32], depth: BitDepth) -> Vec<f32> {
    Quantizer::for_signal(samples, depth).apply(samples)
}

impl Signal {
    /// Quantize this signal to `depth` bits.  The rate is unchanged.
    pub fn quantize(&self, depth: BitDepth) -> Signal {
        self.with_samples(quantize(self.samples(), depth))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
