//! The [`Signal`] value type and the errors raised by the numerical core.
//!
//! A `Signal` is an immutable mono buffer of `f32` samples tagged with its
//! sampling rate.  Every processing step (resample, quantize) builds a new
//! `Signal`; nothing mutates one after construction.

use thiserror::Error;

// ---------------------------------------------------------------------------
// SignalError
// ---------------------------------------------------------------------------

/// Invalid input handed to the signal-processing core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    /// Sampling rates must be strictly positive.
    #[error("invalid sample rate: {0} Hz (must be > 0)")]
    InvalidSampleRate(u32),

    /// Bit depth must be at least 1 (a 0-bit ladder has a single level).
    #[error("invalid bit depth: {0} (must be >= 1)")]
    InvalidBitDepth(u32),

    /// Recording duration must be strictly positive and finite.
    #[error("invalid duration: {0} s (must be > 0)")]
    InvalidDuration(f32),

    /// SNR needs two sequences of the same length.
    #[error("length mismatch: original has {original} samples, degraded has {degraded}")]
    LengthMismatch { original: usize, degraded: usize },
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Mono PCM samples in roughly `[-1.0, 1.0]` at a fixed sampling rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap `samples` recorded at `sample_rate` Hz.
    ///
    /// # Errors
    ///
    /// [`SignalError::InvalidSampleRate`] when `sample_rate == 0`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, SignalError> {
        if sample_rate == 0 {
            return Err(SignalError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sampling rate in Hz (always > 0).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the signal in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Largest absolute sample value, `0.0` for an empty signal.
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }

    /// New signal at the same rate carrying `samples`.
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Signal {
        Signal {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Largest absolute value in `samples`, `0.0` when empty.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
