//! Signal-to-noise ratio between a reference signal and a degraded copy.
//!
//! ```text
//! noise[i]     = original[i] - degraded[i]
//! signal_power = mean(original²)
//! noise_power  = mean(noise²)
//! snr_db       = 10 · log10(signal_power / noise_power)
//! ```
//!
//! | Case | Result |
//! |------|--------|
//! | `noise_power == 0` (perfect copy, or both empty) | `+inf` |
//! | silent original, non-zero noise | `-inf` |
//! | otherwise | finite dB value |
//!
//! # Example
//!
//! ```rust
//! use sampling_lab::audio::compute_snr;
//!
//! let original = vec![1.0_f32, -1.0, 1.0, -1.0];
//! let degraded = vec![0.9_f32, -0.9, 0.9, -0.9];
//! let snr = compute_snr(&original, &degraded).unwrap();
//! assert!((snr.db() - 20.0).abs() < 1e-3);
//!
//! assert!(compute_snr(&original, &original).unwrap().is_lossless());
//! ```

use super::signal::SignalError;

// ---------------------------------------------------------------------------
// Snr
// ---------------------------------------------------------------------------

/// SNR in decibels.  May be `+inf` (no noise) or `-inf` (no signal).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Snr(f64);

impl Snr {
    pub const LOSSLESS: Snr = Snr(f64::INFINITY);
    pub const SILENT_REFERENCE: Snr = Snr(f64::NEG_INFINITY);

    pub fn from_db(db: f64) -> Self {
        Self(db)
    }

    pub fn db(self) -> f64 {
        self.0
    }

    /// `true` when the degraded signal reproduces the original exactly.
    pub fn is_lossless(self) -> bool {
        self.0 == f64::INFINITY
    }
}

impl std::fmt::Display for Snr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_infinite() {
            let sign = if self.0 > 0.0 { "" } else { "-" };
            write!(f, "{sign}inf dB")
        } else {
            write!(f, "{:.2} dB", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// compute_snr
// ---------------------------------------------------------------------------

/// Compute the SNR of `degraded` relative to `original`.
///
/// Powers are accumulated in `f64`.
///
/// # Errors
///
/// [`SignalError::LengthMismatch`] when the two slices differ in length.
pub fn compute_snr(original: &[f32], degraded: &[f32]) -> Result<Snr, SignalError> {
    if original.len() != degraded.len() {
        return Err(SignalError::LengthMismatch {
            original: original.len(),
            degraded: degraded.len(),
        });
    }

    let (signal_energy, noise_energy) = original.iter().zip(degraded).fold(
        (0.0_f64, 0.0_f64),
        |(sig, noise), (&o, &d)| {
            let o = o as f64;
            let e = o - d as f64;
            (sig + o * o, noise + e * e)
        },
    );

    if noise_energy == 0.0 {
        return Ok(Snr::LOSSLESS);
    }
    if signal_energy == 0.0 {
        return Ok(Snr::SILENT_REFERENCE);
    }

    // Both means share the same divisor, so the energies' ratio is the
    // powers' ratio.
    Ok(Snr(10.0 * (signal_energy / noise_energy).log10()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
