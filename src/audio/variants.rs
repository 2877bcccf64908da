//! Variant generation: resample once, then quantize and score per bit depth.
//!
//! ```text
//! original ──resample(target_rate)──▶ sampled ─┬─ quantize(4)  ─▶ store + SNR
//!                                              ├─ quantize(8)  ─▶ store + SNR
//!                                              └─ quantize(16) ─▶ store + SNR
//! ```
//!
//! SNR is measured against `sampled`, not the original, so each report
//! isolates quantization loss from resampling loss.

use thiserror::Error;

use super::quality::{compute_snr, Snr};
use super::quantize::BitDepth;
use super::signal::{Signal, SignalError};
use super::wav::StorageError;

// ---------------------------------------------------------------------------
// VariantSink
// ---------------------------------------------------------------------------

/// Destination for generated variants.
///
/// [`crate::audio::WavDirectory`] writes WAV files; tests use an in-memory sink.
pub trait VariantSink {
    /// Persist `signal` under the artifact `name` (no extension).
    fn store(&mut self, name: &str, signal: &Signal) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// VariantError / VariantReport
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum VariantError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("failed to store variant {name}: {source}")]
    Storage {
        name: String,
        #[source]
        source: StorageError,
    },
}

/// Outcome for one bit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    /// Artifact name, `{base}_{rate}Hz_{bits}bit`.
    pub name: String,
    pub bit_depth: BitDepth,
    pub sample_rate: u32,
    /// Number of samples in the stored variant.
    pub len: usize,
    /// Quantization SNR relative to the resampled signal.
    pub snr: Snr,
}

// ---------------------------------------------------------------------------
// generate_variants
// ---------------------------------------------------------------------------

/// Artifact name for one variant.
///
/// ```rust
/// use sampling_lab::audio::{variant_name, BitDepth};
///
/// let name = variant_name("voice", 8_000, BitDepth::new(4).unwrap());
/// assert_eq!(name, "voice_8000Hz_4bit");
/// ```
pub fn variant_name(base_name: &str, sample_rate: u32, depth: BitDepth) -> String {
    format!("{base_name}_{sample_rate}Hz_{depth}bit")
}

/// Resample `original` to `target_rate` once, then for each entry of
/// `bit_depths` (order kept, duplicates processed independently) quantize,
/// store via `sink` and report the SNR.
///
/// # Errors
///
/// * [`VariantError::Signal`] — `target_rate == 0`; nothing is stored.
/// * [`VariantError::Storage`] — the sink failed; variants already stored
///   stay stored and generation stops.
pub fn generate_variants(
    original: &Signal,
    target_rate: u32,
    bit_depths: &[BitDepth],
    base_name: &str,
    sink: &mut dyn VariantSink,
) -> Result<Vec<VariantReport>, VariantError> {
    let sampled = original.resample(target_rate)?;
    log::info!(
        "resampled {} Hz → {} Hz ({} → {} samples)",
        original.sample_rate(),
        target_rate,
        original.len(),
        sampled.len()
    );

    let mut reports = Vec::with_capacity(bit_depths.len());
    for &depth in bit_depths {
        let quantized = sampled.quantize(depth);
        let name = variant_name(base_name, target_rate, depth);

        sink.store(&name, &quantized)
            .map_err(|source| VariantError::Storage {
                name: name.clone(),
                source,
            })?;

        let snr = compute_snr(sampled.samples(), quantized.samples())?;
        log::info!("{name}: SNR {snr}");

        reports.push(VariantReport {
            name,
            bit_depth: depth,
            sample_rate: target_rate,
            len: quantized.len(),
            snr,
        });
    }

    Ok(reports)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::quantize;

    /// Keeps every stored variant in memory.
    #[derive(Default)]
    struct MemorySink {
        stored: Vec<(String, Signal)>,
        fail_on: Option<String>,
    }

    impl VariantSink for MemorySink {
        fn store(&mut self, name: &str, signal: &Signal) -> Result<(), StorageError> {
            if self.fail_on.as_deref() == Some(name) {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.stored.push((name.to_string(), signal.clone()));
            Ok(())
        }
    }

    fn depths(bits: &[u32]) -> Vec<BitDepth> {
        bits.iter().map(|&b| BitDepth::new(b).unwrap()).collect()
    }

    fn sine_signal(rate: u32, secs: f32) -> Signal {
        let n = (rate as f32 * secs) as usize;
        let samples = (0..n)
            .map(|i| 0.6 * (i as f32 * 2.0 * std::f32::consts::PI * 440.0 / rate as f32).sin())
            .collect();
        Signal::new(samples, rate).unwrap()
    }

    #[test]
    fn one_second_sine_to_8k() {
        let original = sine_signal(44_100, 1.0);
        let mut sink = MemorySink::default();

        let reports =
            generate_variants(&original, 8_000, &depths(&[4, 8, 16]), "test", &mut sink)
                .expect("generate");

        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["test_8000Hz_4bit", "test_8000Hz_8bit", "test_8000Hz_16bit"]
        );
        assert_eq!(sink.stored.len(), 3);
        for (report, (name, signal)) in reports.iter().zip(&sink.stored) {
            assert_eq!(&report.name, name);
            assert_eq!(report.len, 8_000);
            assert_eq!(signal.len(), 8_000);
            assert_eq!(signal.sample_rate(), 8_000);
        }

        let snrs: Vec<f64> = reports.iter().map(|r| r.snr.db()).collect();
        assert!(snrs[0] < snrs[1] && snrs[1] < snrs[2], "{snrs:?}");
    }

    #[test]
    fn snr_measured_against_resampled_signal() {
        let original = sine_signal(44_100, 0.1);
        let mut sink = MemorySink::default();
        let reports =
            generate_variants(&original, 11_025, &depths(&[6]), "x", &mut sink).expect("generate");

        let sampled = original.resample(11_025).unwrap();
        let expected = compute_snr(sampled.samples(), &quantize(sampled.samples(), depths(&[6])[0]))
            .unwrap();
        assert_eq!(reports[0].snr, expected);
    }

    #[test]
    fn same_rate_skips_resampling() {
        let original = sine_signal(8_000, 0.25);
        let mut sink = MemorySink::default();
        generate_variants(&original, 8_000, &depths(&[8]), "same", &mut sink).expect("generate");
        assert_eq!(sink.stored[0].1.len(), original.len());
    }

    #[test]
    fn duplicates_processed_in_order() {
        let original = sine_signal(8_000, 0.1);
        let mut sink = MemorySink::default();
        let reports = generate_variants(&original, 4_000, &depths(&[8, 4, 8]), "dup", &mut sink)
            .expect("generate");

        let bits: Vec<u32> = reports.iter().map(|r| r.bit_depth.bits()).collect();
        assert_eq!(bits, vec![8, 4, 8]);
        assert_eq!(reports[0], reports[2]);
        assert_eq!(sink.stored.len(), 3);
    }

    #[test]
    fn empty_depth_list_stores_nothing() {
        let original = sine_signal(8_000, 0.1);
        let mut sink = MemorySink::default();
        let reports = generate_variants(&original, 4_000, &[], "none", &mut sink).expect("generate");
        assert!(reports.is_empty());
        assert!(sink.stored.is_empty());
    }

    #[test]
    fn zero_target_rate_rejected_before_storing() {
        let original = sine_signal(8_000, 0.1);
        let mut sink = MemorySink::default();
        let err = generate_variants(&original, 0, &depths(&[8]), "bad", &mut sink).unwrap_err();
        assert!(matches!(err, VariantError::Signal(SignalError::InvalidSampleRate(0))), "{err}");
        assert!(sink.stored.is_empty());
    }

    #[test]
    fn storage_failure_stops_generation() {
        let original = sine_signal(8_000, 0.1);
        let mut sink = MemorySink {
            fail_on: Some("f_8000Hz_8bit".into()),
            ..Default::default()
        };
        let err = generate_variants(&original, 8_000, &depths(&[4, 8, 16]), "f", &mut sink)
            .unwrap_err();
        assert!(matches!(err, VariantError::Storage { ref name, .. } if name == "f_8000Hz_8bit"));
        assert_eq!(sink.stored.len(), 1);
    }

    #[test]
    fn silent_signal_is_lossless() {
        let original = Signal::new(vec![0.0; 800], 8_000).unwrap();
        let mut sink = MemorySink::default();
        let reports =
            generate_variants(&original, 4_000, &depths(&[4]), "quiet", &mut sink).expect("generate");
        assert!(reports[0].snr.is_lossless());
        assert!(sink.stored[0].1.samples().iter().all(|&s| s == 0.0));
    }
}
