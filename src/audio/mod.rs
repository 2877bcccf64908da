//! Audio core — resampling, quantization, SNR — plus the WAV and device
//! collaborators around it.
//!
//! # Pipeline
//!
//! ```text
//! CpalDevice::capture / wav::load_signal → Signal
//!     → resample(target_rate) → quantize(bits) → compute_snr → WavDirectory
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use sampling_lab::audio::{compute_snr, BitDepth, Signal};
//!
//! let samples: Vec<f32> = (0..44_100).map(|i| (i as f32 * 0.01).sin()).collect();
//! let signal = Signal::new(samples, 44_100).unwrap();
//!
//! let sampled = signal.resample(8_000).unwrap();
//! let quantized = sampled.quantize(BitDepth::new(8).unwrap());
//! let snr = compute_snr(sampled.samples(), quantized.samples()).unwrap();
//! assert_eq!(sampled.len(), 8_000);
//! assert!(snr.db() > 40.0);
//! ```

pub mod device;
pub mod quality;
pub mod quantize;
pub mod resample;
pub mod signal;
pub mod variants;
pub mod wav;

pub use device::{AudioDevice, CpalDevice, DeviceError};
pub use quality::{compute_snr, Snr};
pub use quantize::{quantize, BitDepth, Quantizer};
pub use resample::{downmix_to_mono, resample, resampled_len};
pub use signal::{Signal, SignalError};
pub use variants::{generate_variants, variant_name, VariantError, VariantReport, VariantSink};
pub use wav::{list_wav_files, load_signal, save_signal, wav_path, StorageError, WavDirectory};
