//! WAV persistence via `hound`.
//!
//! * [`load_signal`] decodes any PCM/float WAV into a mono [`Signal`] with
//!   samples normalized to `[-1.0, 1.0)`.
//! * [`save_signal`] peak-normalizes to full scale and writes 16-bit mono PCM.
//! * [`WavDirectory`] is the [`VariantSink`] that writes one file per variant.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

use super::resample::downmix_to_mono;
use super::signal::{Signal, SignalError};
use super::variants::VariantSink;

/// Peak value written for a full-scale sample.
const FULL_SCALE: f32 = i16::MAX as f32;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors raised while reading or writing WAV files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid WAV contents: {0}")]
    Signal(#[from] SignalError),
}

// ---------------------------------------------------------------------------
// load / save
// ---------------------------------------------------------------------------

/// `<dir>/<name>.wav`
pub fn wav_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.wav"))
}

/// Decode the WAV file at `path` into a mono [`Signal`].
///
/// Integer PCM is divided by `2^(bits - 1)` (16-bit: `/ 32768`); float PCM is
/// taken as-is.  Multi-channel files are averaged down to mono.
///
/// # Errors
///
/// [`StorageError::NotFound`] when `path` does not exist (checked before any
/// decoding), [`StorageError::Wav`] for malformed files.
pub fn load_signal(path: &Path) -> Result<Signal, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }

    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>()?,
        SampleFormat::Int => {
            let max_value = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<Vec<f32>, hound::Error>>()?
        }
    };

    let samples = downmix_to_mono(&interleaved, spec.channels);
    log::debug!(
        "loaded {} ({} Hz, {} ch, {}-bit {:?}, {} frames)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format,
        samples.len()
    );

    Ok(Signal::new(samples, spec.sample_rate)?)
}

/// Write `signal` to `path` as 16-bit mono PCM, scaled so the peak sample
/// lands at `i16::MAX`.  Conversion truncates toward zero.
///
/// A silent signal (peak of zero) is written as all zeros.
pub fn save_signal(path: &Path, signal: &Signal) -> Result<(), StorageError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let peak = signal.peak();
    let scale = if peak > 0.0 {
        FULL_SCALE / peak
    } else {
        if !signal.is_empty() {
            log::warn!("{} is silent; writing zeros", path.display());
        }
        0.0
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in signal.samples() {
        writer.write_sample((sample * scale) as i16)?;
    }
    writer.finalize()?;

    log::info!("saved {}", path.display());
    Ok(())
}

/// `.wav` files (any letter case) directly inside `dir`, sorted by path.
pub fn list_wav_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// WavDirectory
// ---------------------------------------------------------------------------

/// Stores each variant as `<dir>/<name>.wav`.
#[derive(Debug, Clone)]
pub struct WavDirectory {
    dir: PathBuf,
}

impl WavDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl VariantSink for WavDirectory {
    fn store(&mut self, name: &str, signal: &Signal) -> Result<(), StorageError> {
        save_signal(&wav_path(&self.dir, name), signal)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
