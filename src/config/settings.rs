//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`.
//! Missing keys in `settings.toml` fall back to their defaults.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::audio::quantize::DEFAULT_BIT_DEPTHS;
use crate::audio::{BitDepth, SignalError};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Recording and variant-generation parameters edited from the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Capture rate in Hz.
    pub sample_rate: u32,
    /// Rate variants are resampled to, in Hz.
    pub target_rate: u32,
    /// Capture length in seconds.
    pub duration_secs: f32,
    /// Bit depths generated for every variant run, in order.
    pub bit_depths: Vec<BitDepth>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            target_rate: 44_100,
            duration_secs: 5.0,
            bit_depths: DEFAULT_BIT_DEPTHS.to_vec(),
        }
    }
}

impl SessionConfig {
    /// Check every parameter; bit depths are already valid by construction.
    pub fn validate(&self) -> Result<(), SignalError> {
        check_rate(self.sample_rate)?;
        check_rate(self.target_rate)?;
        check_duration(self.duration_secs)
    }

    /// Use `sample_rate` for both capture and variant generation, and
    /// `duration_secs` for capture.  Nothing changes if either is invalid.
    pub fn set_recording(&mut self, sample_rate: u32, duration_secs: f32) -> Result<(), SignalError> {
        check_rate(sample_rate)?;
        check_duration(duration_secs)?;
        self.sample_rate = sample_rate;
        self.target_rate = sample_rate;
        self.duration_secs = duration_secs;
        Ok(())
    }
}

fn check_rate(rate: u32) -> Result<(), SignalError> {
    if rate == 0 {
        return Err(SignalError::InvalidSampleRate(rate));
    }
    Ok(())
}

fn check_duration(secs: f32) -> Result<(), SignalError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(SignalError::InvalidDuration(secs));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Where recordings are read from and variants are written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use sampling_lab::config::{AppConfig, AppPaths};
///
/// // Returns Default when the file is missing
/// let config = AppConfig::load_from(&AppPaths::new().settings_file).unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load `settings.toml` from `path`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet,
    /// and fails when it parses but holds invalid session values.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.session.validate()?;
        Ok(config)
    }

    /// Write `settings.toml` to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
