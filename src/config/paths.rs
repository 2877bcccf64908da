//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir:
//!   Windows: %APPDATA%\sampling-lab\
//!   macOS:   ~/Library/Application Support/sampling-lab/
//!   Linux:   ~/.config/sampling-lab/

use std::path::PathBuf;

/// Resolved application file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "sampling-lab";

    /// Falls back to the current directory if the platform has no config dir.
    pub fn new() -> Self {
        let settings_file = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME)
            .join("settings.toml");

        Self { settings_file }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
