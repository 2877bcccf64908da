//! Application entry point — Sampling Lab.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open the default `cpal` host.
//! 4. Run the interactive menu on stdin/stdout until the user exits.

use sampling_lab::{
    app::App,
    audio::CpalDevice,
    config::{AppConfig, AppPaths},
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sampling Lab starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    let config = AppConfig::load_from(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    log::debug!("session: {:?}", config.session);

    // 3. Audio device
    let device = CpalDevice::new();

    // 4. Menu loop (blocks until exit or end of input)
    let mut app = App::new(device, config).with_settings_path(paths.settings_file);
    let stdin = std::io::stdin();
    app.run(stdin.lock(), std::io::stdout())?;

    log::info!("Sampling Lab finished");
    Ok(())
}
