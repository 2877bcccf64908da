//! Configuration module for Sampling Lab.
//!
//! Provides `AppConfig` (top-level settings), the per-session
//! `SessionConfig` the menu edits, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, SessionConfig, StorageConfig};
