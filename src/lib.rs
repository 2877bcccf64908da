//! Sampling Lab — record audio, resample it, quantize it to arbitrary bit
//! depths and measure the damage with SNR.
//!
//! The numerical core lives in [`audio`] (resampler, quantizer, SNR, variant
//! generation).  [`config`] persists the session settings and [`app`] drives
//! the interactive text menu.

pub mod app;
pub mod audio;
pub mod config;
