//! Blocking microphone capture and speaker playback via `cpal`.
//!
//! [`AudioDevice`] is the seam the menu talks to; [`CpalDevice`] is the
//! production implementation on the system default host.  Both operations
//! block the calling thread until the requested audio has been recorded or
//! handed to the device.
//!
//! When the device cannot run at the requested rate, its default stream
//! configuration is used instead and audio is converted to and from the
//! device rate with `rubato`.  `f32`, `i16` and `u16` sample formats are
//! accepted.

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    FromSample, Sample, SampleFormat, SampleRate, SizedSample, SupportedStreamConfig,
    SupportedStreamConfigRange,
};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;

use super::resample::downmix_to_mono;
use super::signal::{Signal, SignalError};

/// Time allowed for the last output buffer to leave the device after the
/// final sample has been queued.
const PLAYBACK_TAIL: Duration = Duration::from_millis(150);

/// Input frames handed to the rate converter per call.
const CONVERT_CHUNK: usize = 1024;

/// One captured buffer (interleaved, converted to `f32`) or the stream error
/// that ended capture.
type CaptureMessage = Result<Vec<f32>, cpal::StreamError>;

/// Sent once playback has queued its last sample, or when the stream fails.
type PlaybackMessage = Result<(), cpal::StreamError>;

// ---------------------------------------------------------------------------
// DeviceError
// ---------------------------------------------------------------------------

/// Errors that can occur while recording or playing audio.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no input device found on the default audio host")]
    NoInputDevice,

    #[error("no output device found on the default audio host")]
    NoOutputDevice,

    #[error("unsupported device sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error(transparent)]
    InvalidRequest(#[from] SignalError),

    #[error("failed to query supported stream configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to query default stream config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio stream failed: {0}")]
    Stream(#[from] cpal::StreamError),

    #[error("audio stream closed before completion")]
    StreamClosed,

    #[error("failed to set up rate conversion: {0}")]
    ConverterSetup(#[from] rubato::ResamplerConstructionError),

    #[error("rate conversion failed: {0}")]
    Convert(#[from] rubato::ResampleError),
}

// ---------------------------------------------------------------------------
// AudioDevice trait
// ---------------------------------------------------------------------------

/// Blocking capture / playback.
pub trait AudioDevice {
    /// Record `duration_secs` of mono audio at `sample_rate` Hz.
    ///
    /// The result holds `trunc(duration_secs * sample_rate)` samples.
    fn capture(&self, duration_secs: f32, sample_rate: u32) -> Result<Signal, DeviceError>;

    /// Play `signal` at its own sample rate and return once it has finished.
    fn play(&self, signal: &Signal) -> Result<(), DeviceError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioDevice>) {}
};

/// Number of frames a capture of `duration_secs` at `sample_rate` Hz yields.
pub fn capture_frames(duration_secs: f32, sample_rate: u32) -> Result<usize, SignalError> {
    if sample_rate == 0 {
        return Err(SignalError::InvalidSampleRate(sample_rate));
    }
    if !(duration_secs.is_finite() && duration_secs > 0.0) {
        return Err(SignalError::InvalidDuration(duration_secs));
    }
    Ok((duration_secs as f64 * sample_rate as f64) as usize)
}

fn is_streamable(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16)
}

/// Choose a configuration that runs at `sample_rate`, preferring `f32`
/// samples and then the fewest channels.
///
/// Returns `default` when no range covers the rate in a usable format; the
/// caller then converts between `sample_rate` and the default's rate.
pub fn pick_config(
    ranges: impl IntoIterator<Item = SupportedStreamConfigRange>,
    sample_rate: u32,
    default: SupportedStreamConfig,
) -> SupportedStreamConfig {
    let rate = SampleRate(sample_rate);
    ranges
        .into_iter()
        .filter(|r| is_streamable(r.sample_format()))
        .filter(|r| r.min_sample_rate() <= rate && rate <= r.max_sample_rate())
        .min_by_key(|r| (r.sample_format() != SampleFormat::F32, r.channels()))
        .map(|r| r.with_sample_rate(rate))
        .unwrap_or(default)
}

/// Convert mono `samples` from `from` Hz to `to` Hz with a windowed-sinc
/// filter.  The output holds `round(len * to / from)` samples.
pub fn convert_rate(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, DeviceError> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to as f64 / from as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CONVERT_CHUNK, 1)?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut out = Vec::with_capacity(delay + expected);

    let mut chunks = samples.chunks_exact(CONVERT_CHUNK);
    for chunk in &mut chunks {
        let mut frames = resampler.process(std::slice::from_ref(&chunk), None)?;
        out.append(&mut frames[0]);
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut frames = resampler.process_partial(Some(std::slice::from_ref(&rest)), None)?;
        out.append(&mut frames[0]);
    }
    // Flush the filter delay.
    while out.len() < delay + expected {
        let mut frames = resampler.process_partial::<&[f32]>(None, None)?;
        if frames[0].is_empty() {
            break;
        }
        out.append(&mut frames[0]);
    }

    out.drain(..delay.min(out.len()));
    out.resize(expected, 0.0);
    Ok(out)
}

/// Receive captured buffers until `frames` mono frames are collected.
fn collect_frames(
    rx: &mpsc::Receiver<CaptureMessage>,
    frames: usize,
    channels: u16,
) -> Result<Vec<f32>, DeviceError> {
    let mut samples = Vec::with_capacity(frames);
    while samples.len() < frames {
        let chunk = rx.recv().map_err(|_| DeviceError::StreamClosed)??;
        samples.extend(downmix_to_mono(&chunk, channels));
    }
    samples.truncate(frames);
    Ok(samples)
}

/// Block until the playback callback reports completion or failure.
fn wait_for_playback(rx: &mpsc::Receiver<PlaybackMessage>) -> Result<(), DeviceError> {
    rx.recv().map_err(|_| DeviceError::StreamClosed)??;
    Ok(())
}

fn build_capture_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: mpsc::Sender<CaptureMessage>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let err_tx = tx.clone();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Ignore send errors; capture may already have finished.
            let _ = tx.send(Ok(data.iter().map(|&s| s.to_sample::<f32>()).collect()));
        },
        move |err: cpal::StreamError| {
            log::error!("cpal input stream error: {err}");
            let _ = err_tx.send(Err(err));
        },
        None,
    )
}

fn build_playback_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    data: Vec<f32>,
    done_tx: mpsc::Sender<PlaybackMessage>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = (config.channels as usize).max(1);
    let err_tx = done_tx.clone();
    let mut pos = 0usize;
    device.build_output_stream(
        config,
        move |out: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in out.chunks_mut(channels) {
                frame.fill(T::from_sample(data.get(pos).copied().unwrap_or(0.0)));
                pos += 1;
            }
            if pos >= data.len() {
                let _ = done_tx.send(Ok(()));
            }
        },
        move |err: cpal::StreamError| {
            log::error!("cpal output stream error: {err}");
            let _ = err_tx.send(Err(err));
        },
        None,
    )
}

// ---------------------------------------------------------------------------
// CpalDevice
// ---------------------------------------------------------------------------

/// [`AudioDevice`] backed by the default `cpal` host.
pub struct CpalDevice {
    host: cpal::Host,
}

impl Default for CpalDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalDevice {
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::debug!("audio host: {:?}", host.id());
        Self { host }
    }
}

impl AudioDevice for CpalDevice {
    fn capture(&self, duration_secs: f32, sample_rate: u32) -> Result<Signal, DeviceError> {
        let frames = capture_frames(duration_secs, sample_rate)?;

        let device = self
            .host
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)?;
        let supported = pick_config(
            device.supported_input_configs()?,
            sample_rate,
            device.default_input_config()?,
        );
        let channels = supported.channels();
        let device_rate = supported.sample_rate().0;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let device_frames = capture_frames(duration_secs, device_rate)?;

        let (tx, rx) = mpsc::channel::<CaptureMessage>();
        let stream = match format {
            SampleFormat::F32 => build_capture_stream::<f32>(&device, &config, tx)?,
            SampleFormat::I16 => build_capture_stream::<i16>(&device, &config, tx)?,
            SampleFormat::U16 => build_capture_stream::<u16>(&device, &config, tx)?,
            other => return Err(DeviceError::UnsupportedFormat(other)),
        };
        stream.play()?;
        log::info!(
            "recording {duration_secs} s at {device_rate} Hz ({channels} ch, {format:?})"
        );

        let captured = collect_frames(&rx, device_frames, channels);
        drop(stream);

        let mut samples = convert_rate(&captured?, device_rate, sample_rate)?;
        if device_rate != sample_rate {
            log::debug!("converted capture {device_rate} Hz -> {sample_rate} Hz");
        }
        samples.resize(frames, 0.0);
        Ok(Signal::new(samples, sample_rate)?)
    }

    fn play(&self, signal: &Signal) -> Result<(), DeviceError> {
        if signal.is_empty() {
            return Ok(());
        }

        let sample_rate = signal.sample_rate();
        let device = self
            .host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        let supported = pick_config(
            device.supported_output_configs()?,
            sample_rate,
            device.default_output_config()?,
        );
        let device_rate = supported.sample_rate().0;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let data = convert_rate(signal.samples(), sample_rate, device_rate)?;
        if device_rate != sample_rate {
            log::debug!("converted playback {sample_rate} Hz -> {device_rate} Hz");
        }

        let (done_tx, done_rx) = mpsc::channel::<PlaybackMessage>();
        let stream = match format {
            SampleFormat::F32 => build_playback_stream::<f32>(&device, &config, data, done_tx)?,
            SampleFormat::I16 => build_playback_stream::<i16>(&device, &config, data, done_tx)?,
            SampleFormat::U16 => build_playback_stream::<u16>(&device, &config, data, done_tx)?,
            other => return Err(DeviceError::UnsupportedFormat(other)),
        };
        stream.play()?;
        log::info!("playing {:.2} s at {sample_rate} Hz", signal.duration_secs());

        wait_for_playback(&done_rx)?;
        std::thread::sleep(PLAYBACK_TAIL);
        drop(stream);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
