//! Interactive text menu.
//!
//! # Options
//!
//! | Key | Action |
//! |-----|--------|
//! | `1` | Record `duration` seconds at `sample_rate` and save `<name>.wav` |
//! | `2` | Generate `<name>_<rate>Hz_<bits>bit.wav` variants from `<name>.wav` |
//! | `3` | Play `<name>.wav` |
//! | `4` | Change sample rate and duration |
//! | `5` | Exit |
//!
//! [`App`] owns the session parameters and the [`AudioDevice`]; the
//! numerical core never sees any of this state.  A failed action prints its
//! error and returns to the menu without side effects.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use crate::audio::{
    generate_variants, list_wav_files, load_signal, save_signal, wav_path, AudioDevice,
    WavDirectory,
};
use crate::config::{AppConfig, SessionConfig};

// ---------------------------------------------------------------------------
// MenuChoice
// ---------------------------------------------------------------------------

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Record,
    GenerateVariants,
    Play,
    ChangeParameters,
    Exit,
}

impl MenuChoice {
    /// Parse the user's answer (surrounding whitespace ignored).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Record),
            "2" => Some(Self::GenerateVariants),
            "3" => Some(Self::Play),
            "4" => Some(Self::ChangeParameters),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "\n======= MAIN MENU =======\n\
1. Record audio and save it under a name\n\
2. Generate resampled / quantized variants of a WAV file\n\
3. Play a WAV file\n\
4. Change recording parameters (sample rate and duration)\n\
5. Exit\n";

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Print `text` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for a file name.  `Err(flow)` tells the caller to stop the action:
    /// at end of input, or after an empty answer has been reported.
    fn file_name(&mut self, text: &str) -> Result<std::result::Result<String, Flow>> {
        let Some(name) = self.prompt(text)? else {
            return Ok(Err(Flow::EndOfInput));
        };
        if name.is_empty() {
            self.say("A file name is required.")?;
            return Ok(Err(Flow::Continue));
        }
        Ok(Ok(name))
    }

    fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The interactive session.
pub struct App<D> {
    device: D,
    config: AppConfig,
    /// Where option 4 persists the session; `None` keeps it in memory only.
    settings_path: Option<PathBuf>,
}

impl<D: AudioDevice> App<D> {
    pub fn new(device: D, config: AppConfig) -> Self {
        Self {
            device,
            config,
            settings_path: None,
        }
    }

    /// Persist parameter changes to `path`.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn session(&self) -> &SessionConfig {
        &self.config.session
    }

    /// Run the menu loop until the user exits or `input` is exhausted.
    ///
    /// Only failures to read `input` or write `output` are returned; action
    /// errors are reported to the user and the loop continues.
    pub fn run(&mut self, input: impl BufRead, output: impl Write) -> Result<()> {
        let mut console = Console { input, output };

        loop {
            console.say(MENU)?;
            let Some(answer) = console.prompt("Choose an option (1-5): ")? else {
                break;
            };

            let outcome = match MenuChoice::parse(&answer) {
                Some(MenuChoice::Record) => self.record(&mut console),
                Some(MenuChoice::GenerateVariants) => self.generate(&mut console),
                Some(MenuChoice::Play) => self.play(&mut console),
                Some(MenuChoice::ChangeParameters) => self.change_parameters(&mut console),
                Some(MenuChoice::Exit) => {
                    console.say("Goodbye.")?;
                    break;
                }
                None => console
                    .say("Unknown option. Choose 1 to 5.")
                    .map(|()| Flow::Continue),
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::EndOfInput) => break,
                Err(e) => {
                    log::warn!("menu action failed: {e:#}");
                    console.say(format!("Error: {e:#}"))?;
                }
            }
        }

        Ok(())
    }

    fn record<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<Flow> {
        let name = match console.file_name("File name (without extension): ")? {
            Ok(name) => name,
            Err(flow) => return Ok(flow),
        };

        let session = &self.config.session;
        console.say(format!(
            "\nRecording for {} s at {} Hz...",
            session.duration_secs, session.sample_rate
        ))?;
        let signal = self
            .device
            .capture(session.duration_secs, session.sample_rate)?;

        let path = wav_path(&self.config.storage.output_dir, &name);
        save_signal(&path, &signal)?;
        console.say(format!("Saved as: {}", path.display()))?;
        Ok(Flow::Continue)
    }

    fn generate<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<Flow> {
        self.show_available(console)?;
        let name = match console.file_name("Existing WAV file name (without extension): ")? {
            Ok(name) => name,
            Err(flow) => return Ok(flow),
        };

        let path = wav_path(&self.config.storage.output_dir, &name);
        if !path.is_file() {
            console.say("File does not exist. Record or copy a file first.")?;
            return Ok(Flow::Continue);
        }

        let signal = load_signal(&path)?;
        let session = &self.config.session;
        console.say(format!(
            "Generating variants at {} Hz...",
            session.target_rate
        ))?;

        let mut sink = WavDirectory::new(&self.config.storage.output_dir);
        let reports = generate_variants(
            &signal,
            session.target_rate,
            &session.bit_depths,
            &name,
            &mut sink,
        )?;
        for report in &reports {
            console.say(format!(
                "  -> {} bits: {}.wav  SNR: {}",
                report.bit_depth, report.name, report.snr
            ))?;
        }
        Ok(Flow::Continue)
    }

    fn play<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<Flow> {
        self.show_available(console)?;
        let name = match console.file_name("File name to play (without extension): ")? {
            Ok(name) => name,
            Err(flow) => return Ok(flow),
        };

        let path = wav_path(&self.config.storage.output_dir, &name);
        if !path.is_file() {
            console.say("File does not exist.")?;
            return Ok(Flow::Continue);
        }

        let signal = load_signal(&path)?;
        console.say(format!("\nPlaying ({} Hz)...", signal.sample_rate()))?;
        self.device.play(&signal)?;
        console.say("Playback finished.")?;
        Ok(Flow::Continue)
    }

    fn change_parameters<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<Flow> {
        let Some(rate) = console.prompt("New sample rate (e.g. 44100): ")? else {
            return Ok(Flow::EndOfInput);
        };
        let Ok(rate) = rate.parse::<u32>() else {
            console.say("Invalid input. Try again.")?;
            return Ok(Flow::Continue);
        };
        let Some(duration) = console.prompt("New recording duration (seconds): ")? else {
            return Ok(Flow::EndOfInput);
        };
        let Ok(duration) = duration.parse::<f32>() else {
            console.say("Invalid input. Try again.")?;
            return Ok(Flow::Continue);
        };

        self.config.session.set_recording(rate, duration)?;
        console.say(format!("Set: {rate} Hz, {duration} s"))?;

        if let Some(path) = &self.settings_path {
            if let Err(e) = self.config.save_to(path) {
                log::warn!("could not save settings to {}: {e:#}", path.display());
            }
        }
        Ok(Flow::Continue)
    }

    fn show_available<R: BufRead, W: Write>(&self, console: &mut Console<R, W>) -> Result<()> {
        let files = match list_wav_files(&self.config.storage.output_dir) {
            Ok(files) => files,
            Err(e) => {
                log::debug!("cannot list WAV files: {e}");
                return Ok(());
            }
        };
        if files.is_empty() {
            return Ok(());
        }

        console.say("Available WAV files:")?;
        for file in files {
            if let Some(stem) = file.file_stem() {
                console.say(format!("  {}", stem.to_string_lossy()))?;
            }
        }
        Ok(())
    }
}

/// What the menu loop does after an action.
enum Flow {
    Continue,
    EndOfInput,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{DeviceError, Signal};
    use std::cell::RefCell;
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    /// Scripted device: captures a sine, records playback lengths.
    #[derive(Default)]
    struct FakeDevice {
        fail: bool,
        played: RefCell<Vec<(usize, u32)>>,
    }

    impl AudioDevice for FakeDevice {
        fn capture(&self, duration_secs: f32, sample_rate: u32) -> Result<Signal, DeviceError> {
            if self.fail {
                return Err(DeviceError::NoInputDevice);
            }
            let n = (duration_secs as f64 * sample_rate as f64) as usize;
            let samples = (0..n)
                .map(|i| 0.5 * (i as f32 * 2.0 * std::f32::consts::PI * 440.0 / sample_rate as f32).sin())
                .collect();
            Ok(Signal::new(samples, sample_rate)?)
        }

        fn play(&self, signal: &Signal) -> Result<(), DeviceError> {
            if self.fail {
                return Err(DeviceError::NoOutputDevice);
            }
            self.played
                .borrow_mut()
                .push((signal.len(), signal.sample_rate()));
            Ok(())
        }
    }

    fn app_in(dir: &TempDir, device: FakeDevice) -> App<FakeDevice> {
        let mut config = AppConfig::default();
        config.storage.output_dir = dir.path().to_path_buf();
        App::new(device, config)
    }

    fn run(app: &mut App<FakeDevice>, script: &str) -> String {
        let mut output = Vec::new();
        app.run(Cursor::new(script.as_bytes()), &mut output)
            .expect("run");
        String::from_utf8(output).expect("utf8")
    }

    #[test]
    fn parse_menu_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Record));
        assert_eq!(MenuChoice::parse(" 2 \n"), Some(MenuChoice::GenerateVariants));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::Play));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::ChangeParameters));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn exit_option_ends_loop() {
        let dir = tempdir().expect("temp dir");
        let out = run(&mut app_in(&dir, FakeDevice::default()), "5\n");
        assert!(out.contains("MAIN MENU"));
        assert!(out.contains("Goodbye."));
    }

    #[test]
    fn end_of_input_ends_loop() {
        let dir = tempdir().expect("temp dir");
        let out = run(&mut app_in(&dir, FakeDevice::default()), "");
        assert!(out.contains("MAIN MENU"));
        assert!(!out.contains("Goodbye."));
    }

    #[test]
    fn unknown_option_reported() {
        let dir = tempdir().expect("temp dir");
        let out = run(&mut app_in(&dir, FakeDevice::default()), "9\n5\n");
        assert!(out.contains("Unknown option"));
    }

    #[test]
    fn record_then_generate_variants() {
        let dir = tempdir().expect("temp dir");
        let mut app = app_in(&dir, FakeDevice::default());
        let out = run(&mut app, "4\n8000\n0.5\n1\nclip\n2\nclip\n5\n");

        let recording = load_signal(&dir.path().join("clip.wav")).expect("recording");
        assert_eq!(recording.sample_rate(), 8_000);
        assert_eq!(recording.len(), 4_000);

        for bits in [4, 8, 16] {
            let path = dir.path().join(format!("clip_8000Hz_{bits}bit.wav"));
            let variant = load_signal(&path).expect("variant");
            assert_eq!(variant.len(), 4_000);
        }
        assert_eq!(out.matches("SNR:").count(), 3, "{out}");
        assert!(out.contains("Available WAV files:"));
    }

    #[test]
    fn generate_from_missing_file_reports_and_writes_nothing() {
        let dir = tempdir().expect("temp dir");
        let out = run(&mut app_in(&dir, FakeDevice::default()), "2\nghost\n5\n");
        assert!(out.contains("File does not exist"));
        assert!(list_wav_files(dir.path()).expect("list").is_empty());
    }

    #[test]
    fn empty_file_name_rejected_by_every_file_option() {
        let dir = tempdir().expect("temp dir");
        let mut app = app_in(&dir, FakeDevice::default());
        let out = run(&mut app, "1

2

3

5
");
        assert_eq!(out.matches("A file name is required.").count(), 3, "{out}");
        assert!(!out.contains("File does not exist"), "{out}");
        assert!(app.device.played.borrow().is_empty());
        assert!(list_wav_files(dir.path()).expect("list").is_empty());
    }

    #[test]
    fn play_loaded_file() {
        let dir = tempdir().expect("temp dir");
        let signal = Signal::new(vec![0.1, -0.2, 0.3], 22_050).unwrap();
        save_signal(&dir.path().join("tone.wav"), &signal).expect("save");

        let mut app = app_in(&dir, FakeDevice::default());
        let out = run(&mut app, "3\ntone\n5\n");
        assert!(out.contains("Playback finished."));
        assert_eq!(*app.device.played.borrow(), vec![(3, 22_050)]);
    }

    #[test]
    fn device_failure_reported_without_output() {
        let dir = tempdir().expect("temp dir");
        let device = FakeDevice {
            fail: true,
            ..Default::default()
        };
        let out = run(&mut app_in(&dir, device), "1\nclip\n5\n");
        assert!(out.contains("Error: no input device"), "{out}");
        assert!(!dir.path().join("clip.wav").exists());
        assert!(out.contains("Goodbye."));
    }

    #[test]
    fn invalid_parameters_leave_session_unchanged() {
        let dir = tempdir().expect("temp dir");
        let mut app = app_in(&dir, FakeDevice::default());
        let out = run(&mut app, "4\nabc\n4\n0\n1\n4\n8000\n-2\n5\n");
        assert!(out.contains("Invalid input"));
        assert!(out.contains("invalid sample rate"));
        assert!(out.contains("invalid duration"));
        assert_eq!(app.session(), &SessionConfig::default());
    }

    #[test]
    fn parameter_change_is_persisted() {
        let dir = tempdir().expect("temp dir");
        let settings = dir.path().join("settings.toml");
        let mut app = app_in(&dir, FakeDevice::default()).with_settings_path(&settings);
        let out = run(&mut app, "4\n16000\n2\n5\n");
        assert!(out.contains("Set: 16000 Hz, 2 s"));

        let saved = AppConfig::load_from(&settings).expect("load");
        assert_eq!(saved.session.sample_rate, 16_000);
        assert_eq!(saved.session.target_rate, 16_000);
        assert_eq!(saved.session.duration_secs, 2.0);
    }
}
