//! Render settings: defaults, TOML files and validation.
//!
//! Settings resolve in three layers, later layers winning:
//!
//! 1. [`RenderConfig::default`]
//! 2. an optional TOML file (`--config`), any subset of the keys below
//! 3. command-line flags
//!
//! ```toml
//! sample_rate = 44100.0
//! block_size = 256
//! gain_db = -6.0
//! modulator_shape = "triangle"
//! threshold_db = -18.0
//! ratio = 4.0
//! ```

use std::path::Path;

use clap::ValueEnum;
use modfx_core::{DetectionMode, MAX_CHANNELS, Waveshape};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Test signal fed into the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Sine tone at `signal_frequency`
    #[default]
    Sine,
    /// DC at the signal level
    Constant,
}

/// Modulator waveshapes for CLI and config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShapeName {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
}

impl From<ShapeName> for Waveshape {
    fn from(shape: ShapeName) -> Self {
        match shape {
            ShapeName::Sine => Waveshape::Sine,
            ShapeName::Triangle => Waveshape::Triangle,
            ShapeName::Square => Waveshape::Square,
            ShapeName::Saw => Waveshape::Saw,
        }
    }
}

/// Compressor level detectors for CLI and config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectionName {
    Peak,
    #[default]
    Rms,
}

impl From<DetectionName> for DetectionMode {
    fn from(detection: DetectionName) -> Self {
        match detection {
            DetectionName::Peak => DetectionMode::Peak,
            DetectionName::Rms => DetectionMode::Rms,
        }
    }
}

/// Everything `modfx render` needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block handed to the chain.
    pub block_size: usize,
    /// Channel count.
    pub channels: usize,
    /// Rendered length in seconds.
    pub duration: f64,

    /// Test signal kind.
    pub signal: SignalKind,
    /// Test tone frequency in Hz.
    pub signal_frequency: f32,
    /// Test signal level in dBFS.
    pub signal_level_db: f32,

    /// Gain in dB.
    pub gain_db: f32,
    /// Gain modulation depth in [-1, 1].
    pub gain_depth: f32,
    /// Pan position in [-1, 1].
    pub pan: f32,
    /// Pan modulation depth in [-1, 1].
    pub pan_depth: f32,

    /// Modulator waveshape.
    pub modulator_shape: ShapeName,
    /// Modulator rate in Hz.
    pub modulator_frequency: f32,

    /// Compressor threshold in dB.
    pub threshold_db: f32,
    /// Threshold modulation depth in [-1, 1].
    pub threshold_depth: f32,
    /// Compression ratio (n:1).
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Soft knee amount in [0, 1].
    pub knee: f32,
    /// Level detector.
    pub detection: DetectionName,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 512,
            channels: 2,
            duration: 1.0,
            signal: SignalKind::Sine,
            signal_frequency: 440.0,
            signal_level_db: 0.0,
            gain_db: 0.0,
            gain_depth: 0.0,
            pan: 0.0,
            pan_depth: 0.0,
            modulator_shape: ShapeName::Sine,
            modulator_frequency: 2.0,
            threshold_db: 0.0,
            threshold_depth: 0.0,
            ratio: 1.0,
            attack: 0.01,
            release: 0.05,
            knee: 0.0,
            detection: DetectionName::Rms,
        }
    }
}

impl RenderConfig {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::read_config(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Number of samples per channel to render.
    pub fn total_samples(&self) -> usize {
        (self.duration * self.sample_rate).round() as usize
    }

    /// Check every setting, reporting the first one out of range.
    pub fn validate(&self) -> Result<(), CliError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(CliError::invalid(
                "sample_rate",
                format!("must be positive, got {}", self.sample_rate),
            ));
        }
        if self.block_size == 0 {
            return Err(CliError::invalid("block_size", "must be positive"));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(CliError::invalid(
                "channels",
                format!("must be 1 to {MAX_CHANNELS}, got {}", self.channels),
            ));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(CliError::invalid(
                "duration",
                format!("must be non-negative, got {}", self.duration),
            ));
        }

        let nyquist = (self.sample_rate / 2.0) as f32;
        check_range("signal_frequency", self.signal_frequency, 0.0, nyquist)?;
        check_range("modulator_frequency", self.modulator_frequency, 0.0, nyquist)?;
        check_range("gain_depth", self.gain_depth, -1.0, 1.0)?;
        check_range("pan_depth", self.pan_depth, -1.0, 1.0)?;
        check_range("threshold_depth", self.threshold_depth, -1.0, 1.0)?;
        check_range("knee", self.knee, 0.0, 1.0)?;

        if self.ratio.is_nan() || self.ratio < 1.0 {
            return Err(CliError::invalid(
                "ratio",
                format!("must be at least 1, got {}", self.ratio),
            ));
        }
        for (setting, value) in [("attack", self.attack), ("release", self.release)] {
            if value.is_nan() || value <= 0.0 {
                return Err(CliError::invalid(
                    setting,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        for (setting, value) in [
            ("signal_level_db", self.signal_level_db),
            ("gain_db", self.gain_db),
            ("pan", self.pan),
            ("threshold_db", self.threshold_db),
        ] {
            if !value.is_finite() {
                return Err(CliError::invalid(setting, "must be a finite number"));
            }
        }
        Ok(())
    }
}

fn check_range(setting: &'static str, value: f32, min: f32, max: f32) -> Result<(), CliError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CliError::invalid(
            setting,
            format!("must be within [{min}, {max}], got {value}"),
        ))
    }
}
