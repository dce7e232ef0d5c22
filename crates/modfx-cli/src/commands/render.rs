//! Offline render through gain → panner → compressor.

use std::path::PathBuf;

use clap::Args;
use modfx_core::{
    AudioBufferInfo, AudioEffect, BasicOscillator, EffectExt, ModulationSource, Oscillator,
    WaveModulator, Waveshape, amplitude_to_decibels,
};
use modfx_effects::{Compressor, Gain, Panner, decibels_to_gain};

use crate::config::{DetectionName, RenderConfig, ShapeName, SignalKind};
use crate::error::CliError;

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// TOML file with render settings (flags override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sample rate in Hz [default: 48000]
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Samples per processing block [default: 512]
    #[arg(long)]
    block_size: Option<usize>,

    /// Number of channels [default: 2]
    #[arg(long)]
    channels: Option<usize>,

    /// Length in seconds [default: 1.0]
    #[arg(long)]
    duration: Option<f64>,

    /// Test signal [default: sine]
    #[arg(long, value_enum)]
    signal: Option<SignalKind>,

    /// Test tone frequency in Hz [default: 440]
    #[arg(long)]
    signal_frequency: Option<f32>,

    /// Test signal level in dBFS [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    signal_level_db: Option<f32>,

    /// Gain in dB [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    gain_db: Option<f32>,

    /// Gain modulation depth, -1 to 1 [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    gain_depth: Option<f32>,

    /// Pan position, -1 (left) to 1 (right) [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pan: Option<f32>,

    /// Pan modulation depth, -1 to 1 [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pan_depth: Option<f32>,

    /// Modulator waveshape [default: sine]
    #[arg(long, value_enum)]
    modulator_shape: Option<ShapeName>,

    /// Modulator rate in Hz [default: 2]
    #[arg(long)]
    modulator_frequency: Option<f32>,

    /// Compressor threshold in dB [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    threshold_db: Option<f32>,

    /// Threshold modulation depth, -1 to 1 [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    threshold_depth: Option<f32>,

    /// Compression ratio [default: 1]
    #[arg(long)]
    ratio: Option<f32>,

    /// Attack time in seconds [default: 0.01]
    #[arg(long)]
    attack: Option<f32>,

    /// Release time in seconds [default: 0.05]
    #[arg(long)]
    release: Option<f32>,

    /// Soft knee amount, 0 to 1 [default: 0]
    #[arg(long)]
    knee: Option<f32>,

    /// Compressor level detector [default: rms]
    #[arg(long, value_enum)]
    detection: Option<DetectionName>,
}

macro_rules! apply_overrides {
    ($args:expr, $config:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $args.$field {
                $config.$field = value;
            }
        )*
    };
}

impl RenderArgs {
    /// Defaults, then the config file, then explicit flags; validated.
    pub fn resolve(&self) -> Result<RenderConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };
        apply_overrides!(
            self,
            config,
            [
                sample_rate,
                block_size,
                channels,
                duration,
                signal,
                signal_frequency,
                signal_level_db,
                gain_db,
                gain_depth,
                pan,
                pan_depth,
                modulator_shape,
                modulator_frequency,
                threshold_db,
                threshold_depth,
                ratio,
                attack,
                release,
                knee,
                detection,
            ]
        );
        config.validate()?;
        Ok(config)
    }
}

/// Output levels of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelLevels {
    /// Largest absolute sample.
    pub peak: f32,
    /// Root mean square over the whole render.
    pub rms: f32,
}

/// Summary of a finished render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    /// Samples rendered per channel.
    pub samples: usize,
    /// Blocks handed to the chain.
    pub blocks: usize,
    /// Per-channel output levels.
    pub channels: Vec<ChannelLevels>,
    /// Compressor gain reduction at the last sample, in dB.
    pub gain_reduction_db: f32,
}

#[derive(Default, Clone, Copy)]
struct Meter {
    peak: f32,
    sum_squares: f64,
    count: usize,
}

impl Meter {
    fn add(&mut self, samples: &[f32]) {
        for &s in samples {
            self.peak = self.peak.max(s.abs());
            self.sum_squares += f64::from(s) * f64::from(s);
        }
        self.count += samples.len();
    }

    fn levels(&self) -> ChannelLevels {
        let rms = if self.count == 0 {
            0.0
        } else {
            (self.sum_squares / self.count as f64).sqrt() as f32
        };
        ChannelLevels {
            peak: self.peak,
            rms,
        }
    }
}

/// Run the test signal through the chain as a host would, block by block.
///
/// `config` must already be validated.
pub fn render(config: &RenderConfig) -> RenderReport {
    let block_size = config.block_size;
    let num_channels = config.channels;

    let mut modulator = WaveModulator::<f32>::new();
    modulator.setup(block_size, config.sample_rate);
    modulator.set_modulation_shape(config.modulator_shape.into());
    modulator.set_frequency(config.modulator_frequency);

    let mut gain = Gain::new();
    let mut panner = Panner::new();
    let mut compressor = Compressor::new();
    gain.set_gain_modulation_source(Some(modulator.shared()));
    panner.set_panner_modulation_source(Some(modulator.shared()));
    compressor.set_threshold_modulation_source(Some(modulator.shared()));
    compressor.set_envelope_type(config.detection.into());

    let gain_controls = gain.controls();
    let panner_controls = panner.controls();
    let compressor_controls = compressor.controls();

    let mut chain = gain.chain(panner).chain(compressor);
    chain.setup(config.sample_rate, block_size, num_channels);

    let mut tone = BasicOscillator::new(config.sample_rate, config.signal_frequency);
    tone.set_waveshape(Waveshape::Sine);
    let level = decibels_to_gain(config.signal_level_db);

    let mut storage = vec![vec![0.0_f32; block_size]; num_channels];
    let mut meters = vec![Meter::default(); num_channels];
    let total = config.total_samples();
    let mut rendered = 0;
    let mut blocks = 0;

    while rendered < total {
        let num_samples = block_size.min(total - rendered);

        modulator.prepare_modulation_buffer(num_samples);
        gain_controls.set_decibels(config.gain_db, config.gain_depth);
        panner_controls.set_panning(config.pan, config.pan_depth);
        compressor_controls.set_threshold(config.threshold_db, config.threshold_depth);
        compressor_controls.set_ratio(config.ratio, 0.0);
        compressor_controls.set_attack(config.attack, 0.0);
        compressor_controls.set_release(config.release, 0.0);
        compressor_controls.set_knee(config.knee, 0.0);

        for index in 0..num_samples {
            let sample = match config.signal {
                SignalKind::Sine => tone.next_sample() * level,
                SignalKind::Constant => level,
            };
            for channel in &mut storage {
                channel[index] = sample;
            }
        }

        let mut buffer = AudioBufferInfo::from_channels(
            num_samples,
            storage.iter_mut().map(|channel| &mut channel[..num_samples]),
        );
        chain.process_audio(&mut buffer);
        for (channel, meter) in meters.iter_mut().enumerate() {
            meter.add(buffer.channel(channel));
        }

        rendered += num_samples;
        blocks += 1;
    }

    tracing::debug!(rendered, blocks, "render finished");

    RenderReport {
        samples: rendered,
        blocks,
        channels: meters.iter().map(Meter::levels).collect(),
        gain_reduction_db: chain.second().gain_reduction_db(),
    }
}

/// Format an amplitude as dBFS, with `-inf` for silence.
fn format_dbfs(amplitude: f32) -> String {
    if amplitude > 0.0 {
        format!("{:.2}", amplitude_to_decibels(amplitude))
    } else {
        "-inf".to_string()
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    tracing::info!(
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        channels = config.channels,
        duration = config.duration,
        "rendering"
    );

    let report = render(&config);

    println!(
        "Rendered {} samples x {} channels at {} Hz ({} blocks)",
        report.samples, config.channels, config.sample_rate, report.blocks
    );
    for (channel, levels) in report.channels.iter().enumerate() {
        println!(
            "  channel {channel}: peak {} dBFS, rms {} dBFS",
            format_dbfs(levels.peak),
            format_dbfs(levels.rms)
        );
    }
    println!("Gain reduction: {:.2} dB", report.gain_reduction_db);

    Ok(())
}
