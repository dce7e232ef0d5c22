//! Dump one block of a wave modulator's output.

use clap::Args;
use modfx_core::{ModulationSource, WaveModulator};

use crate::config::ShapeName;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ModulatorArgs {
    /// Modulator waveshape
    #[arg(long, value_enum, default_value_t = ShapeName::Sine)]
    shape: ShapeName,

    /// Modulation rate in Hz
    #[arg(long, default_value = "2.0")]
    frequency: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: f64,

    /// Block length in samples
    #[arg(long, default_value = "32")]
    samples: usize,
}

/// One prepared block of the modulator, each value in `[0, 1]`.
///
/// `frequency` must be below `sample_rate`.
pub fn modulation_block(
    shape: ShapeName,
    frequency: f32,
    sample_rate: f64,
    samples: usize,
) -> Vec<f32> {
    let mut modulator = WaveModulator::new();
    modulator.setup(samples, sample_rate);
    modulator.set_modulation_shape(shape.into());
    modulator.set_frequency(frequency);
    modulator.prepare_modulation_buffer(samples);
    (0..samples).map(|i| modulator.modulation_sample(i)).collect()
}

impl ModulatorArgs {
    /// Reject settings the oscillator cannot run with, including rates above Nyquist.
    pub fn validate(&self) -> Result<(), CliError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(CliError::invalid("sample_rate", "must be positive"));
        }
        if self.samples == 0 {
            return Err(CliError::invalid("samples", "must be positive"));
        }
        let nyquist = self.sample_rate / 2.0;
        let frequency = f64::from(self.frequency);
        if !(0.0..=nyquist).contains(&frequency) {
            return Err(CliError::invalid(
                "frequency",
                format!("must be within [0, {nyquist}], got {}", self.frequency),
            ));
        }
        Ok(())
    }
}

pub fn run(args: ModulatorArgs) -> anyhow::Result<()> {
    args.validate()?;

    tracing::info!(shape = ?args.shape, frequency = args.frequency, "preparing modulator block");
    for (index, value) in
        modulation_block(args.shape, args.frequency, args.sample_rate, args.samples)
            .into_iter()
            .enumerate()
    {
        println!("{index}\t{value:.6}");
    }
    Ok(())
}
