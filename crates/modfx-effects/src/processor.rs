//! Closed set of effects behind one concrete type.

use modfx_core::{AudioBufferInfo, AudioEffect, Sample};

use crate::{Compressor, Gain, Panner};

/// Any effect in this crate.
///
/// Use it where a chain is assembled at runtime but the set of effects is
/// known: it dispatches with a `match` instead of a vtable and needs no
/// boxing.
///
/// # Example
///
/// ```rust
/// use modfx_core::AudioEffect;
/// use modfx_effects::{Gain, Panner, Processor};
///
/// let mut chain: Vec<Processor<f32>> = vec![Gain::new().into(), Panner::new().into()];
/// for effect in &mut chain {
///     effect.setup(48000.0, 256, 2);
/// }
/// assert_eq!(chain[1].name(), "panner");
/// ```
#[derive(Debug)]
pub enum Processor<T: Sample> {
    /// See [`Gain`]
    Gain(Gain<T>),
    /// See [`Panner`]
    Panner(Panner<T>),
    /// See [`Compressor`]
    Compressor(Compressor<T>),
}

impl<T: Sample> Processor<T> {
    /// Short lowercase name of the wrapped effect.
    pub fn name(&self) -> &'static str {
        match self {
            Processor::Gain(_) => "gain",
            Processor::Panner(_) => "panner",
            Processor::Compressor(_) => "compressor",
        }
    }
}

impl<T: Sample> AudioEffect<T> for Processor<T> {
    fn setup(&mut self, sample_rate: f64, max_buffer_size: usize, num_channels: usize) {
        match self {
            Processor::Gain(effect) => effect.setup(sample_rate, max_buffer_size, num_channels),
            Processor::Panner(effect) => effect.setup(sample_rate, max_buffer_size, num_channels),
            Processor::Compressor(effect) => {
                effect.setup(sample_rate, max_buffer_size, num_channels)
            }
        }
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        match self {
            Processor::Gain(effect) => effect.process_audio(buffer),
            Processor::Panner(effect) => effect.process_audio(buffer),
            Processor::Compressor(effect) => effect.process_audio(buffer),
        }
    }
}

impl<T: Sample> From<Gain<T>> for Processor<T> {
    fn from(effect: Gain<T>) -> Self {
        Processor::Gain(effect)
    }
}

impl<T: Sample> From<Panner<T>> for Processor<T> {
    fn from(effect: Panner<T>) -> Self {
        Processor::Panner(effect)
    }
}

impl<T: Sample> From<Compressor<T>> for Processor<T> {
    fn from(effect: Compressor<T>) -> Self {
        Processor::Compressor(effect)
    }
}
