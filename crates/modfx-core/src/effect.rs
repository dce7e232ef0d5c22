//! The block-processing effect interface.
//!
//! Every processor in the toolkit implements [`AudioEffect`]: it is set up
//! once per configuration change and then transforms an [`AudioBufferInfo`]
//! in place, once per block.
//!
//! ## Design Decisions
//!
//! - **In place**: the host's channel memory is both input and output. No
//!   effect allocates or copies a block.
//!
//! - **Channel-major**: implementations walk every sample of channel 0, then
//!   channel 1, and so on. Per-channel parameter state makes this order
//!   observable only through shared modulation reads, which are indexed by
//!   sample and therefore identical for every channel.
//!
//! - **Object-safe**: `Box<dyn AudioEffect<f32>>` works for runtime chains;
//!   static dispatch through [`EffectExt::chain`] is preferred.

use crate::buffer::AudioBufferInfo;
use crate::math::Sample;

/// Core trait for all block processors.
///
/// # Example
///
/// ```rust
/// use modfx_core::{AudioBufferInfo, AudioEffect};
///
/// struct Invert;
///
/// impl AudioEffect<f32> for Invert {
///     fn setup(&mut self, _sample_rate: f64, _max_buffer_size: usize, _num_channels: usize) {}
///
///     fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, f32>) {
///         for channel in 0..buffer.num_channels() {
///             for sample in buffer.channel_data(channel) {
///                 *sample = -*sample;
///             }
///         }
///     }
/// }
///
/// let mut data = [0.5_f32; 4];
/// let mut buffer = AudioBufferInfo::new();
/// buffer.append_channel(4, &mut data, 0);
/// Invert.process_audio(&mut buffer);
/// assert_eq!(buffer.channel(0), &[-0.5; 4]);
/// ```
pub trait AudioEffect<T: Sample> {
    /// Prepare for a sample rate, a largest block size and a channel count.
    ///
    /// Resets every internal ramp to its initial value. May allocate; call
    /// outside the audio callback.
    fn setup(&mut self, sample_rate: f64, max_buffer_size: usize, num_channels: usize);

    /// Transform every channel of `buffer` in place.
    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>);
}

impl<T: Sample, E: AudioEffect<T> + ?Sized> AudioEffect<T> for &mut E {
    fn setup(&mut self, sample_rate: f64, max_buffer_size: usize, num_channels: usize) {
        (**self).setup(sample_rate, max_buffer_size, num_channels);
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        (**self).process_audio(buffer);
    }
}

/// Extension trait for chaining effects.
///
/// For dynamic chains, use `Vec<Box<dyn AudioEffect<T>>>` instead.
pub trait EffectExt<T: Sample>: AudioEffect<T> + Sized {
    /// Run `self`, then `next`, over the same buffer.
    ///
    /// ```rust,ignore
    /// let mut chain = gain.chain(panner).chain(compressor);
    /// ```
    fn chain<E: AudioEffect<T>>(self, next: E) -> Chain<Self, E> {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<T: Sample, E: AudioEffect<T>> EffectExt<T> for E {}

/// Two effects in series.
///
/// Created by [`EffectExt::chain`].
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<T: Sample, A: AudioEffect<T>, B: AudioEffect<T>> AudioEffect<T> for Chain<A, B> {
    fn setup(&mut self, sample_rate: f64, max_buffer_size: usize, num_channels: usize) {
        self.first.setup(sample_rate, max_buffer_size, num_channels);
        self.second.setup(sample_rate, max_buffer_size, num_channels);
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        self.first.process_audio(buffer);
        self.second.process_audio(buffer);
    }
}

impl<A, B> Chain<A, B> {
    /// The effect that runs first.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Mutable access to the effect that runs first.
    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// The effect that runs second.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Mutable access to the effect that runs second.
    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    /// Split back into the two effects.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale(f32);

    impl AudioEffect<f32> for Scale {
        fn setup(&mut self, _: f64, _: usize, _: usize) {}
        fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, f32>) {
            for channel in 0..buffer.num_channels() {
                for sample in buffer.channel_data(channel) {
                    *sample *= self.0;
                }
            }
        }
    }

    #[derive(Default)]
    struct SetupCount(usize);

    impl AudioEffect<f32> for SetupCount {
        fn setup(&mut self, _: f64, _: usize, _: usize) {
            self.0 += 1;
        }
        fn process_audio(&mut self, _: &mut AudioBufferInfo<'_, f32>) {}
    }

    #[test]
    fn chain_runs_in_series() {
        let mut left = [1.0_f32; 3];
        let mut right = [-1.0_f32; 3];
        let mut buffer = AudioBufferInfo::new();
        buffer.append_channel(3, &mut left, 0);
        buffer.append_channel(3, &mut right, 1);

        let mut chain = Scale(2.0).chain(Scale(3.0));
        chain.process_audio(&mut buffer);
        assert_eq!(buffer.channel(0), &[6.0; 3]);
        assert_eq!(buffer.channel(1), &[-6.0; 3]);
    }

    #[test]
    fn chain_forwards_setup() {
        let mut chain = SetupCount::default().chain(SetupCount::default());
        chain.setup(48000.0, 256, 2);
        assert_eq!(chain.first().0, 1);
        assert_eq!(chain.second().0, 1);
    }

    #[test]
    fn boxed_effects_are_object_safe() {
        let mut effects: Vec<Box<dyn AudioEffect<f32>>> = vec![Box::new(Scale(0.5)), Box::new(Scale(4.0))];
        let mut data = [1.0_f32; 2];
        let mut buffer = AudioBufferInfo::new();
        buffer.append_channel(2, &mut data, 0);
        for effect in &mut effects {
            effect.process_audio(&mut buffer);
        }
        assert_eq!(buffer.channel(0), &[2.0; 2]);
    }
}
