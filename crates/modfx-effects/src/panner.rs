//! Equal-power panner.
//!
//! A single pan position in `[-1, 1]` is remapped to `amp = pan / 2 + 0.5`.
//! Channel 0 (left) is scaled by `sqrt(1 - amp)` and every other channel by
//! `sqrt(amp)`, so `left² + right²` stays at 1 across the sweep.
//!
//! Only stereo is modelled. With more than two channels, every channel past
//! the first is treated as "right" and receives the same gain.

use modfx_core::{
    AudioBufferInfo, AudioEffect, ModulationParameter, ParameterHandle, Sample, SharedModulation,
};

use crate::SMOOTHING_TIME;

/// Left and right gains for a pan position in `[-1, 1]`.
#[inline]
pub fn pan_gains<T: Sample>(pan: T) -> (T, T) {
    let amp = pan * T::HALF + T::HALF;
    ((T::ONE - amp).sqrt(), amp.sqrt())
}

/// Stereo panner with a modulatable position.
///
/// # Example
///
/// ```rust
/// use modfx_core::{AudioBufferInfo, AudioEffect};
/// use modfx_effects::Panner;
///
/// let mut panner = Panner::<f32>::new();
/// panner.setup(48000.0, 64, 2);
/// panner.set_panning(-0.5, 0.0);
///
/// let mut left = [1.0_f32; 64];
/// let mut right = [1.0_f32; 64];
/// let mut buffer = AudioBufferInfo::new();
/// buffer.append_channel(64, &mut left, 0);
/// buffer.append_channel(64, &mut right, 1);
/// panner.process_audio(&mut buffer);
/// ```
#[derive(Debug)]
pub struct Panner<T: Sample> {
    panning: ModulationParameter<T>,
}

impl<T: Sample> Panner<T> {
    /// Create a centred panner.
    pub fn new() -> Self {
        let mut panning = ModulationParameter::new();
        panning.set_parameter_range(-T::ONE, T::ONE);
        Self { panning }
    }

    /// Set the pan position (-1 left, 1 right) and modulation depth in `[-1, 1]`.
    pub fn set_panning(&mut self, pan: T, modulation: T) {
        self.panning.set_parameter_value(pan, modulation);
    }

    /// Attach a modulation source, or detach with `None`.
    pub fn set_panner_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.panning.set_modulation_source(source);
    }

    /// Pan position last applied to `channel`.
    pub fn current_panning(&self, channel: usize) -> T {
        self.panning.current_modulated_value(channel)
    }

    /// A thread-safe handle for automating the position.
    pub fn controls(&self) -> PannerControls<T> {
        PannerControls {
            panning: self.panning.handle(),
        }
    }
}

impl<T: Sample> Default for Panner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> AudioEffect<T> for Panner<T> {
    fn setup(&mut self, sample_rate: f64, _max_buffer_size: usize, num_channels: usize) {
        self.panning
            .setup(sample_rate, num_channels, T::ZERO, T::from_f64(SMOOTHING_TIME));
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, num_channels, "panner setup");
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        for channel in 0..buffer.num_channels() {
            for (i, sample) in buffer.channel_data(channel).iter_mut().enumerate() {
                let (left, right) = pan_gains(self.panning.next_modulated_value(channel, i));
                let gain = if channel == 0 { left } else { right };
                *sample = *sample * gain;
            }
        }
    }
}

/// Cloneable, `Send` handle for setting a [`Panner`]'s position from any thread.
#[derive(Debug, Clone)]
pub struct PannerControls<T: Sample> {
    panning: ParameterHandle<T>,
}

impl<T: Sample> PannerControls<T> {
    /// Set the pan position and modulation depth.
    pub fn set_panning(&self, pan: T, modulation: T) {
        self.panning.set(pan, modulation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modfx_core::ModulationBuffer;
    use std::sync::Arc;

    fn run(panner: &mut Panner<f64>, channels: usize, blocks: usize) -> Vec<f64> {
        let mut out = vec![0.0; channels];
        for _ in 0..blocks {
            let mut storage = vec![vec![1.0; 480]; channels];
            let mut buffer =
                AudioBufferInfo::from_channels(480, storage.iter_mut().map(Vec::as_mut_slice));
            panner.process_audio(&mut buffer);
            for (channel, last) in out.iter_mut().enumerate() {
                *last = buffer.channel(channel)[479];
            }
        }
        out
    }

    fn stereo_panner() -> Panner<f64> {
        let mut panner = Panner::new();
        panner.setup(48000.0, 480, 2);
        panner
    }

    #[test]
    fn hard_left() {
        let mut panner = stereo_panner();
        panner.set_panning(-1.0, 0.0);
        assert_eq!(run(&mut panner, 2, 10), vec![1.0, 0.0]);
    }

    #[test]
    fn hard_right() {
        let mut panner = stereo_panner();
        panner.set_panning(1.0, 0.0);
        assert_eq!(run(&mut panner, 2, 10), vec![0.0, 1.0]);
    }

    #[test]
    fn centre_is_equal_power() {
        let mut panner = stereo_panner();
        let out = run(&mut panner, 2, 1);
        let expected = 0.5_f64.sqrt();
        assert!((out[0] - expected).abs() < 1e-12);
        assert!((out[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn power_is_constant_across_positions() {
        for i in 0..=20 {
            let pan = -1.0 + f64::from(i) * 0.1;
            let (left, right) = pan_gains(pan);
            assert!((left * left + right * right - 1.0).abs() < 1e-12, "pan {pan}");
        }
    }

    #[test]
    fn out_of_range_position_is_clamped() {
        let mut panner = stereo_panner();
        panner.set_panning(3.0, 0.0);
        assert_eq!(run(&mut panner, 2, 10), vec![0.0, 1.0]);
        assert_eq!(panner.current_panning(0), 1.0);
    }

    #[test]
    fn extra_channels_follow_the_right_gain() {
        let mut panner = Panner::new();
        panner.setup(48000.0, 480, 4);
        panner.set_panning(-1.0, 0.0);
        assert_eq!(run(&mut panner, 4, 10), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn modulation_sweeps_towards_the_bound() {
        let source = ModulationBuffer::new(480);
        for i in 0..480 {
            source.set_modulation_sample(i, 1.0);
        }
        let mut panner = stereo_panner();
        panner.set_panner_modulation_source(Some(Arc::new(source)));
        panner.set_panning(0.0, 1.0);
        assert_eq!(run(&mut panner, 2, 10), vec![0.0, 1.0]);

        panner.set_panner_modulation_source(None);
        let out = run(&mut panner, 2, 1);
        assert!((out[0] - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn controls_drive_the_panner() {
        let mut panner = stereo_panner();
        panner.controls().set_panning(1.0, 0.0);
        assert_eq!(run(&mut panner, 2, 10), vec![0.0, 1.0]);
    }
}
