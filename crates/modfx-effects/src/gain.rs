//! Modulatable gain stage.
//!
//! Decibel targets are converted to linear amplitude before they reach the
//! smoother, so ramps and modulation interpolate in amplitude space. This
//! keeps the per-sample path free of `log`/`exp`, at the cost of fades that
//! are not linear in dB.
//!
//! # Parameters
//!
//! | Parameter | Range | Description |
//! |-----------|-------|-------------|
//! | Gain | -100 to 0 dB (adjustable) | Output level; -100 dB and below is silence |
//! | Depth | -1 to 1 | Modulation excursion towards the loudest (+) or quietest (-) bound |

use modfx_core::{
    AudioBufferInfo, AudioEffect, ModulationParameter, ParameterHandle, Sample, SharedModulation,
    decibels_to_amplitude,
};

use crate::SMOOTHING_TIME;

/// Levels at or below this are treated as silence (amplitude 0).
pub const SILENCE_FLOOR_DB: f64 = -100.0;

/// Map a level in dB to a linear gain, with an inclusive silence floor.
#[inline]
pub fn decibels_to_gain<T: Sample>(db: T) -> T {
    if db <= T::from_f64(SILENCE_FLOOR_DB) {
        T::ZERO
    } else {
        decibels_to_amplitude(db)
    }
}

/// `sign(depth) * sqrt(|depth|)`.
///
/// Amplitude-domain modulation sounds lopsided in dB; the square root lifts
/// small depths so the perceived sweep is closer to even.
#[inline]
fn shape_depth<T: Sample>(depth: T) -> T {
    let shaped = depth.abs().sqrt();
    if depth < T::ZERO { -shaped } else { shaped }
}

/// Gain stage with a modulatable level.
///
/// # Example
///
/// ```rust
/// use modfx_core::{AudioBufferInfo, AudioEffect};
/// use modfx_effects::Gain;
///
/// let mut gain = Gain::<f32>::new();
/// gain.setup(48000.0, 64, 1);
/// gain.set_decibels(-6.0, 0.0);
///
/// let mut data = [1.0_f32; 64];
/// let mut buffer = AudioBufferInfo::new();
/// buffer.append_channel(64, &mut data, 0);
/// gain.process_audio(&mut buffer);
/// ```
#[derive(Debug)]
pub struct Gain<T: Sample> {
    gain: ModulationParameter<T>,
}

impl<T: Sample> Gain<T> {
    /// Create a unity gain stage limited to -100..0 dB.
    ///
    /// Call [`setup`](AudioEffect::setup) before processing. `setup` starts
    /// the level at unity rather than at silence, so a fresh stage passes
    /// audio straight away instead of fading in over the smoothing time.
    pub fn new() -> Self {
        let mut stage = Self {
            gain: ModulationParameter::new(),
        };
        stage.set_decibel_range(T::from_f64(SILENCE_FLOOR_DB), T::ZERO);
        stage
    }

    /// Set the level in dB and the modulation depth in `[-1, 1]`.
    pub fn set_decibels(&mut self, db: T, modulation: T) {
        self.controls().set_decibels(db, modulation);
    }

    /// Limit the level to `[min_db, max_db]`.
    pub fn set_decibel_range(&mut self, min_db: T, max_db: T) {
        self.gain
            .set_parameter_range(decibels_to_gain(min_db), decibels_to_gain(max_db));
    }

    /// Attach a modulation source, or detach with `None`.
    pub fn set_gain_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.gain.set_modulation_source(source);
    }

    /// Linear gain last applied to `channel`.
    pub fn current_gain(&self, channel: usize) -> T {
        self.gain.current_modulated_value(channel)
    }

    /// A thread-safe handle for automating this stage.
    pub fn controls(&self) -> GainControls<T> {
        GainControls {
            gain: self.gain.handle(),
        }
    }
}

impl<T: Sample> Default for Gain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> AudioEffect<T> for Gain<T> {
    fn setup(&mut self, sample_rate: f64, _max_buffer_size: usize, num_channels: usize) {
        self.gain
            .setup(sample_rate, num_channels, T::ONE, T::from_f64(SMOOTHING_TIME));
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, num_channels, "gain setup");
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        for channel in 0..buffer.num_channels() {
            for (i, sample) in buffer.channel_data(channel).iter_mut().enumerate() {
                *sample = *sample * self.gain.next_modulated_value(channel, i);
            }
        }
    }
}

/// Cloneable, `Send` handle for setting a [`Gain`]'s level from any thread.
#[derive(Debug, Clone)]
pub struct GainControls<T: Sample> {
    gain: ParameterHandle<T>,
}

impl<T: Sample> GainControls<T> {
    /// Set the level in dB and the modulation depth in `[-1, 1]`.
    pub fn set_decibels(&self, db: T, modulation: T) {
        self.gain.set(decibels_to_gain(db), shape_depth(modulation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modfx_core::{ModulationBuffer, ModulationSource, WaveModulator};
    use std::sync::Arc;

    /// Run `blocks` blocks of constant `level` through `gain`, returning the last sample per channel.
    fn run(gain: &mut Gain<f64>, level: f64, blocks: usize) -> [f64; 2] {
        let mut out = [0.0; 2];
        for _ in 0..blocks {
            let mut left = [level; 480];
            let mut right = [level; 480];
            let mut buffer = AudioBufferInfo::new();
            buffer.append_channel(480, &mut left, 0);
            buffer.append_channel(480, &mut right, 1);
            gain.process_audio(&mut buffer);
            out = [buffer.channel(0)[479], buffer.channel(1)[479]];
        }
        out
    }

    fn stereo_gain() -> Gain<f64> {
        let mut gain = Gain::new();
        gain.setup(48000.0, 480, 2);
        gain
    }

    #[test]
    fn floor_is_silence() {
        let mut gain = stereo_gain();
        gain.set_decibels(-100.0, 0.0);
        assert_eq!(run(&mut gain, 1.0, 10), [0.0, 0.0]);
    }

    #[test]
    fn zero_db_is_unity() {
        let mut gain = stereo_gain();
        gain.set_decibels(-40.0, 0.0);
        run(&mut gain, 1.0, 10);
        gain.set_decibels(0.0, 0.0);
        assert_eq!(run(&mut gain, 1.0, 10), [1.0, 1.0]);
    }

    #[test]
    fn starts_at_unity() {
        let mut gain = stereo_gain();
        assert_eq!(gain.current_gain(0), 1.0);
        assert_eq!(run(&mut gain, 0.5, 1), [0.5, 0.5]);
    }

    #[test]
    fn first_sample_after_setup_is_not_faded() {
        let mut gain = stereo_gain();
        let mut data = [1.0; 4];
        let mut buffer = AudioBufferInfo::new();
        buffer.append_channel(4, &mut data, 0);
        gain.process_audio(&mut buffer);
        assert_eq!(buffer.channel(0), &[1.0; 4]);
    }

    #[test]
    fn ramps_over_fifty_milliseconds() {
        let mut gain = stereo_gain();
        gain.set_decibels(-100.0, 0.0);
        // 2400 samples: 4 blocks in, the ramp is still short of silence
        let [left, _] = run(&mut gain, 1.0, 4);
        assert!(left > 0.0 && left < 0.5, "got {left}");
        let [left, _] = run(&mut gain, 1.0, 1);
        assert_eq!(left, 0.0);
    }

    #[test]
    fn above_range_is_clamped_to_unity() {
        let mut gain = stereo_gain();
        gain.set_decibels(12.0, 0.0);
        assert_eq!(run(&mut gain, 1.0, 10), [1.0, 1.0]);

        gain.set_decibel_range(-100.0, 12.0);
        let [left, _] = run(&mut gain, 1.0, 10);
        assert!((left - decibels_to_amplitude(12.0)).abs() < 1e-9);
    }

    #[test]
    fn depth_is_sign_preserving_square_root() {
        assert_eq!(shape_depth(0.25_f64), 0.5);
        assert_eq!(shape_depth(-0.25_f64), -0.5);
        assert_eq!(shape_depth(0.0_f64), 0.0);
    }

    #[test]
    fn negative_depth_pulls_towards_silence() {
        let source = ModulationBuffer::new(480);
        for i in 0..480 {
            source.set_modulation_sample(i, 1.0);
        }
        let mut gain = stereo_gain();
        gain.set_gain_modulation_source(Some(Arc::new(source)));
        gain.set_decibels(0.0, -1.0);
        assert_eq!(run(&mut gain, 1.0, 10), [0.0, 0.0]);
    }

    #[test]
    fn wave_modulation_stays_within_range() {
        let mut lfo = WaveModulator::new();
        lfo.setup(480, 48000.0);
        lfo.set_frequency(20.0);

        let mut gain = stereo_gain();
        gain.set_gain_modulation_source(Some(lfo.shared()));
        gain.set_decibels(-6.0, -0.8);

        for _ in 0..20 {
            lfo.prepare_modulation_buffer(480);
            let mut data = [1.0; 480];
            let mut buffer = AudioBufferInfo::new();
            buffer.append_channel(480, &mut data, 0);
            gain.process_audio(&mut buffer);
            assert!(buffer.channel(0).iter().all(|&s| (0.0..=1.0).contains(&s)));
        }
    }

    #[test]
    fn controls_drive_the_stage() {
        let mut gain = stereo_gain();
        let controls = gain.controls();
        std::thread::spawn(move || controls.set_decibels(-20.0, 0.0))
            .join()
            .unwrap();
        let [left, right] = run(&mut gain, 1.0, 10);
        assert!((left - 0.1).abs() < 1e-12);
        assert_eq!(left, right);
        assert_eq!(gain.current_gain(0), left);
    }
}
