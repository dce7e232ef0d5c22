//! Feed-forward dynamics compressor with a soft knee.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → dB → Gain Computer → dB → amplitude → × Input
//! ```
//!
//! Every control is a [`ModulationParameter`], so each can be ramped,
//! automated from another thread, or swept by a modulation source.
//!
//! # Parameters
//!
//! | Parameter | Default range | Description |
//! |-----------|---------------|-------------|
//! | Attack | 0.00001 to 0.5 s | How fast the envelope rises |
//! | Release | 0.00001 to 0.5 s | How fast the envelope falls |
//! | Threshold | -100 to 0 dB | Level where compression begins |
//! | Ratio | 1:1 to 20:1 | Compression strength |
//! | Knee | 0 to 1 | Knee width as a fraction of the threshold's magnitude |
//!
//! # Gain Computer
//!
//! With `slope = 1 - 1/ratio` and `width = -threshold * knee`:
//!
//! - inside the knee (`threshold ± width/2`, exclusive), the slope is scaled
//!   by half the envelope's fractional position in the window and applied
//!   from the knee's lower edge;
//! - elsewhere, `min(0, slope * (threshold - envelope))`.
//!
//! The result is never positive: the compressor only attenuates.

use modfx_core::{
    AudioBufferInfo, AudioEffect, DetectionMode, EnvelopeFollower, MIN_ENVELOPE_TIME,
    ModulationParameter, ParameterHandle, Sample, SharedModulation, amplitude_to_decibels,
    decibels_to_amplitude,
};

use crate::SMOOTHING_TIME;

/// Longest default attack or release time, in seconds.
pub const MAX_ENVELOPE_TIME: f64 = 0.5;

/// Envelope levels are floored here before conversion to dB (-200 dB).
const ENVELOPE_FLOOR: f64 = 1e-10;

/// Gain reduction in dB (never positive) for an envelope level in dB.
///
/// `knee` is a fraction of the threshold's magnitude. A positive threshold
/// has no meaningful knee window and always uses the hard knee.
///
/// # Example
///
/// ```rust
/// use modfx_effects::gain_reduction_db;
///
/// // 12 dB over a -20 dB threshold at 4:1
/// assert_eq!(gain_reduction_db(4.0_f64, -20.0, -8.0, 0.0), -9.0);
/// // Below threshold: untouched
/// assert_eq!(gain_reduction_db(4.0_f64, -20.0, -30.0, 0.0), 0.0);
/// ```
#[inline]
pub fn gain_reduction_db<T: Sample>(ratio: T, threshold: T, envelope_db: T, knee: T) -> T {
    let slope = T::ONE - T::ONE / ratio;
    let width = -threshold.min(T::ZERO) * knee;

    if knee > T::ZERO && width > T::ZERO {
        let lower = threshold - width * T::HALF;
        let upper = threshold + width * T::HALF;
        if envelope_db > lower && envelope_db < upper {
            let knee_slope = slope * ((envelope_db - lower) / width) * T::HALF;
            return knee_slope * (lower - envelope_db);
        }
    }

    (slope * (threshold - envelope_db)).min(T::ZERO)
}

/// Dynamics compressor with five modulatable controls.
///
/// Each channel keeps its own envelope; the channels are not linked.
///
/// # Example
///
/// ```rust
/// use modfx_core::{AudioBufferInfo, AudioEffect};
/// use modfx_effects::Compressor;
///
/// let mut comp = Compressor::<f32>::new();
/// comp.setup(48000.0, 64, 1);
/// comp.set_threshold(-20.0, 0.0);
/// comp.set_ratio(4.0, 0.0);
/// comp.set_attack(0.005, 0.0);
/// comp.set_release(0.05, 0.0);
///
/// let mut data = [0.5_f32; 64];
/// let mut buffer = AudioBufferInfo::new();
/// buffer.append_channel(64, &mut data, 0);
/// comp.process_audio(&mut buffer);
/// assert!(comp.gain_reduction_db() <= 0.0);
/// ```
#[derive(Debug)]
pub struct Compressor<T: Sample> {
    attack: ModulationParameter<T>,
    release: ModulationParameter<T>,
    threshold: ModulationParameter<T>,
    ratio: ModulationParameter<T>,
    knee: ModulationParameter<T>,
    envelope: EnvelopeFollower<T>,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: T,
}

impl<T: Sample> Compressor<T> {
    /// Create a compressor with the default ranges, an RMS detector and no
    /// compression (0 dB threshold, 1:1).
    pub fn new() -> Self {
        let mut comp = Self {
            attack: ModulationParameter::new(),
            release: ModulationParameter::new(),
            threshold: ModulationParameter::new(),
            ratio: ModulationParameter::new(),
            knee: ModulationParameter::new(),
            envelope: EnvelopeFollower::new(),
            last_gain_reduction_db: T::ZERO,
        };
        let (min_time, max_time) = (
            T::from_f64(MIN_ENVELOPE_TIME),
            T::from_f64(MAX_ENVELOPE_TIME),
        );
        comp.set_attack_range(min_time, max_time);
        comp.set_release_range(min_time, max_time);
        comp.set_threshold_range(T::from_f64(-100.0), T::ZERO);
        comp.set_ratio_range(T::ONE, T::from_f64(20.0));
        comp.knee.set_parameter_range(T::ZERO, T::ONE);
        comp
    }

    /// Set the attack time in seconds and its modulation depth.
    pub fn set_attack(&mut self, seconds: T, modulation: T) {
        self.attack.set_parameter_value(seconds, modulation);
    }

    /// Set the release time in seconds and its modulation depth.
    pub fn set_release(&mut self, seconds: T, modulation: T) {
        self.release.set_parameter_value(seconds, modulation);
    }

    /// Set the threshold in dB and its modulation depth.
    pub fn set_threshold(&mut self, db: T, modulation: T) {
        self.threshold.set_parameter_value(db, modulation);
    }

    /// Set the ratio (`n` for n:1) and its modulation depth.
    pub fn set_ratio(&mut self, ratio: T, modulation: T) {
        self.ratio.set_parameter_value(ratio, modulation);
    }

    /// Set the knee (0 hard, 1 widest) and its modulation depth.
    pub fn set_knee(&mut self, knee: T, modulation: T) {
        self.knee.set_parameter_value(knee, modulation);
    }

    /// Limit the attack time. The lower bound is raised to [`MIN_ENVELOPE_TIME`].
    pub fn set_attack_range(&mut self, min: T, max: T) {
        let floor = T::from_f64(MIN_ENVELOPE_TIME);
        self.attack
            .set_parameter_range(min.max(floor), max.max(floor));
    }

    /// Limit the release time. The lower bound is raised to [`MIN_ENVELOPE_TIME`].
    pub fn set_release_range(&mut self, min: T, max: T) {
        let floor = T::from_f64(MIN_ENVELOPE_TIME);
        self.release
            .set_parameter_range(min.max(floor), max.max(floor));
    }

    /// Limit the threshold. Bounds above 0 dB are lowered to 0 dB.
    pub fn set_threshold_range(&mut self, min: T, max: T) {
        self.threshold
            .set_parameter_range(min.min(T::ZERO), max.min(T::ZERO));
    }

    /// Limit the ratio. Bounds below 1:1 are raised to 1:1.
    pub fn set_ratio_range(&mut self, min: T, max: T) {
        self.ratio
            .set_parameter_range(min.max(T::ONE), max.max(T::ONE));
    }

    /// Attach a modulation source to the attack time, or detach with `None`.
    pub fn set_attack_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.attack.set_modulation_source(source);
    }

    /// Attach a modulation source to the release time, or detach with `None`.
    pub fn set_release_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.release.set_modulation_source(source);
    }

    /// Attach a modulation source to the threshold, or detach with `None`.
    pub fn set_threshold_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.threshold.set_modulation_source(source);
    }

    /// Attach a modulation source to the ratio, or detach with `None`.
    pub fn set_ratio_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.ratio.set_modulation_source(source);
    }

    /// Attach a modulation source to the knee, or detach with `None`.
    pub fn set_knee_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.knee.set_modulation_source(source);
    }

    /// Select peak or RMS level detection.
    pub fn set_envelope_type(&mut self, mode: DetectionMode) {
        self.envelope.set_mode(mode);
    }

    /// Current level detection law.
    pub fn envelope_type(&self) -> DetectionMode {
        self.envelope.mode()
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    ///
    /// A value of 0.0 means no compression is occurring. A value of -6.0
    /// means the signal is being reduced by 6 dB.
    pub fn gain_reduction_db(&self) -> T {
        self.last_gain_reduction_db
    }

    /// A thread-safe handle for automating every control.
    pub fn controls(&self) -> CompressorControls<T> {
        CompressorControls {
            attack: self.attack.handle(),
            release: self.release.handle(),
            threshold: self.threshold.handle(),
            ratio: self.ratio.handle(),
            knee: self.knee.handle(),
        }
    }

    #[inline]
    fn process_sample(&mut self, input: T, channel: usize, index: usize) -> T {
        let attack = self.attack.next_modulated_value(channel, index);
        let release = self.release.next_modulated_value(channel, index);
        let threshold = self.threshold.next_modulated_value(channel, index);
        let ratio = self.ratio.next_modulated_value(channel, index);
        let knee = self.knee.next_modulated_value(channel, index);

        self.envelope.set_attack(attack);
        self.envelope.set_release(release);
        let level = self
            .envelope
            .process(input, channel)
            .max(T::from_f64(ENVELOPE_FLOOR));

        let reduction = gain_reduction_db(ratio, threshold, amplitude_to_decibels(level), knee);
        self.last_gain_reduction_db = reduction;
        input * decibels_to_amplitude(reduction)
    }
}

impl<T: Sample> Default for Compressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> AudioEffect<T> for Compressor<T> {
    fn setup(&mut self, sample_rate: f64, _max_buffer_size: usize, num_channels: usize) {
        let smoothing = T::from_f64(SMOOTHING_TIME);
        self.attack
            .setup(sample_rate, num_channels, T::from_f64(0.01), smoothing);
        self.release
            .setup(sample_rate, num_channels, T::from_f64(0.05), smoothing);
        self.threshold
            .setup(sample_rate, num_channels, T::ZERO, smoothing);
        self.ratio.setup(sample_rate, num_channels, T::ONE, smoothing);
        self.knee.setup(sample_rate, num_channels, T::ZERO, smoothing);

        let mode = self.envelope.mode();
        self.envelope.setup(sample_rate, num_channels, mode);
        self.last_gain_reduction_db = T::ZERO;
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, num_channels, ?mode, "compressor setup");
    }

    fn process_audio(&mut self, buffer: &mut AudioBufferInfo<'_, T>) {
        for channel in 0..buffer.num_channels() {
            for (i, sample) in buffer.channel_data(channel).iter_mut().enumerate() {
                *sample = self.process_sample(*sample, channel, i);
            }
        }
    }
}

/// Cloneable, `Send` handle for automating a [`Compressor`] from any thread.
#[derive(Debug, Clone)]
pub struct CompressorControls<T: Sample> {
    attack: ParameterHandle<T>,
    release: ParameterHandle<T>,
    threshold: ParameterHandle<T>,
    ratio: ParameterHandle<T>,
    knee: ParameterHandle<T>,
}

impl<T: Sample> CompressorControls<T> {
    /// Set the attack time in seconds and its modulation depth.
    pub fn set_attack(&self, seconds: T, modulation: T) {
        self.attack.set(seconds, modulation);
    }

    /// Set the release time in seconds and its modulation depth.
    pub fn set_release(&self, seconds: T, modulation: T) {
        self.release.set(seconds, modulation);
    }

    /// Set the threshold in dB and its modulation depth.
    pub fn set_threshold(&self, db: T, modulation: T) {
        self.threshold.set(db, modulation);
    }

    /// Set the ratio and its modulation depth.
    pub fn set_ratio(&self, ratio: T, modulation: T) {
        self.ratio.set(ratio, modulation);
    }

    /// Set the knee and its modulation depth.
    pub fn set_knee(&self, knee: T, modulation: T) {
        self.knee.set(knee, modulation);
    }
}
