//! Envelope follower for tracking signal level.
//!
//! Used by the compressor to turn a signal into a smoothed level estimate.
//! Attack and release are one-pole time constants: the follower covers about
//! 63% of a step change in the given time.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::math::Sample;

/// Shortest accepted attack or release time, in seconds.
pub const MIN_ENVELOPE_TIME: f64 = 1e-5;

/// Level detection law.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectionMode {
    /// Tracks the rectified signal: fast, reacts to transients
    Peak,
    /// Tracks the root-mean-square level: closer to perceived loudness
    #[default]
    Rms,
}

/// Per-channel envelope follower with separate attack and release.
///
/// The attack branch applies while the input level exceeds the last output,
/// the release branch otherwise.
///
/// # Example
///
/// ```rust
/// use modfx_core::{DetectionMode, EnvelopeFollower};
///
/// let mut env = EnvelopeFollower::<f32>::new();
/// env.setup(48000.0, 2, DetectionMode::Peak);
/// env.set_attack(0.001);
/// env.set_release(0.1);
///
/// let level = env.process(-0.5, 0);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower<T> {
    /// Attack time in seconds
    attack: T,
    /// Release time in seconds
    release: T,
    attack_coeff: T,
    release_coeff: T,
    /// Last output per channel
    last_out: Vec<T>,
    sample_rate: f64,
    mode: DetectionMode,
}

impl<T: Sample> EnvelopeFollower<T> {
    /// Create a single-channel RMS follower at 48 kHz (10 ms attack, 50 ms release).
    pub fn new() -> Self {
        let mut follower = Self {
            attack: T::from_f64(0.01),
            release: T::from_f64(0.05),
            attack_coeff: T::ZERO,
            release_coeff: T::ZERO,
            last_out: vec![T::ZERO],
            sample_rate: 48000.0,
            mode: DetectionMode::Rms,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Prepare for a sample rate and channel count, clearing all state.
    pub fn setup(&mut self, sample_rate: f64, num_channels: usize, mode: DetectionMode) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        debug_assert!(num_channels > 0, "a follower needs at least one channel");
        self.sample_rate = if sample_rate > 0.0 { sample_rate } else { 1.0 };
        self.mode = mode;
        self.last_out.clear();
        self.last_out.resize(num_channels, T::ZERO);
        self.recalculate_coefficients();
    }

    /// Set the attack time in seconds. Unchanged values skip the coefficient update.
    #[inline]
    pub fn set_attack(&mut self, seconds: T) {
        if seconds == self.attack {
            return;
        }
        self.attack = Self::checked_time(seconds);
        self.attack_coeff = self.coefficient(self.attack);
    }

    /// Set the release time in seconds. Unchanged values skip the coefficient update.
    #[inline]
    pub fn set_release(&mut self, seconds: T) {
        if seconds == self.release {
            return;
        }
        self.release = Self::checked_time(seconds);
        self.release_coeff = self.coefficient(self.release);
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> T {
        self.attack
    }

    /// Release time in seconds.
    pub fn release(&self) -> T {
        self.release
    }

    /// Switch the detection law. Channel state is kept.
    pub fn set_mode(&mut self, mode: DetectionMode) {
        self.mode = mode;
    }

    /// Current detection law.
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Feed one sample of `channel` and return its new level (linear, non-negative).
    #[inline]
    pub fn process(&mut self, value: T, channel: usize) -> T {
        debug_assert!(channel < self.last_out.len(), "channel {channel} not set up");
        let Some(last) = self.last_out.get_mut(channel) else {
            return T::ZERO;
        };

        let value = value.abs();
        let coeff = if value > *last {
            self.attack_coeff
        } else {
            self.release_coeff
        };

        *last = match self.mode {
            DetectionMode::Peak => value + coeff * (*last - value),
            DetectionMode::Rms => {
                (coeff * *last * *last + (T::ONE - coeff) * value * value).sqrt()
            }
        };
        *last
    }

    /// Last level of `channel` without processing new input.
    pub fn level(&self, channel: usize) -> T {
        self.last_out.get(channel).copied().unwrap_or(T::ZERO)
    }

    /// Zero every channel's level.
    pub fn reset(&mut self) {
        self.last_out.fill(T::ZERO);
    }

    fn checked_time(seconds: T) -> T {
        let floor = T::from_f64(MIN_ENVELOPE_TIME);
        debug_assert!(seconds > T::ZERO, "envelope time must be positive");
        if seconds < floor { floor } else { seconds }
    }

    /// `exp(-1 / (time * sample_rate))`, always in `(0, 1)`.
    fn coefficient(&self, seconds: T) -> T {
        T::from_f64(libm::exp(-1.0 / (seconds.to_f64() * self.sample_rate)))
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = self.coefficient(self.attack);
        self.release_coeff = self.coefficient(self.release);
    }
}

impl<T: Sample> Default for EnvelopeFollower<T> {
    fn default() -> Self {
        Self::new()
    }
}
