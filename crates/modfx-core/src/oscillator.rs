//! Free-running oscillators used as modulation sources.
//!
//! [`BasicOscillator`] is a naive (non band-limited) phase accumulator meant
//! for control-rate signals: tremolo, auto-pan, swept thresholds. Audio-rate
//! use will alias on every shape but the sine.

use crate::math::{Sample, generate_saw, generate_sine, generate_square, generate_triangle};

/// Oscillator waveshape
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveshape {
    /// Smooth, natural modulation
    #[default]
    Sine,
    /// Linear ramps up and down
    Triangle,
    /// Binary on/off modulation
    Square,
    /// Falling ramp, abrupt reset
    Saw,
}

impl Waveshape {
    /// All shapes in host choice-parameter order.
    pub const ALL: [Waveshape; 4] = [
        Waveshape::Sine,
        Waveshape::Triangle,
        Waveshape::Square,
        Waveshape::Saw,
    ];

    /// Map a choice index (0 = Sine, 1 = Triangle, 2 = Square, 3 = Saw).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Amplitude in `[-1, 1]` for a phase in `[0, 1)`.
    #[inline]
    pub fn generate<T: Sample>(self, phase: T) -> T {
        match self {
            Waveshape::Sine => generate_sine(phase),
            Waveshape::Triangle => generate_triangle(phase),
            Waveshape::Square => generate_square(phase),
            Waveshape::Saw => generate_saw(phase),
        }
    }
}

/// Interface shared by periodic signal generators.
pub trait Oscillator<T: Sample> {
    /// Prepare for a sample rate and restart the cycle.
    fn setup(&mut self, sample_rate: f64);

    /// Set the frequency in Hz.
    fn set_frequency(&mut self, frequency: T);

    /// Produce the next sample in `[-1, 1]`.
    fn next_sample(&mut self) -> T;
}

/// Phase-accumulating oscillator with a selectable [`Waveshape`].
///
/// The phase stays in `[0, 1)` and wraps by repeated subtraction, which is
/// correct for any frequency below the sample rate.
///
/// # Example
///
/// ```rust
/// use modfx_core::{BasicOscillator, Oscillator, Waveshape};
///
/// let mut osc = BasicOscillator::<f32>::new(48000.0, 2.0);
/// osc.set_waveshape(Waveshape::Triangle);
///
/// let value = osc.next_sample();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct BasicOscillator<T> {
    /// Current phase position [0.0, 1.0)
    phase: T,
    /// Phase increment per sample
    increment: T,
    /// Frequency in Hz
    frequency: T,
    /// Sample rate in Hz
    sample_rate: f64,
    waveshape: Waveshape,
}

impl<T: Sample> Default for BasicOscillator<T> {
    fn default() -> Self {
        Self::new(48000.0, T::ONE)
    }
}

impl<T: Sample> BasicOscillator<T> {
    /// Create an oscillator with a sample rate and frequency.
    pub fn new(sample_rate: f64, frequency: T) -> Self {
        let mut osc = Self {
            phase: T::ZERO,
            increment: T::ZERO,
            frequency: T::ZERO,
            sample_rate,
            waveshape: Waveshape::Sine,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Select the waveshape. The phase is left untouched.
    pub fn set_waveshape(&mut self, waveshape: Waveshape) {
        self.waveshape = waveshape;
    }

    /// Current waveshape.
    pub fn waveshape(&self) -> Waveshape {
        self.waveshape
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> T {
        self.frequency
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> T {
        self.phase
    }

    /// Restart the cycle at phase 0.
    pub fn reset(&mut self) {
        self.phase = T::ZERO;
    }
}

impl<T: Sample> Oscillator<T> for BasicOscillator<T> {
    fn setup(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.phase = T::ZERO;
        self.set_frequency(self.frequency);
    }

    fn set_frequency(&mut self, frequency: T) {
        debug_assert!(
            frequency.to_f64() < self.sample_rate,
            "frequency {frequency:?} Hz must be below the sample rate {} Hz",
            self.sample_rate
        );
        self.frequency = frequency.max(T::ZERO);
        let increment = self.frequency.to_f64() / self.sample_rate;
        // At or above the sample rate, fold onto the alias so one wrap per sample suffices
        self.increment = if increment.is_finite() {
            T::from_f64(increment - libm::floor(increment))
        } else {
            T::ZERO
        };
    }

    #[inline]
    fn next_sample(&mut self) -> T {
        let value = self.waveshape.generate(self.phase);

        self.phase += self.increment;
        while self.phase >= T::ONE {
            self.phase -= T::ONE;
        }

        value
    }
}
