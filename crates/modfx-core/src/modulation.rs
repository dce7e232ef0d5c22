//! Block-rate modulation sources.
//!
//! A modulation source renders one value per sample of the coming block into
//! a [`ModulationBuffer`], once per block, before any parameter reads it.
//! Values are unipolar (`0.0` to `1.0`); the bipolar depth lives on the
//! consuming [`ModulationParameter`](crate::ModulationParameter).
//!
//! The buffer is shared: every parameter attached to a source holds a
//! [`SharedModulation`] handle and reads it without locking, while the
//! source's owner rewrites it once per block.
//!
//! ```rust
//! use modfx_core::{ModulationSource, WaveModulator, Waveshape};
//!
//! let mut lfo = WaveModulator::<f32>::new();
//! lfo.setup(512, 48000.0);
//! lfo.set_modulation_shape(Waveshape::Triangle);
//! lfo.set_frequency(2.0);
//!
//! lfo.prepare_modulation_buffer(512);
//! let value = lfo.modulation_sample(0);
//! assert!((0.0..=1.0).contains(&value));
//! ```

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::math::Sample;
use crate::oscillator::{BasicOscillator, Oscillator, Waveshape};

/// Shared, reference-counted handle to a source's output buffer.
pub type SharedModulation<T> = Arc<ModulationBuffer<T>>;

/// Fixed-size, lock-free sample buffer shared between one writer and any
/// number of readers.
///
/// Each slot is an independent atomic; there is no ordering between slots,
/// so a reader racing a rewrite may see a mix of old and new values.
#[derive(Debug)]
pub struct ModulationBuffer<T: Sample> {
    samples: Vec<T::Atomic>,
}

impl<T: Sample> ModulationBuffer<T> {
    /// Allocate `len` slots, all zero.
    pub fn new(len: usize) -> Self {
        Self {
            samples: (0..len).map(|_| T::new_atomic(T::ZERO)).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer has no slots (source not set up).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write one slot. Out-of-range writes are dropped.
    #[inline]
    pub fn set_modulation_sample(&self, index: usize, value: T) {
        debug_assert!(index < self.len(), "modulation write {index} past buffer");
        if let Some(slot) = self.samples.get(index) {
            T::store_atomic(slot, value);
        }
    }

    /// Read one slot. Out-of-range reads return zero.
    ///
    /// The value is whatever was last written: reading before the current
    /// block has been prepared yields the previous block's data.
    #[inline]
    pub fn modulation_sample(&self, index: usize) -> T {
        debug_assert!(index < self.len(), "modulation read {index} past buffer");
        self.samples.get(index).map_or(T::ZERO, T::load_atomic)
    }
}

/// Trait for anything that renders a per-block modulation signal.
pub trait ModulationSource<T: Sample> {
    /// Size the buffer for blocks of up to `max_buffer_size` samples.
    ///
    /// Allocates a fresh buffer; parameters must be re-attached afterwards.
    fn setup(&mut self, max_buffer_size: usize, sample_rate: f64);

    /// Render the first `num_samples` slots for the coming block.
    ///
    /// Call exactly once per block: each call advances the generator, so a
    /// second call would run the modulation faster than its stated rate.
    fn prepare_modulation_buffer(&mut self, num_samples: usize);

    /// The shared buffer consumers attach to.
    fn buffer(&self) -> &SharedModulation<T>;

    /// Read one prepared value in `[0, 1]`.
    #[inline]
    fn modulation_sample(&self, index: usize) -> T {
        self.buffer().modulation_sample(index)
    }
}

/// Modulation source driven by a [`BasicOscillator`].
///
/// The oscillator's bipolar output is remapped to `[0, 1]` via `x * 0.5 + 0.5`.
/// Not `Clone`: a clone would be a second writer to the same shared buffer.
#[derive(Debug)]
pub struct WaveModulator<T: Sample> {
    oscillator: BasicOscillator<T>,
    buffer: SharedModulation<T>,
    sample_rate: f64,
}

impl<T: Sample> WaveModulator<T> {
    /// Create an un-prepared modulator (1 Hz sine, empty buffer).
    pub fn new() -> Self {
        Self {
            oscillator: BasicOscillator::default(),
            buffer: Arc::new(ModulationBuffer::new(0)),
            sample_rate: 48000.0,
        }
    }

    /// Select the modulating waveshape.
    pub fn set_modulation_shape(&mut self, waveshape: Waveshape) {
        self.oscillator.set_waveshape(waveshape);
    }

    /// Set the modulation rate in Hz.
    pub fn set_frequency(&mut self, frequency: T) {
        self.oscillator.set_frequency(frequency);
    }

    /// Current modulating waveshape.
    pub fn modulation_shape(&self) -> Waveshape {
        self.oscillator.waveshape()
    }

    /// Current modulation rate in Hz.
    pub fn frequency(&self) -> T {
        self.oscillator.frequency()
    }

    /// Sample rate passed to the last [`setup`](ModulationSource::setup).
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// A new handle to the shared buffer, for attaching to parameters.
    pub fn shared(&self) -> SharedModulation<T> {
        Arc::clone(&self.buffer)
    }
}

impl<T: Sample> Default for WaveModulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> ModulationSource<T> for WaveModulator<T> {
    fn setup(&mut self, max_buffer_size: usize, sample_rate: f64) {
        self.buffer = Arc::new(ModulationBuffer::new(max_buffer_size));
        self.sample_rate = sample_rate;
        self.oscillator.setup(sample_rate);
        #[cfg(feature = "tracing")]
        tracing::debug!(max_buffer_size, sample_rate, "wave modulator setup");
    }

    fn prepare_modulation_buffer(&mut self, num_samples: usize) {
        debug_assert!(
            num_samples <= self.buffer.len(),
            "block of {num_samples} exceeds modulation buffer of {}",
            self.buffer.len()
        );
        let num_samples = num_samples.min(self.buffer.len());
        for index in 0..num_samples {
            let value = self.oscillator.next_sample() * T::HALF + T::HALF;
            self.buffer.set_modulation_sample(index, value);
        }
    }

    fn buffer(&self) -> &SharedModulation<T> {
        &self.buffer
    }
}
