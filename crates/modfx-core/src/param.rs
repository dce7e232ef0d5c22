//! Smoothed, range-bounded, modulatable effect parameters.
//!
//! A [`ModulationParameter`] fuses three things into one per-sample value:
//!
//! 1. a static value, ramped by a [`SmoothedValue`] per channel,
//! 2. a bipolar modulation depth, ramped the same way and in lockstep,
//! 3. an optional shared [`ModulationBuffer`](crate::ModulationBuffer) signal.
//!
//! ## Modulation law
//!
//! With a source attached, `amount = source[i] * depth` (clamped to `[-1, 1]`)
//! is a *fractional excursion towards the range bound in that direction*,
//! not an additive offset:
//!
//! ```text
//! amount > 0:  value + (max - value) * amount
//! amount < 0:  value + (value - min) * amount
//! ```
//!
//! so full depth reaches a bound exactly and never crosses it. The result is
//! always clamped to the parameter's [`Range`].
//!
//! ## Threading
//!
//! Targets live in a [`ParameterHandle`] (two atomics behind an `Arc`). Any
//! thread may write them; the audio thread loads them on every
//! [`next_modulated_value`](ModulationParameter::next_modulated_value) call.
//! Writes are relaxed and per-scalar: value and depth written together may be
//! picked up one sample apart.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::math::{Sample, limit};
use crate::modulation::SharedModulation;
use crate::range::Range;
use crate::smoothed::SmoothedValue;

#[derive(Debug)]
struct TargetCell<T: Sample> {
    value: T::Atomic,
    modulation: T::Atomic,
}

/// Cloneable, thread-safe writer for a parameter's targets.
///
/// # Example
///
/// ```rust
/// use modfx_core::ModulationParameter;
///
/// let mut cutoff = ModulationParameter::<f32>::new();
/// cutoff.setup(48000.0, 2, 0.0, 0.0);
///
/// let handle = cutoff.handle();
/// std::thread::spawn(move || handle.set(0.75, 0.0)).join().unwrap();
///
/// assert_eq!(cutoff.next_modulated_value(0, 0), 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterHandle<T: Sample> {
    cell: Arc<TargetCell<T>>,
}

impl<T: Sample> ParameterHandle<T> {
    fn new(value: T, modulation: T) -> Self {
        Self {
            cell: Arc::new(TargetCell {
                value: T::new_atomic(value),
                modulation: T::new_atomic(modulation),
            }),
        }
    }

    /// Set the static value target and the modulation depth target.
    #[inline]
    pub fn set(&self, value: T, modulation: T) {
        T::store_atomic(&self.cell.value, value);
        T::store_atomic(&self.cell.modulation, modulation);
    }

    /// Current static value target.
    #[inline]
    pub fn value(&self) -> T {
        T::load_atomic(&self.cell.value)
    }

    /// Current modulation depth target.
    #[inline]
    pub fn modulation(&self) -> T {
        T::load_atomic(&self.cell.modulation)
    }
}

/// A per-channel smoothed parameter with optional modulation.
#[derive(Debug)]
pub struct ModulationParameter<T: Sample> {
    values: Vec<SmoothedValue<T>>,
    depths: Vec<SmoothedValue<T>>,
    /// Last unclamped output per channel
    current: Vec<T>,
    range: Range<T>,
    source: Option<SharedModulation<T>>,
    targets: ParameterHandle<T>,
}

impl<T: Sample> ModulationParameter<T> {
    /// Create an unconfigured parameter. Call [`setup`](Self::setup) before use.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            depths: Vec::new(),
            current: Vec::new(),
            range: Range::default(),
            source: None,
            targets: ParameterHandle::new(T::ZERO, T::ZERO),
        }
    }

    /// Allocate one value/depth smoother pair per channel and settle on `initial`.
    ///
    /// Resets the targets to `initial` with zero depth. Allocates; call
    /// outside the audio callback.
    pub fn setup(&mut self, sample_rate: f64, num_channels: usize, initial: T, smoothing_time: T) {
        debug_assert!(num_channels > 0, "a parameter needs at least one channel");
        self.values.clear();
        self.values.resize_with(num_channels, || {
            SmoothedValue::with_config(initial, sample_rate, smoothing_time)
        });
        self.depths.clear();
        self.depths.resize_with(num_channels, || {
            SmoothedValue::with_config(T::ZERO, sample_rate, smoothing_time)
        });
        self.current = vec![initial; num_channels];
        self.targets.set(initial, T::ZERO);
        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, num_channels, "modulation parameter setup");
    }

    /// Set the output clamp. Values already produced are not revisited.
    pub fn set_parameter_range(&mut self, min: T, max: T) {
        self.range.set_range(min, max);
    }

    /// Output clamp.
    pub fn range(&self) -> Range<T> {
        self.range
    }

    /// Set the static value and modulation depth targets.
    ///
    /// Both ramps share one smoothing time, so they always converge together.
    #[inline]
    pub fn set_parameter_value(&self, value: T, modulation: T) {
        self.targets.set(value, modulation);
    }

    /// A handle for writing targets from another thread.
    pub fn handle(&self) -> ParameterHandle<T> {
        self.targets.clone()
    }

    /// Attach a shared modulation source, or detach with `None`.
    pub fn set_modulation_source(&mut self, source: Option<SharedModulation<T>>) {
        self.source = source;
    }

    /// The attached modulation source, if any.
    pub fn modulation_source(&self) -> Option<&SharedModulation<T>> {
        self.source.as_ref()
    }

    /// Number of channels allocated by the last [`setup`](Self::setup).
    pub fn num_channels(&self) -> usize {
        self.values.len()
    }

    /// Advance `channel` by one sample and return the modulated, clamped value.
    ///
    /// Both smoothers step on every call whether or not modulation applies,
    /// which keeps them phase-locked. `sample_index` selects the modulation
    /// value within the current block.
    #[inline]
    pub fn next_modulated_value(&mut self, channel: usize, sample_index: usize) -> T {
        debug_assert!(
            channel < self.values.len(),
            "channel {channel} outside the {} set up",
            self.values.len()
        );
        let (Some(value), Some(depth)) = (self.values.get_mut(channel), self.depths.get_mut(channel))
        else {
            return self.range.constrain(T::ZERO);
        };

        value.set_target_value(self.targets.value());
        depth.set_target_value(self.targets.modulation());
        let static_value = value.next_value();
        let depth = depth.next_value();

        let modulated = match &self.source {
            None => static_value,
            Some(source) => {
                let amount = source.modulation_sample(sample_index) * depth;
                if amount == T::ZERO {
                    static_value
                } else {
                    self.excursion(static_value, limit(-T::ONE, T::ONE, amount))
                }
            }
        };

        self.current[channel] = modulated;
        self.range.constrain(modulated)
    }

    /// The last value produced for `channel`, clamped, without advancing.
    #[inline]
    pub fn current_modulated_value(&self, channel: usize) -> T {
        debug_assert!(channel < self.current.len());
        self.range
            .constrain(self.current.get(channel).copied().unwrap_or(T::ZERO))
    }

    #[inline]
    fn excursion(&self, value: T, amount: T) -> T {
        if amount > T::ZERO {
            value + (self.range.max_value() - value) * amount
        } else {
            value + (value - self.range.min_value()) * amount
        }
    }
}

impl<T: Sample> Default for ModulationParameter<T> {
    fn default() -> Self {
        Self::new()
    }
}
