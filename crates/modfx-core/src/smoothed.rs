//! Linear parameter ramps for click-free automation.
//!
//! Audio parameters need smooth transitions to avoid audible "zipper noise"
//! when their values change. [`SmoothedValue`] moves from its current value to
//! a target in equal steps over a fixed smoothing time, one step per sample.
//!
//! ## Usage
//!
//! ```rust
//! use modfx_core::SmoothedValue;
//!
//! let mut gain = SmoothedValue::<f32>::default();
//! gain.setup(48000.0, 0.0, 0.01); // 10 ms ramps
//!
//! gain.set_target_value(1.0);
//! for _ in 0..480 {
//!     let _smoothed = gain.next_value();
//! }
//! assert_eq!(gain.current_value(), 1.0);
//! ```

use crate::math::Sample;

/// Slack, in samples, absorbed when rounding a ramp length up.
///
/// Keeps an f32 smoothing time such as `0.05` from adding a whole extra step.
const RAMP_LENGTH_SLACK: f64 = 1e-4;

/// A value that ramps linearly towards its target.
///
/// Constant rate of change, predictable transition time: a ramp takes
/// `ceil(smoothing_time * sample_rate)` calls to [`next_value`](Self::next_value)
/// and lands exactly on the target.
#[derive(Debug, Clone)]
pub struct SmoothedValue<T> {
    /// Last output value
    current: T,
    /// Value being ramped towards
    target: T,
    /// Step added per sample while ramping
    increment: T,
    /// Ramp duration in seconds
    smoothing_time: T,
    /// Steps left in the current ramp
    remaining_steps: u32,
    /// Sample rate in Hz
    sample_rate: f64,
}

impl<T: Sample> SmoothedValue<T> {
    /// Create a settled value with no smoothing configured.
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: T::ZERO,
            smoothing_time: T::ZERO,
            remaining_steps: 0,
            sample_rate: 44100.0,
        }
    }

    /// Create with full configuration.
    pub fn with_config(initial: T, sample_rate: f64, smoothing_time: T) -> Self {
        let mut value = Self::new(initial);
        value.setup(sample_rate, initial, smoothing_time);
        value
    }

    /// Reset all state: settle on `initial` and adopt the new timing.
    pub fn setup(&mut self, sample_rate: f64, initial: T, smoothing_time: T) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = if sample_rate > 0.0 { sample_rate } else { 1.0 };
        self.smoothing_time = smoothing_time;
        self.current = initial;
        self.target = initial;
        self.increment = T::ZERO;
        self.remaining_steps = 0;
    }

    /// Start a ramp from the current value towards `target`.
    ///
    /// Writing the target that is already set is a no-op, so repeated host
    /// automation writes do not restart the ramp. A zero smoothing time jumps
    /// on the next sample.
    pub fn set_target_value(&mut self, target: T) {
        if target == self.target {
            return;
        }
        self.target = target;

        if target == self.current {
            self.increment = T::ZERO;
            self.remaining_steps = 0;
            return;
        }

        let steps = self.ramp_length();
        self.increment = (target - self.current) / T::from_f64(f64::from(steps));
        self.remaining_steps = steps;
    }

    /// Snap to `value` immediately, cancelling any ramp.
    ///
    /// Meant for initialisation; on a running audio thread this is an audible jump.
    pub fn set_current_and_target_value(&mut self, value: T) {
        self.current = value;
        self.target = value;
        self.increment = T::ZERO;
        self.remaining_steps = 0;
    }

    /// Change the ramp duration used by subsequent target changes.
    pub fn set_smoothing_time(&mut self, smoothing_time: T) {
        self.smoothing_time = smoothing_time;
    }

    /// Advance one sample and return the new value.
    ///
    /// Once the ramp is exhausted the value stays put until the next target change.
    #[inline]
    pub fn next_value(&mut self) -> T {
        if self.remaining_steps == 0 {
            return self.current;
        }
        self.remaining_steps -= 1;
        if self.remaining_steps == 0 {
            self.current = self.target;
        } else {
            self.current += self.increment;
        }
        self.current
    }

    /// Last output value, without advancing.
    #[inline]
    pub fn current_value(&self) -> T {
        self.current
    }

    /// The value being ramped towards.
    #[inline]
    pub fn target_value(&self) -> T {
        self.target
    }

    /// Ramp duration in seconds.
    pub fn smoothing_time(&self) -> T {
        self.smoothing_time
    }

    /// Steps left before the target is reached.
    #[inline]
    pub fn remaining_steps(&self) -> u32 {
        self.remaining_steps
    }

    /// Whether a ramp is in progress.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.remaining_steps > 0
    }

    fn ramp_length(&self) -> u32 {
        let samples = self.smoothing_time.to_f64() * self.sample_rate;
        if samples > 0.0 {
            (libm::ceil(samples - RAMP_LENGTH_SLACK) as u32).max(1)
        } else {
            1
        }
    }
}

impl<T: Sample> Default for SmoothedValue<T> {
    fn default() -> Self {
        Self::new(T::ZERO)
    }
}
