//! Scalar DSP helpers shared by every processor.
//!
//! All functions are allocation-free and suitable for `no_std`. They are
//! generic over [`Sample`], so the same code path serves `f32` and `f64`
//! processing chains.
//!
//! # Level Conversions
//!
//! - [`decibels_to_amplitude`] / [`amplitude_to_decibels`] - dBFS ↔ linear (1.0 = 0 dBFS)
//!
//! # Wave Generators
//!
//! Naive (non band-limited) generators mapping a phase in `[0, 1)` to an
//! amplitude in `[-1, 1]`:
//!
//! | Function | Shape |
//! |----------|-------|
//! | [`generate_sine`] | `sin(2π·phase)` |
//! | [`generate_triangle`] | 0 → 1 → -1 → 0 over one cycle |
//! | [`generate_square`] | sign of the sine |
//! | [`generate_saw`] | falling ramp from 1 to -1 |
//!
//! # Waveshapers
//!
//! [`arraya`], [`sigmoid`], [`sigmoid2`] and [`tanh_estimate`] are static
//! saturation curves for clipping stages.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
#[cfg(target_has_atomic = "64")]
use core::sync::atomic::AtomicU64;
use core::sync::atomic::{AtomicU32, Ordering};

/// Floating-point sample type processed by the toolkit.
///
/// Implemented for `f32` and, on targets with 64-bit atomics, `f64`. Every
/// transcendental function routes through `libm` so the crate stays `no_std`
/// compatible.
///
/// Values shared across threads (parameter targets, modulation buffers) are
/// stored as bit patterns in [`Sample::Atomic`]: `AtomicU32` for `f32`, so
/// 32-bit microcontrollers without 64-bit atomics can still build the crate.
pub trait Sample:
    Copy
    + Debug
    + Default
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// One half.
    const HALF: Self;
    /// The circle constant π.
    const PI: Self;
    /// Euler's number.
    const E: Self;

    /// Convert from `f64`, rounding to the nearest representable value.
    fn from_f64(value: f64) -> Self;
    /// Widen to `f64` (lossless for both implementations).
    fn to_f64(self) -> f64;

    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine of a value in radians.
    fn sin(self) -> Self;
    /// `e^self`.
    fn exp(self) -> Self;
    /// `self^exponent`.
    fn powf(self, exponent: Self) -> Self;
    /// Base-10 logarithm.
    fn log10(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Larger of two values.
    fn max(self, other: Self) -> Self;
    /// Smaller of two values.
    fn min(self, other: Self) -> Self;

    /// Lock-free cell holding one value's bit pattern.
    type Atomic: Debug + Send + Sync;

    /// Create a cell holding `value`.
    fn new_atomic(value: Self) -> Self::Atomic;
    /// Relaxed load.
    fn load_atomic(cell: &Self::Atomic) -> Self;
    /// Relaxed store.
    fn store_atomic(cell: &Self::Atomic, value: Self);
}

impl Sample for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const PI: Self = core::f32::consts::PI;
    const E: Self = core::f32::consts::E;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrtf(self)
    }
    #[inline]
    fn sin(self) -> Self {
        libm::sinf(self)
    }
    #[inline]
    fn exp(self) -> Self {
        libm::expf(self)
    }
    #[inline]
    fn powf(self, exponent: Self) -> Self {
        libm::powf(self, exponent)
    }
    #[inline]
    fn log10(self) -> Self {
        libm::log10f(self)
    }
    #[inline]
    fn abs(self) -> Self {
        libm::fabsf(self)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        libm::fmaxf(self, other)
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        libm::fminf(self, other)
    }

    type Atomic = AtomicU32;

    #[inline]
    fn new_atomic(value: Self) -> AtomicU32 {
        AtomicU32::new(value.to_bits())
    }
    #[inline]
    fn load_atomic(cell: &AtomicU32) -> Self {
        f32::from_bits(cell.load(Ordering::Relaxed))
    }
    #[inline]
    fn store_atomic(cell: &AtomicU32, value: Self) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(target_has_atomic = "64")]
impl Sample for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const HALF: Self = 0.5;
    const PI: Self = core::f64::consts::PI;
    const E: Self = core::f64::consts::E;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrt(self)
    }
    #[inline]
    fn sin(self) -> Self {
        libm::sin(self)
    }
    #[inline]
    fn exp(self) -> Self {
        libm::exp(self)
    }
    #[inline]
    fn powf(self, exponent: Self) -> Self {
        libm::pow(self, exponent)
    }
    #[inline]
    fn log10(self) -> Self {
        libm::log10(self)
    }
    #[inline]
    fn abs(self) -> Self {
        libm::fabs(self)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        libm::fmax(self, other)
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        libm::fmin(self, other)
    }

    type Atomic = AtomicU64;

    #[inline]
    fn new_atomic(value: Self) -> AtomicU64 {
        AtomicU64::new(value.to_bits())
    }
    #[inline]
    fn load_atomic(cell: &AtomicU64) -> Self {
        f64::from_bits(cell.load(Ordering::Relaxed))
    }
    #[inline]
    fn store_atomic(cell: &AtomicU64, value: Self) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Convert dBFS to linear amplitude (1.0 = 0 dBFS).
///
/// # Example
/// ```rust
/// use modfx_core::decibels_to_amplitude;
///
/// assert!((decibels_to_amplitude(0.0_f32) - 1.0).abs() < 1e-6);
/// assert!((decibels_to_amplitude(-20.0_f64) - 0.1).abs() < 1e-12);
/// ```
#[inline]
pub fn decibels_to_amplitude<T: Sample>(db: T) -> T {
    T::from_f64(10.0).powf(db * T::from_f64(0.05))
}

/// Convert linear amplitude to dBFS (1.0 = 0 dBFS).
///
/// No floor is applied: an amplitude of 0 yields negative infinity.
#[inline]
pub fn amplitude_to_decibels<T: Sample>(amplitude: T) -> T {
    amplitude.log10() * T::from_f64(20.0)
}

/// Limit a value to `[lower, upper]`.
///
/// Assumes `lower <= upper`; the bounds are not validated.
#[inline]
pub fn limit<T: Sample>(lower: T, upper: T, value: T) -> T {
    if value < lower {
        lower
    } else if upper < value {
        upper
    } else {
        value
    }
}

/// Sine wave from a phase in `[0, 1)`.
#[inline]
pub fn generate_sine<T: Sample>(phase: T) -> T {
    (phase * T::PI * T::from_f64(2.0)).sin()
}

/// Naive falling saw from a phase in `[0, 1)`: 1 at phase 0, -1 at the end of the cycle.
#[inline]
pub fn generate_saw<T: Sample>(phase: T) -> T {
    T::ONE - T::from_f64(2.0) * phase
}

/// Naive square wave from a phase in `[0, 1)`, high while the matching sine is non-negative.
#[inline]
pub fn generate_square<T: Sample>(phase: T) -> T {
    if generate_sine(phase) >= T::ZERO {
        T::ONE
    } else {
        -T::ONE
    }
}

/// Naive triangle wave from a phase in `[0, 1)`, starting at 0 and peaking at phase 0.25.
#[inline]
pub fn generate_triangle<T: Sample>(phase: T) -> T {
    let four = T::from_f64(4.0);
    if phase < T::from_f64(0.25) {
        phase * four
    } else if phase < T::from_f64(0.75) {
        T::from_f64(2.0) - phase * four
    } else {
        phase * four - four
    }
}

/// Cubic soft clipper: `1.5x(1 - x²/3)` inside `[-1, 1]`, hard limited outside.
#[inline]
pub fn arraya<T: Sample>(input: T) -> T {
    if input > T::ONE {
        T::ONE
    } else if input < -T::ONE {
        -T::ONE
    } else {
        T::from_f64(1.5) * input * (T::ONE - input * input / T::from_f64(3.0))
    }
}

/// Logistic sigmoid rescaled to `(-1, 1)`.
#[inline]
pub fn sigmoid<T: Sample>(input: T) -> T {
    T::from_f64(2.0) / (T::ONE + (-input).exp()) - T::ONE
}

/// Sigmoid normalised so that an input of ±1 maps to exactly ±1.
#[inline]
pub fn sigmoid2<T: Sample>(input: T) -> T {
    let e_to_input = input.exp();
    ((e_to_input - T::ONE) * (T::E + T::ONE)) / ((e_to_input + T::ONE) * (T::E - T::ONE))
}

/// Continued-fraction approximation of `tanh`.
///
/// The input is clamped to ±3.0506, beyond which the curve is held flat.
#[inline]
pub fn tanh_estimate<T: Sample>(input: T) -> T {
    let bound = T::from_f64(3.0506);
    let x = limit(-bound, bound, input);
    let x2 = x * x;
    x / (T::ONE
        + x2 / (T::from_f64(3.0) + x2 / (T::from_f64(5.0) + x2 / T::from_f64(7.0))))
}
