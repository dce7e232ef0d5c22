//! Closed value range used to bound parameter output.

use crate::math::{Sample, limit};

/// A closed interval `[min, max]`.
///
/// The caller is responsible for `min <= max`; the bounds are not validated.
///
/// # Example
///
/// ```rust
/// use modfx_core::Range;
///
/// let range = Range::new(-1.0_f32, 1.0);
/// assert_eq!(range.constrain(3.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    min: T,
    max: T,
}

impl<T: Sample> Range<T> {
    /// Create a range from its bounds.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Replace both bounds.
    pub fn set_range(&mut self, min: T, max: T) {
        self.min = min;
        self.max = max;
    }

    /// Restrict a value to the range.
    #[inline]
    pub fn constrain(&self, value: T) -> T {
        limit(self.min, self.max, value)
    }

    /// Lower bound.
    #[inline]
    pub fn min_value(&self) -> T {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max_value(&self) -> T {
        self.max
    }
}

/// Normalised `[0, 1]`.
impl<T: Sample> Default for Range<T> {
    fn default() -> Self {
        Self::new(T::ZERO, T::ONE)
    }
}
