//! Real-number element type of the engine
//!
//! Every buffer and formula in this crate is generic over [`Sample`], so the
//! same engine runs in single or double precision. Both `f32` and `f64`
//! implement it.

use std::fmt::Debug;

use num_traits::{Float, FloatConst};

/// Floating-point type usable as the engine's sample and coefficient type
pub trait Sample: Float + FloatConst + Debug + Default + Send + Sync + 'static {
    /// Convert an `f64` constant into this type (rounding for `f32`)
    fn from_f64(value: f64) -> Self;

    /// Widen this value to `f64`
    fn to_f64(self) -> f64;
}

impl Sample for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Sample for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}
