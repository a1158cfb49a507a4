//! Generic [Float] type which acts as a stand-in for `f32` or `f64`.
use rustfft::num_traits::float::FloatCore as NumFloatCore;
use rustfft::FftNum;
use std::fmt::{Debug, Display};

/// Signals are processed as arrays of [Float]s. A [Float] is normally `f32` or `f64`.
///
/// `FloatCore` has no `sqrt`, which the RMS gate needs, so it is forwarded to the
/// primitive implementation.
pub trait Float: Display + Debug + NumFloatCore + FftNum + std::iter::Sum {
    fn sqrt(self) -> Self;
}

impl Float for f64 {
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

impl Float for f32 {
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}
