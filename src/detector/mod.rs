use crate::detector::internals::Pitch;
use crate::error::Result;
use crate::float::Float;

pub mod internals;
pub mod yin;

/// A monophonic pitch estimator. `Ok(None)` means the frame held no detectable
/// pitch (silence, noise, between notes); `Err` is reserved for frames that
/// break the detector's preconditions.
pub trait PitchDetector<T>
where
    T: Float,
{
    fn get_pitch(&mut self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>>;
}
