use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::FftPlanner;

use crate::float::Float;
use crate::utils::buffer::square_sum;
use crate::utils::buffer::{copy_complex_to_real, copy_real_to_complex, BufferPool};

/// A detected pitch. `clarity` is close to one for clean periodic signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    pub frequency: T,
    pub clarity: T,
}

/// Data structure to hold any buffers needed for pitch computation.
/// Frames arrive once per animation tick, so buffers and FFT plans are kept
/// here and reused rather than rebuilt for every frame.
pub struct DetectorInternals<T>
where
    T: Float,
{
    pub size: usize,
    pub buffers: BufferPool<T>,
    pub planner: FftPlanner<T>,
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    pub fn new(size: usize) -> Self {
        DetectorInternals {
            size,
            buffers: BufferPool::new(size),
            planner: FftPlanner::new(),
        }
    }
}

/// Compute the windowed autocorrelation of `signal` and put the result in `result`.
/// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
/// the function
///
/// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
///
/// This function assumes `window_size` is at most half of the length of `signal`.
pub fn windowed_autocorrelation<T>(
    signal: &[T],
    window_size: usize,
    planner: &mut FftPlanner<T>,
    buffers: &BufferPool<T>,
    result: &mut [T],
) where
    T: Float,
{
    assert!(
        buffers.buffer_size >= signal.len(),
        "Buffers must have a length at least equal to `signal`."
    );

    let fft = planner.plan_fft_forward(signal.len());
    let inv_fft = planner.plan_fft_inverse(signal.len());
    let scratch_len = fft
        .get_inplace_scratch_len()
        .max(inv_fft.get_inplace_scratch_len());

    let mut signal_ref = buffers.get_complex_buffer();
    let mut truncated_ref = buffers.get_complex_buffer();
    let mut scratch_ref = buffers.get_complex_buffer();
    // Some lengths (large prime factors) need more scratch space than the signal itself.
    if scratch_ref.len() < scratch_len {
        scratch_ref.resize(scratch_len, Complex::zero());
    }

    let signal_complex = &mut signal_ref[..signal.len()];
    let truncated_signal_complex = &mut truncated_ref[..signal.len()];

    // To achieve the windowed autocorrelation, we compute the cross correlation between
    // the original signal and the signal truncated to lie in `0..window_size`
    copy_real_to_complex(signal, signal_complex);
    copy_real_to_complex(&signal[..window_size], truncated_signal_complex);
    fft.process_with_scratch(
        signal_complex,
        &mut scratch_ref[..fft.get_inplace_scratch_len()],
    );
    fft.process_with_scratch(
        truncated_signal_complex,
        &mut scratch_ref[..fft.get_inplace_scratch_len()],
    );
    // rustfft doesn't normalize, and fft -> inverse fft scales by `signal.len()`,
    // so divide once here.
    let normalization_const = T::one() / T::from_usize(signal.len()).unwrap_or_else(T::one);
    signal_complex
        .iter_mut()
        .zip(truncated_signal_complex.iter())
        .for_each(|(a, b)| {
            *a = *a * normalization_const * b.conj();
        });
    inv_fft.process_with_scratch(
        signal_complex,
        &mut scratch_ref[..inv_fft.get_inplace_scratch_len()],
    );

    // The result is valid only for `0..window_size`
    copy_complex_to_real(&signal_complex[..window_size], result);
}

/// Compute the windowed square error, _d(t)_, of `signal`. For a window size of _w_ and a signal
/// _x=(x_0,x_1,...)_, this is defined by
///
///  > d(t) = sum_{i=0}^{w-1} (x_i - x_{i+t})^2
///
/// for `t` in `0..w`. This function is computed efficiently using an FFT. It is assumed that
/// `window_size` is at most half the length of `signal`.
pub fn windowed_square_error<T>(
    signal: &[T],
    window_size: usize,
    planner: &mut FftPlanner<T>,
    buffers: &BufferPool<T>,
    result: &mut [T],
) where
    T: Float,
{
    assert!(
        2 * window_size <= signal.len(),
        "The window size cannot be more than half the signal length"
    );

    let two = T::one() + T::one();

    // The windowed square error function, d(t), can be computed
    // as d(t) = pow_0^w + pow_t^{t+w} - 2*windowed_autocorrelation(t)
    // where pow_a^b is the sum of the square of `signal` on the window `a..b`
    // We proceed accordingly.
    windowed_autocorrelation(signal, window_size, planner, buffers, result);
    let mut windowed_power = square_sum(&signal[..window_size]);
    let power = windowed_power;

    result[..window_size]
        .iter_mut()
        .enumerate()
        .for_each(|(i, a)| {
            *a = power + windowed_power - two * *a;
            // Slide the power window by one sample.
            windowed_power = windowed_power - signal[i] * signal[i]
                + signal[i + window_size] * signal[i + window_size];
        })
}

/// Direct O(w^2) evaluation of the windowed square error. Used to check the FFT path.
pub fn direct_square_error<T: Float>(signal: &[T], window_size: usize, result: &mut [T]) {
    assert!(2 * window_size <= signal.len());
    for (tau, r) in result[..window_size].iter_mut().enumerate() {
        *r = signal[..window_size]
            .iter()
            .zip(&signal[tau..tau + window_size])
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum();
    }
}

/// Calculate the "cumulative mean normalized difference function" as
/// specified in the YIN paper. If _d(t)_ is the square error function,
/// compute _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) / [ (1/t) * sum_{i=1}^t d(i) ]
///
/// A zero running sum (a perfectly flat prefix) normalizes to one.
pub fn yin_normalize_square_error<T: Float>(square_error: &mut [T]) {
    if square_error.is_empty() {
        return;
    }
    let mut sum = T::zero();
    square_error[0] = T::one();
    square_error
        .iter_mut()
        .enumerate()
        .skip(1)
        .for_each(|(i, a)| {
            sum = sum + *a;
            *a = if sum > T::zero() {
                *a * T::from_usize(i).unwrap_or_else(T::one) / sum
            } else {
                T::one()
            };
        });
}
