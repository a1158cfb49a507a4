use object_pool::{Pool, Reusable};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real part of `output`, zeroing the imaginary part
/// and any trailing entries of `output`.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = *i;
        o.im = T::zero();
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real part of `input` into `output`, zeroing any trailing entries.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T]) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .map(|c| c.re)
        .zip(output.iter_mut())
        .for_each(|(i, o)| *o = i);

    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = T::zero());
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Root-mean-square level of `arr`. An empty slice has a level of zero.
pub fn root_mean_square<T: Float>(arr: &[T]) -> T {
    if arr.is_empty() {
        return T::zero();
    }
    let len = T::from_usize(arr.len()).unwrap_or_else(T::one);
    (square_sum(arr) / len).sqrt()
}

/// A pool of real/complex buffer objects. Buffers are dynamically created as needed
/// and reused if previously `Drop`ed. Buffers are never freed. Instead buffers are kept
/// in reserve and reused when a new buffer is requested.
///
/// A detector analyses one frame per animation tick, so allocating its FFT scratch
/// space once and handing it back every frame keeps the hot path allocation free.
///
/// ```rust
/// use pitch_tuner::utils::buffer::BufferPool;
///
/// let buffers = BufferPool::new(3);
/// let mut buf1 = buffers.get_real_buffer();
/// {
///     // This buffer won't be dropped until the end of the function
///     buf1[0] = 5.5;
/// }
/// {
///     // This buffer will be dropped when the scope ends
///     let mut buf2 = buffers.get_real_buffer();
///     buf2[1] = 6.6;
/// }
/// drop(buf1);
///
/// let buf1 = &buffers.get_real_buffer();
/// let buf2 = &buffers.get_real_buffer();
/// // Buffers are distributed in LIFO order, so compare them "backwards".
/// assert_eq!(&buf2[..], &[0.0, 6.6, 0.0]);
/// assert_eq!(&buf1[..], &[5.5, 0., 0.]);
/// ```
pub struct BufferPool<T> {
    real_buffers: Pool<Vec<T>>,
    complex_buffers: Pool<Vec<Complex<T>>>,
    pub buffer_size: usize,
}

impl<T: Float> BufferPool<T> {
    pub fn new(buffer_size: usize) -> Self {
        BufferPool {
            real_buffers: Pool::new(0, || new_real_buffer(buffer_size)),
            complex_buffers: Pool::new(0, || new_complex_buffer(buffer_size)),
            buffer_size,
        }
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_real_buffer(&self) -> Reusable<'_, Vec<T>> {
        self.real_buffers.pull(|| new_real_buffer(self.buffer_size))
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_complex_buffer(&self) -> Reusable<'_, Vec<Complex<T>>> {
        self.complex_buffers
            .pull(|| new_complex_buffer(self.buffer_size))
    }
}
