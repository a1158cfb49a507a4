//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//! It is efficient and offers an improvement over basic autocorrelation.
//!
//! Let $S=(s_0,s_1,\ldots,s_N)$ be a discrete signal and $W$ the longest period of interest
//! (the sample rate divided by [YinConfig::min_frequency]). The *difference function* at lag $t$
//! is defined by
//! $$ d(t) = \sum_{i=0}^{W-1} (s_i-s_{i+t})^2. $$
//! This function is close to zero when the signal "lines up" with itself. However, *close* is a relative term,
//! and the value of $d(t)$ depends on volume, which should not affect the pitch of the signal. For this
//! reason, the signal is normalized. The YIN algorithm computes the *cumulative mean normalized difference function*,
//! $$ d\'(t) = \begin{cases}1&\text{if }t=0\\\\ d(t) / \left[ \tfrac{1}{t}\sum_{i=1}^t d(i) \right] & \text{otherwise}\end{cases}. $$
//! The normalization keeps the short lags well above zero, so the first dip below the threshold
//! is taken as the period. Later dips at multiples of the period are ignored even when they
//! happen to be deeper.
//!
//! ## Implementation
//! Rather than evaluate the difference function directly, which costs $O(W^2)$ per frame,
//! an [FFT](https://en.wikipedia.org/wiki/Fast_Fourier_transform) is used.
//!
//! Frames whose RMS level is under [YinConfig::noise_floor] are reported as undetected without
//! any further work. After a candidate period is found, the deepest point within five lags of it
//! is refined by fitting a parabola to the raw difference function.

use serde::{Deserialize, Serialize};

use crate::detector::internals::Pitch;
use crate::detector::PitchDetector;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::root_mean_square;
use crate::utils::peak::{correct_peak, first_dip_below, local_minimum};

use super::internals::{windowed_square_error, yin_normalize_square_error, DetectorInternals};

/// Lags below this are never considered; they correspond to frequencies far above any
/// instrument the tuner is meant for.
const MIN_SEARCH_LAG: usize = 2;
/// Lags either side of the threshold candidate searched for a deeper dip.
const REFINE_RADIUS: usize = 5;

/// Frame length the browser analyser hands out (`fftSize`).
pub const DEFAULT_FRAME_SIZE: usize = 2048;

/// Tuning constants of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YinConfig {
    /// Lowest frequency searched, in Hz. Sets the longest period and therefore the
    /// minimum frame length (two periods).
    pub min_frequency: f64,
    /// Absolute threshold on the normalized difference function.
    pub threshold: f64,
    /// RMS level below which a frame is treated as silence.
    pub noise_floor: f64,
}

impl Default for YinConfig {
    fn default() -> Self {
        YinConfig {
            // Just below E2 (82.41 Hz), the lowest guitar string.
            min_frequency: 70.0,
            threshold: 0.15,
            noise_floor: 0.01,
        }
    }
}

impl YinConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_frequency.is_finite() && self.min_frequency > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_frequency must be positive, got {}",
                self.min_frequency
            )));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(self.noise_floor.is_finite() && self.noise_floor >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "noise_floor must not be negative, got {}",
                self.noise_floor
            )));
        }
        Ok(())
    }

    /// Longest period, in samples, searched at `sample_rate`.
    pub fn max_period(&self, sample_rate: usize) -> usize {
        (sample_rate as f64 / self.min_frequency).floor() as usize
    }

    /// Shortest frame that can be analysed at `sample_rate`.
    /// Saturates at `usize::MAX` for a minimum frequency too low to ever fit in a frame.
    pub fn min_frame_size(&self, sample_rate: usize) -> usize {
        self.max_period(sample_rate).saturating_mul(2)
    }
}

pub struct YINDetector<T>
where
    T: Float,
{
    internals: DetectorInternals<T>,
    config: YinConfig,
    threshold: T,
    noise_floor: T,
}

impl<T> YINDetector<T>
where
    T: Float,
{
    /// A detector for frames of exactly `size` samples.
    pub fn new(size: usize, config: YinConfig) -> Result<Self> {
        config.validate()?;
        let threshold = T::from_f64(config.threshold)
            .ok_or_else(|| Error::InvalidConfig("threshold is not representable".into()))?;
        let noise_floor = T::from_f64(config.noise_floor)
            .ok_or_else(|| Error::InvalidConfig("noise_floor is not representable".into()))?;
        Ok(YINDetector {
            internals: DetectorInternals::new(size),
            config,
            threshold,
            noise_floor,
        })
    }

    pub fn size(&self) -> usize {
        self.internals.size
    }

    pub fn config(&self) -> &YinConfig {
        &self.config
    }

    /// Check the frame against the detector's preconditions and return the longest
    /// period to search.
    fn max_period_for(&self, signal: &[T], sample_rate: usize) -> Result<usize> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate);
        }
        if signal.len() != self.internals.size {
            return Err(Error::FrameSizeMismatch {
                expected: self.internals.size,
                actual: signal.len(),
            });
        }
        let max_period = self.config.max_period(sample_rate);
        if max_period <= MIN_SEARCH_LAG {
            return Err(Error::FrequencyRangeTooNarrow {
                sample_rate,
                min_frequency: self.config.min_frequency,
            });
        }
        let required = max_period.saturating_mul(2);
        if signal.len() < required {
            return Err(Error::BufferTooShort {
                len: signal.len(),
                required,
                max_period,
            });
        }
        Ok(max_period)
    }
}

/// Pitch detection based on the YIN algorithm. See <http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf>
impl<T> PitchDetector<T> for YINDetector<T>
where
    T: Float,
{
    fn get_pitch(&mut self, signal: &[T], sample_rate: usize) -> Result<Option<Pitch<T>>> {
        let max_period = self.max_period_for(signal, sample_rate)?;

        // STEP 1: Silence and background noise never produce a pitch.
        if root_mean_square(signal) < self.noise_floor {
            return Ok(None);
        }

        let internals = &mut self.internals;
        let mut diff_ref = internals.buffers.get_real_buffer();
        let mut result_ref = internals.buffers.get_real_buffer();
        let diff = &mut diff_ref[..max_period];
        let result = &mut result_ref[..max_period];

        // STEP 2: Calculate the difference function, d_t, over one window of `max_period`.
        windowed_square_error(
            &signal[..2 * max_period],
            max_period,
            &mut internals.planner,
            &internals.buffers,
            diff,
        );

        // STEP 3: Calculate the cumulative mean normalized difference function, d_t'.
        result.copy_from_slice(diff);
        yin_normalize_square_error(result);

        // STEP 4: The absolute threshold. Take the first dip below `threshold`.
        let candidate = match first_dip_below(result, MIN_SEARCH_LAG, self.threshold) {
            Some(tau) => tau,
            None => return Ok(None),
        };

        // STEP 5: Settle on the true local minimum and fine-tune the period with quadratic
        // interpolation on d_t.
        let tau = local_minimum(result, candidate, REFINE_RADIUS);
        let (period, _) = correct_peak(tau, diff);
        if period <= T::zero() {
            return Ok(None);
        }

        let sample_rate = T::from_usize(sample_rate).ok_or(Error::InvalidSampleRate)?;
        let clarity = (T::one() - result[tau]).max(T::zero()).min(T::one());
        Ok(Some(Pitch {
            frequency: sample_rate / period,
            clarity,
        }))
    }
}

/// Estimate the fundamental frequency of one frame with the default [YinConfig].
///
/// ```
/// use pitch_tuner::detector::yin::estimate_frequency;
///
/// let sample_rate = 44100;
/// let signal: Vec<f64> = (0..2048)
///     .map(|i| (2.0 * std::f64::consts::PI * 110.0 * i as f64 / sample_rate as f64).sin())
///     .collect();
///
/// let frequency = estimate_frequency(&signal, sample_rate).unwrap().unwrap();
/// assert!((frequency - 110.0).abs() < 1.1);
///
/// let silence = vec![0.0f64; 2048];
/// assert_eq!(estimate_frequency(&silence, sample_rate).unwrap(), None);
/// ```
pub fn estimate_frequency<T: Float>(signal: &[T], sample_rate: usize) -> Result<Option<T>> {
    let mut detector = YINDetector::new(signal.len(), YinConfig::default())?;
    Ok(detector
        .get_pitch(signal, sample_rate)?
        .map(|pitch| pitch.frequency))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: usize = 44100;
    const SIZE: usize = 2048;

    fn sine(freq: f64, amplitude: f64) -> Vec<f64> {
        (0..SIZE)
            .map(|i| {
                amplitude * (2.0 * std::f64::consts::PI * freq * i as f64 / SAMPLE_RATE as f64).sin()
            })
            .collect()
    }

    fn detector() -> YINDetector<f64> {
        YINDetector::new(SIZE, YinConfig::default()).unwrap()
    }

    #[test]
    fn silence_is_undetected() {
        let mut detector = detector();
        assert_eq!(detector.get_pitch(&vec![0.0; SIZE], SAMPLE_RATE).unwrap(), None);
    }

    #[test]
    fn quiet_signal_is_gated() {
        let mut detector = detector();
        let quiet = sine(196.0, 0.005);
        assert_eq!(detector.get_pitch(&quiet, SAMPLE_RATE).unwrap(), None);
    }

    #[test]
    fn noise_floor_is_configurable() {
        let config = YinConfig {
            noise_floor: 0.001,
            ..YinConfig::default()
        };
        let mut detector = YINDetector::<f64>::new(SIZE, config).unwrap();
        let pitch = detector.get_pitch(&sine(196.0, 0.005), SAMPLE_RATE).unwrap().unwrap();
        assert!((pitch.frequency - 196.0).abs() < 1.96);
    }

    #[test]
    fn guitar_strings_within_one_percent() {
        let mut detector = detector();
        for &freq in &[82.41, 110.0, 146.83, 196.0, 246.94, 329.63] {
            let pitch = detector.get_pitch(&sine(freq, 0.8), SAMPLE_RATE).unwrap().unwrap();
            assert!(
                (pitch.frequency - freq).abs() < freq * 0.01,
                "expected {} got {}",
                freq,
                pitch.frequency
            );
            assert!(pitch.clarity > 0.85);
        }
    }

    #[test]
    fn short_frame_is_rejected() {
        // 44100 / 70 = 630 lags, so 1024 samples cannot hold two periods.
        assert_eq!(YinConfig::default().min_frame_size(SAMPLE_RATE), 1260);
        let mut detector = YINDetector::<f64>::new(1024, YinConfig::default()).unwrap();
        let err = detector.get_pitch(&vec![0.5; 1024], SAMPLE_RATE).unwrap_err();
        match err {
            Error::BufferTooShort {
                len,
                required,
                max_period,
            } => {
                assert_eq!(len, 1024);
                assert_eq!(max_period, 630);
                assert_eq!(required, 1260);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unreachable_min_frequency_is_a_short_frame() {
        let config = YinConfig {
            min_frequency: 1e-300,
            ..YinConfig::default()
        };
        assert_eq!(config.min_frame_size(SAMPLE_RATE), usize::MAX);
        let mut detector = YINDetector::<f64>::new(SIZE, config).unwrap();
        assert!(matches!(
            detector.get_pitch(&vec![0.5; SIZE], SAMPLE_RATE),
            Err(Error::BufferTooShort {
                len: SIZE,
                required: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn frame_size_must_match() {
        let mut detector = detector();
        assert!(matches!(
            detector.get_pitch(&vec![0.0; SIZE / 2], SAMPLE_RATE),
            Err(Error::FrameSizeMismatch { .. })
        ));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let mut detector = detector();
        assert!(matches!(
            detector.get_pitch(&sine(110.0, 0.5), 0),
            Err(Error::InvalidSampleRate)
        ));
    }

    #[test]
    fn tiny_sample_rate_is_rejected() {
        let mut detector = detector();
        assert!(matches!(
            detector.get_pitch(&sine(110.0, 0.5), 100),
            Err(Error::FrequencyRangeTooNarrow { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = YinConfig {
            min_frequency: 0.0,
            ..YinConfig::default()
        };
        assert!(matches!(
            YINDetector::<f32>::new(SIZE, config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn estimate_frequency_with_f32_samples() {
        let signal: Vec<f32> = sine(146.83, 0.5).into_iter().map(|s| s as f32).collect();
        let freq = estimate_frequency(&signal, SAMPLE_RATE).unwrap().unwrap();
        assert!((freq - 146.83).abs() < 1.5);
    }
}
