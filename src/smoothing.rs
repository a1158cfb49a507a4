//! De-noising of per-frame frequency estimates.
//!
//! Raw estimates jump around between frames: an attack transient, a harmonic winning
//! for one frame, a half-muted string. A short median filter rejects those spikes, and a
//! [StabilityTracker] counts how long the filtered value has stayed put so that a display
//! only commits to a reading once it has settled.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::filters::median;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of recent estimates kept.
    pub history_capacity: usize,
    /// Number of newest estimates the median is taken over.
    pub window_size: usize,
    /// Largest frame-to-frame change, in Hz, still counted as stable.
    pub stability_threshold: f64,
    /// Consecutive stable frames needed before a reading is locked in.
    pub lock_frames: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig {
            history_capacity: 10,
            window_size: 5,
            stability_threshold: 1.0,
            lock_frames: 3,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window_size must be at least 1".into()));
        }
        if self.history_capacity < self.window_size {
            return Err(Error::InvalidConfig(format!(
                "history_capacity ({}) must hold a full window ({})",
                self.history_capacity, self.window_size
            )));
        }
        if !(self.stability_threshold.is_finite() && self.stability_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "stability_threshold must be positive, got {}",
                self.stability_threshold
            )));
        }
        Ok(())
    }
}

/// Median of the newest `window_size` entries of `history` (newest last).
///
/// A history shorter than the window is not filtered: the newest value is passed
/// through as is. An empty history has nothing to report.
///
/// ```
/// use pitch_tuner::smoothing::smooth;
///
/// assert_eq!(smooth(&[100., 100., 100., 101., 100.], 5), Some(100.));
/// assert_eq!(smooth(&[100., 140.], 5), Some(140.));
/// assert_eq!(smooth::<f64>(&[], 5), None);
/// ```
pub fn smooth<T: Float>(history: &[T], window_size: usize) -> Option<T> {
    let latest = *history.last()?;
    if window_size == 0 || history.len() < window_size {
        return Some(latest);
    }
    median(&history[history.len() - window_size..])
}

/// Bounded FIFO of recent estimates. Pushing onto a full history drops the oldest value.
#[derive(Debug, Clone)]
pub struct FrequencyHistory<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Float> FrequencyHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        FrequencyHistory {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<T> {
        self.values.back().copied()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Same as [smooth] over the contents of the history.
    pub fn smooth(&self, window_size: usize) -> Option<T> {
        let skip = self.values.len().saturating_sub(window_size.max(1));
        let window: Vec<T> = self.values.iter().skip(skip).copied().collect();
        smooth(&window, window_size)
    }
}

/// Debounce counter over consecutive smoothed values.
#[derive(Debug, Clone)]
pub struct StabilityTracker<T> {
    previous: Option<T>,
    stable_frames: u32,
    threshold: T,
    lock_frames: u32,
}

impl<T: Float> StabilityTracker<T> {
    pub fn new(threshold: T, lock_frames: u32) -> Self {
        StabilityTracker {
            previous: None,
            stable_frames: 0,
            threshold,
            lock_frames,
        }
    }

    /// Record the next smoothed value and return the updated counter. The first value
    /// after construction or [reset](Self::reset) has nothing to compare against and
    /// counts as a jump.
    pub fn update(&mut self, value: T) -> u32 {
        let stable = match self.previous {
            Some(previous) => (value - previous).abs() < self.threshold,
            None => false,
        };
        self.stable_frames = if stable {
            self.stable_frames.saturating_add(1)
        } else {
            0
        };
        self.previous = Some(value);
        self.stable_frames
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    pub fn is_locked(&self) -> bool {
        self.stable_frames >= self.lock_frames
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.stable_frames = 0;
    }
}

/// Output of one [Smoother::push].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed<T> {
    pub frequency: T,
    pub stable_frames: u32,
    pub locked: bool,
}

/// History, median window and stability counter of one tuner session.
#[derive(Debug, Clone)]
pub struct Smoother<T> {
    history: FrequencyHistory<T>,
    window_size: usize,
    tracker: StabilityTracker<T>,
}

impl<T: Float> Smoother<T> {
    pub fn new(config: &SmoothingConfig) -> Result<Self> {
        config.validate()?;
        let threshold = T::from_f64(config.stability_threshold).ok_or_else(|| {
            Error::InvalidConfig("stability_threshold is not representable".into())
        })?;
        Ok(Smoother {
            history: FrequencyHistory::new(config.history_capacity),
            window_size: config.window_size,
            tracker: StabilityTracker::new(threshold, config.lock_frames),
        })
    }

    /// Append a detected frequency and return the filtered value with the updated
    /// stability state.
    pub fn push(&mut self, estimate: T) -> Smoothed<T> {
        self.history.push(estimate);
        let frequency = self.history.smooth(self.window_size).unwrap_or(estimate);
        let stable_frames = self.tracker.update(frequency);
        Smoothed {
            frequency,
            stable_frames,
            locked: self.tracker.is_locked(),
        }
    }

    pub fn history(&self) -> &FrequencyHistory<T> {
        &self.history
    }

    pub fn stability(&self) -> &StabilityTracker<T> {
        &self.tracker
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_full_window() {
        assert_eq!(smooth(&[100., 100., 100., 101., 100.], 5), Some(100.));
    }

    #[test]
    fn window_uses_newest_entries() {
        let history = [50., 50., 50., 200., 201., 202.];
        assert_eq!(smooth(&history, 3), Some(201.));
    }

    #[test]
    fn short_history_passes_latest_through() {
        assert_eq!(smooth(&[82.0, 97.5, 110.3], 5), Some(110.3));
    }

    #[test]
    fn history_evicts_oldest() {
        let mut history = FrequencyHistory::new(3);
        for v in [1., 2., 3., 4.] {
            history.push(v);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<f64>>(), vec![2., 3., 4.]);
        assert_eq!(history.latest(), Some(4.));
    }

    #[test]
    fn history_smooth_matches_slice_smooth() {
        let values = [110., 111., 250., 110.5, 109.8, 110.2, 55., 110.1];
        let mut history = FrequencyHistory::new(10);
        for (i, &v) in values.iter().enumerate() {
            history.push(v);
            assert_eq!(history.smooth(5), smooth(&values[..=i], 5));
            assert_eq!(history.smooth(0), smooth(&values[..=i], 0));
        }
        assert_eq!(FrequencyHistory::<f64>::new(4).smooth(5), None);
    }

    #[test]
    fn stability_counter_crosses_threshold() {
        let mut tracker = StabilityTracker::new(1.0, 3);
        let counts: Vec<u32> = [100., 100.5, 100.8, 103., 103.2, 103.1, 102.9]
            .iter()
            .map(|&v| tracker.update(v))
            .collect();
        assert_eq!(counts, vec![0, 1, 2, 0, 1, 2, 3]);
        assert!(tracker.is_locked());

        tracker.update(90.);
        assert_eq!(tracker.stable_frames(), 0);
        assert!(!tracker.is_locked());
    }

    #[test]
    fn change_of_exactly_threshold_is_a_jump() {
        let mut tracker = StabilityTracker::new(1.0, 3);
        tracker.update(100.);
        assert_eq!(tracker.update(100.5), 1);
        assert_eq!(tracker.update(101.5), 0);
    }

    #[test]
    fn smoother_rejects_spike_and_locks() {
        let mut smoother = Smoother::<f64>::new(&SmoothingConfig::default()).unwrap();
        let mut last = None;
        for v in [110., 110.2, 109.9, 110.1, 220., 110.0, 110.1, 109.95] {
            last = Some(smoother.push(v));
        }
        let last = last.unwrap();
        assert!((last.frequency - 110.0).abs() < 0.2);
        assert!(last.locked);
        assert_eq!(smoother.history().len(), 8);
    }

    #[test]
    fn smoother_reset_clears_state() {
        let mut smoother = Smoother::<f32>::new(&SmoothingConfig::default()).unwrap();
        for _ in 0..6 {
            smoother.push(196.0);
        }
        assert!(smoother.stability().is_locked());
        smoother.reset();
        assert!(smoother.history().is_empty());
        assert_eq!(smoother.push(196.0).stable_frames, 0);
    }

    #[test]
    fn invalid_configs() {
        let window_too_big = SmoothingConfig {
            history_capacity: 4,
            ..SmoothingConfig::default()
        };
        assert!(Smoother::<f64>::new(&window_too_big).is_err());

        let zero_window = SmoothingConfig {
            window_size: 0,
            ..SmoothingConfig::default()
        };
        assert!(zero_window.validate().is_err());
    }
}
