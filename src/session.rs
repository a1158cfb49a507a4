//! One tuner instance: detector, smoothing state and tuning table bundled together.
//!
//! The caller owns the capture loop and feeds one frame per tick. Every piece of
//! per-instance state lives in the session, so independent tuners each get their own.

use log::{debug, trace};

use crate::config::TunerConfig;
use crate::detector::internals::Pitch;
use crate::detector::yin::YINDetector;
use crate::detector::PitchDetector;
use crate::error::Result;
use crate::float::Float;
use crate::smoothing::{Smoothed, Smoother};
use crate::tuning::{NoteReading, TuningStatus, TuningTable};

/// Shown in place of a note name while nothing is locked in.
pub const PLACEHOLDER: &str = "--";

/// A settled reading, ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct TunerReading {
    pub note: NoteReading,
    pub status: TuningStatus,
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TunerFrame<T: Float> {
    /// Estimate for this frame alone; `None` when no pitch was detected.
    pub pitch: Option<Pitch<T>>,
    /// Filtered estimate, present whenever `pitch` is.
    pub smoothed: Option<Smoothed<T>>,
    /// Present once the smoothed value has been stable for long enough.
    pub reading: Option<TunerReading>,
}

impl<T: Float> TunerFrame<T> {
    fn undetected() -> Self {
        TunerFrame {
            pitch: None,
            smoothed: None,
            reading: None,
        }
    }

    pub fn display_note(&self) -> &str {
        self.reading
            .as_ref()
            .map_or(PLACEHOLDER, |reading| reading.note.note.name.as_str())
    }
}

pub struct TunerSession<T: Float> {
    detector: YINDetector<T>,
    smoother: Smoother<T>,
    tuning: TuningTable,
    status_tolerance: f64,
    locked: bool,
}

impl<T: Float> TunerSession<T> {
    pub fn new(config: &TunerConfig) -> Result<Self> {
        config.validate()?;
        Ok(TunerSession {
            detector: YINDetector::new(config.frame_size, config.detector)?,
            smoother: Smoother::new(&config.smoothing)?,
            tuning: config.tuning.clone(),
            status_tolerance: config.status_tolerance,
            locked: false,
        })
    }

    pub fn tuning(&self) -> &TuningTable {
        &self.tuning
    }

    pub fn frame_size(&self) -> usize {
        self.detector.size()
    }

    /// Estimate, smooth and map one frame. Frames without a pitch leave the smoothing
    /// state untouched.
    pub fn process(&mut self, samples: &[T], sample_rate: usize) -> Result<TunerFrame<T>> {
        let pitch = match self.detector.get_pitch(samples, sample_rate)? {
            Some(pitch) => pitch,
            None => {
                trace!("no pitch detected");
                return Ok(TunerFrame::undetected());
            }
        };

        let smoothed = self.smoother.push(pitch.frequency);
        trace!(
            "raw {:.2} Hz, smoothed {:.2} Hz, stable for {} frames",
            pitch.frequency,
            smoothed.frequency,
            smoothed.stable_frames
        );

        let reading = match smoothed.frequency.to_f64() {
            Some(frequency) if smoothed.locked => {
                let note = self.tuning.closest_note(frequency);
                let status = note.status(self.status_tolerance);
                Some(TunerReading { note, status })
            }
            _ => None,
        };

        match (&reading, self.locked) {
            (Some(reading), false) => debug!(
                "locked onto {} ({:+.1} cents)",
                reading.note.note.name, reading.note.cents
            ),
            (None, true) => debug!("lost lock at {:.2} Hz", smoothed.frequency),
            _ => {}
        }
        self.locked = reading.is_some();

        Ok(TunerFrame {
            pitch: Some(pitch),
            smoothed: Some(smoothed),
            reading,
        })
    }

    /// Forget the history, e.g. when the user stops and restarts recording.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.locked = false;
    }
}
