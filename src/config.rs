use log::debug;
use serde::{Deserialize, Serialize};

use crate::detector::yin::{YinConfig, DEFAULT_FRAME_SIZE};
use crate::error::{Error, Result};
use crate::smoothing::SmoothingConfig;
use crate::tuning::{TuningTable, PERFECT_TOLERANCE_CENTS};

/// Everything a [TunerSession](crate::session::TunerSession) needs. Missing fields
/// fall back to the guitar defaults.
///
/// ```
/// use pitch_tuner::config::TunerConfig;
///
/// let config = TunerConfig::from_json(r#"{ "detector": { "threshold": 0.1 } }"#).unwrap();
/// assert_eq!(config.detector.threshold, 0.1);
/// assert_eq!(config.detector.min_frequency, 70.0);
/// assert_eq!(config.tuning.len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Samples per analysed frame.
    pub frame_size: usize,
    pub detector: YinConfig,
    pub smoothing: SmoothingConfig,
    /// Deviation, in cents, reported as in tune.
    pub status_tolerance: f64,
    pub tuning: TuningTable,
}

impl Default for TunerConfig {
    fn default() -> Self {
        TunerConfig {
            frame_size: DEFAULT_FRAME_SIZE,
            detector: YinConfig::default(),
            smoothing: SmoothingConfig::default(),
            status_tolerance: PERFECT_TOLERANCE_CENTS,
            tuning: TuningTable::standard_guitar(),
        }
    }
}

impl TunerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TunerConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            "loaded tuner config: {} reference notes, {} sample frames",
            config.tuning.len(),
            config.frame_size
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 {
            return Err(Error::InvalidConfig("frame_size must be positive".into()));
        }
        if !(self.status_tolerance.is_finite() && self.status_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "status_tolerance must not be negative, got {}",
                self.status_tolerance
            )));
        }
        self.detector.validate()?;
        self.smoothing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(TunerConfig::from_json("{}").unwrap(), TunerConfig::default());
    }

    #[test]
    fn custom_tuning_table() {
        let json = r#"{
            "frame_size": 4096,
            "detector": { "min_frequency": 35.0 },
            "tuning": [
                { "name": "D2", "frequency": 73.42, "label": "6th" },
                { "name": "A2", "frequency": 110.0 }
            ]
        }"#;
        let config = TunerConfig::from_json(json).unwrap();
        assert_eq!(config.frame_size, 4096);
        assert_eq!(config.detector.min_frequency, 35.0);
        assert_eq!(config.tuning.notes()[0].label.as_deref(), Some("6th"));
        assert_eq!(config.tuning.notes()[1].label, None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            TunerConfig::from_json(r#"{ "tuning": [] }"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            TunerConfig::from_json(r#"{ "smoothing": { "window_size": 20 } }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            TunerConfig::from_json(r#"{ "detector": { "noise_floor": -1.0 } }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            TunerConfig::from_json("not json"),
            Err(Error::Json(_))
        ));
    }
}
