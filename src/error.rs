use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations and malformed configuration. A frame without a
/// detectable pitch is not an error; detectors report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sample rate must be positive")]
    InvalidSampleRate,
    #[error("detector expects frames of {expected} samples, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },
    #[error("buffer of {len} samples is shorter than the {required} needed to search periods up to {max_period}")]
    BufferTooShort {
        len: usize,
        required: usize,
        max_period: usize,
    },
    #[error("sample rate {sample_rate} Hz leaves no periods to search above {min_frequency} Hz")]
    FrequencyRangeTooNarrow {
        sample_rate: usize,
        min_frequency: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("tuning table has no notes")]
    EmptyTuningTable,
    #[error("note {name} has invalid frequency {frequency}")]
    InvalidNoteFrequency { name: String, frequency: f64 },
    #[error("note {name} at index {index} is not higher than the note before it")]
    UnorderedTuningTable { name: String, index: usize },
    #[error("failed to parse configuration")]
    Json(#[from] serde_json::Error),
}
