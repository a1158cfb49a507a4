//! # Pitch Tuner
//! *pitch_tuner* is the analysis core of an instrument tuner. It takes frames of
//! time-domain samples, as handed out by a microphone analyser, and turns them into
//! a note name and a deviation in cents.
//!
//! The pipeline has three stages, each usable on its own:
//!
//!   * [YINDetector][detector::yin]: fundamental frequency of a single frame.
//!   * [Smoother][smoothing::Smoother]: median filter over recent estimates plus a
//!     stability counter that says when a reading has settled.
//!   * [TuningTable][tuning::TuningTable]: closest reference note and cents deviation.
//!
//! [TunerSession][session::TunerSession] chains them for one tuner instance.
//!
//! # Examples
//! ```
//! use pitch_tuner::config::TunerConfig;
//! use pitch_tuner::session::TunerSession;
//!
//! const SAMPLE_RATE: usize = 44100;
//!
//! let config = TunerConfig::default();
//! let mut session = TunerSession::<f32>::new(&config).unwrap();
//!
//! // Signal coming from some source (microphone, generated, etc...)
//! let dt = 1.0 / SAMPLE_RATE as f32;
//! let freq = 112.0;
//! let signal: Vec<f32> = (0..config.frame_size)
//!     .map(|x| 0.5 * (2.0 * std::f32::consts::PI * x as f32 * dt * freq).sin())
//!     .collect();
//!
//! let mut frame = session.process(&signal, SAMPLE_RATE).unwrap();
//! while frame.reading.is_none() {
//!     frame = session.process(&signal, SAMPLE_RATE).unwrap();
//! }
//! let reading = frame.reading.unwrap();
//! println!("{} {:+.1} cents ({})", reading.note.note.name, reading.note.cents, reading.status);
//! assert_eq!(reading.note.note.name, "A2");
//! ```

pub use detector::internals::Pitch;
pub use error::{Error, Result};

pub mod config;
pub mod detector;
pub mod error;
pub mod float;
pub mod session;
pub mod smoothing;
pub mod tuning;
pub mod utils;
