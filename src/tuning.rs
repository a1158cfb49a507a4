//! Reference tuning tables and the mapping of a frequency onto the closest note.
//!
//! Deviations are measured in cents, a logarithmic unit where 100 cents make a
//! semitone and 1200 an octave. Positive values are sharp, negative values flat.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deviation, in cents, within which a note counts as in tune.
pub const PERFECT_TOLERANCE_CENTS: f64 = 5.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Standard six-string guitar tuning, low E to high E.
pub static STANDARD_TUNING: Lazy<TuningTable> = Lazy::new(|| {
    TuningTable::from_validated(vec![
        ReferenceNote::labelled("E2", 82.41, "6th"),
        ReferenceNote::labelled("A2", 110.00, "5th"),
        ReferenceNote::labelled("D3", 146.83, "4th"),
        ReferenceNote::labelled("G3", 196.00, "3rd"),
        ReferenceNote::labelled("B3", 246.94, "2nd"),
        ReferenceNote::labelled("E4", 329.63, "1st"),
    ])
});

/// Standard four-string bass tuning. E1 sits below the default search range of the
/// detector, so pair this table with a lower `min_frequency`.
pub static STANDARD_BASS_TUNING: Lazy<TuningTable> = Lazy::new(|| {
    TuningTable::from_validated(vec![
        ReferenceNote::labelled("E1", 41.20, "4th"),
        ReferenceNote::labelled("A1", 55.00, "3rd"),
        ReferenceNote::labelled("D2", 73.42, "2nd"),
        ReferenceNote::labelled("G2", 98.00, "1st"),
    ])
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNote {
    /// Scientific pitch name, e.g. `"A2"`.
    pub name: String,
    /// Target frequency in Hz.
    pub frequency: f64,
    /// Optional display label such as the string number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ReferenceNote {
    pub fn new(name: impl Into<String>, frequency: f64) -> Self {
        ReferenceNote {
            name: name.into(),
            frequency,
            label: None,
        }
    }

    pub fn labelled(name: impl Into<String>, frequency: f64, label: impl Into<String>) -> Self {
        ReferenceNote {
            name: name.into(),
            frequency,
            label: Some(label.into()),
        }
    }
}

/// Signed deviation of `frequency` from `target` in cents.
pub fn cents(frequency: f64, target: f64) -> f64 {
    1200.0 * (frequency / target).log2()
}

/// Which way the string needs to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningStatus {
    Perfect,
    TooHigh,
    TooLow,
}

impl TuningStatus {
    /// `Perfect` when `|cents| < tolerance`, otherwise the sign decides.
    pub fn from_cents(cents: f64, tolerance: f64) -> Self {
        if cents.abs() < tolerance {
            TuningStatus::Perfect
        } else if cents > 0.0 {
            TuningStatus::TooHigh
        } else {
            TuningStatus::TooLow
        }
    }
}

impl fmt::Display for TuningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TuningStatus::Perfect => "perfect",
            TuningStatus::TooHigh => "too high",
            TuningStatus::TooLow => "too low",
        };
        f.write_str(text)
    }
}

/// The closest reference note to a measured frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteReading {
    pub note: ReferenceNote,
    /// The measured frequency in Hz.
    pub frequency: f64,
    /// Deviation from `note` in cents.
    pub cents: f64,
}

impl NoteReading {
    pub fn status(&self, tolerance: f64) -> TuningStatus {
        TuningStatus::from_cents(self.cents, tolerance)
    }
}

/// A non-empty list of reference notes with strictly increasing frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReferenceNote>", into = "Vec<ReferenceNote>")]
pub struct TuningTable {
    notes: Vec<ReferenceNote>,
}

impl TuningTable {
    pub fn new(notes: Vec<ReferenceNote>) -> Result<Self> {
        if notes.is_empty() {
            return Err(Error::EmptyTuningTable);
        }
        for note in &notes {
            if !(note.frequency.is_finite() && note.frequency > 0.0) {
                return Err(Error::InvalidNoteFrequency {
                    name: note.name.clone(),
                    frequency: note.frequency,
                });
            }
        }
        if let Some(index) = notes
            .windows(2)
            .position(|pair| pair[1].frequency <= pair[0].frequency)
        {
            return Err(Error::UnorderedTuningTable {
                name: notes[index + 1].name.clone(),
                index: index + 1,
            });
        }
        Ok(TuningTable { notes })
    }

    /// Only for the built-in tables, whose contents are checked by the tests below.
    fn from_validated(notes: Vec<ReferenceNote>) -> Self {
        TuningTable { notes }
    }

    pub fn standard_guitar() -> Self {
        STANDARD_TUNING.clone()
    }

    pub fn standard_bass() -> Self {
        STANDARD_BASS_TUNING.clone()
    }

    /// Equal-tempered notes from MIDI note `low` to `high` inclusive, with A4
    /// (MIDI 69) at `a4` Hz. Names use sharps, e.g. `"C#4"`.
    pub fn chromatic(low: u8, high: u8, a4: f64) -> Result<Self> {
        if low > high {
            return Err(Error::InvalidConfig(format!(
                "chromatic range {}..={} is empty",
                low, high
            )));
        }
        let notes = (low..=high)
            .map(|midi| {
                let name = format!(
                    "{}{}",
                    NOTE_NAMES[midi as usize % 12],
                    midi as i32 / 12 - 1
                );
                let frequency = a4 * 2f64.powf((midi as f64 - 69.0) / 12.0);
                ReferenceNote::new(name, frequency)
            })
            .collect();
        TuningTable::new(notes)
    }

    pub fn notes(&self) -> &[ReferenceNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceNote> {
        self.notes.iter().find(|note| note.name == name)
    }

    /// The note with the smallest absolute difference in Hz from `frequency`, and the
    /// deviation from it in cents. On an exact tie the note earlier in the table wins.
    pub fn closest_note(&self, frequency: f64) -> NoteReading {
        let mut closest = &self.notes[0];
        let mut min_diff = (frequency - closest.frequency).abs();
        for note in &self.notes[1..] {
            let diff = (frequency - note.frequency).abs();
            if diff < min_diff {
                min_diff = diff;
                closest = note;
            }
        }
        NoteReading {
            note: closest.clone(),
            frequency,
            cents: cents(frequency, closest.frequency),
        }
    }
}

impl TryFrom<Vec<ReferenceNote>> for TuningTable {
    type Error = Error;

    fn try_from(notes: Vec<ReferenceNote>) -> Result<Self> {
        TuningTable::new(notes)
    }
}

impl From<TuningTable> for Vec<ReferenceNote> {
    fn from(table: TuningTable) -> Self {
        table.notes
    }
}

impl Default for TuningTable {
    fn default() -> Self {
        TuningTable::standard_guitar()
    }
}
