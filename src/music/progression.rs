// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord progressions and chord suggestions.
//!
//! A [`ChordProgression`] is a non-empty list of chords with a parallel list
//! of durations in beats and an optional key. Transforms return new
//! progressions; [`ChordProgression::set`] is the only in-place mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chord::Chord;
use super::interval::Interval;
use super::key::{Key, Mode};
use super::scale::ChordSize;
use crate::error::{Result, TheoryError};

/// Default chord duration in beats
pub const DEFAULT_DURATION: f64 = 1.0;

const UPPER_NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];
const LOWER_NUMERALS: [&str; 7] = ["i", "ii", "iii", "iv", "v", "vi", "vii"];

/// Where a suggested chord goes in a progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Replace the chord at this index
    Replace(usize),
    /// Insert a new chord directly after this index
    InsertAfter(usize),
}

impl Position {
    /// Index the position refers to
    pub fn index(self) -> usize {
        match self {
            Position::Replace(i) | Position::InsertAfter(i) => i,
        }
    }

    /// Fractional timeline slot: `i` for replacements, `i + 0.5` for insertions
    pub fn slot(self) -> f64 {
        match self {
            Position::Replace(i) => i as f64,
            Position::InsertAfter(i) => i as f64 + 0.5,
        }
    }

    pub fn is_replacement(self) -> bool {
        matches!(self, Position::Replace(_))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Replace(i) => write!(f, "replace {}", i),
            Position::InsertAfter(i) => write!(f, "after {}", i),
        }
    }
}

/// A proposed chord change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSuggestion {
    pub chord: Chord,
    /// Confidence in 0.0..=1.0
    pub confidence: f64,
    pub reasoning: String,
    pub position: Position,
    /// Voice-leading quality in 0.0..=1.0
    pub voice_leading_quality: f64,
    /// Name of the strategy that produced the suggestion
    #[serde(rename = "strategySource", default)]
    pub source: String,
}

impl ChordSuggestion {
    /// Create a suggestion; scores are clamped into 0.0..=1.0
    pub fn new(
        chord: Chord,
        confidence: f64,
        reasoning: impl Into<String>,
        position: Position,
        voice_leading_quality: f64,
    ) -> Self {
        Self {
            chord,
            confidence: clamp_unit(confidence),
            reasoning: reasoning.into(),
            position,
            voice_leading_quality: clamp_unit(voice_leading_quality),
            source: String::new(),
        }
    }

    /// Tag the suggestion with its source strategy
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Summary of how often chords change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonicRhythm {
    pub total_duration: f64,
    pub average_duration: f64,
    pub fastest_change: f64,
    pub slowest_change: f64,
    /// Number of distinct durations
    pub variety: usize,
}

/// Ordered chords with durations and an optional key
#[derive(Debug, Clone, PartialEq)]
pub struct ChordProgression {
    chords: Vec<Chord>,
    durations: Vec<f64>,
    key: Option<Key>,
}

impl ChordProgression {
    /// Create a progression; durations default to one beat per chord
    pub fn new(chords: Vec<Chord>, key: Option<Key>, durations: Option<Vec<f64>>) -> Result<Self> {
        if chords.is_empty() {
            return Err(TheoryError::EmptyProgression);
        }
        let durations = match durations {
            Some(d) if d.len() != chords.len() => {
                return Err(TheoryError::DurationMismatch {
                    chords: chords.len(),
                    durations: d.len(),
                })
            }
            Some(d) => d,
            None => vec![DEFAULT_DURATION; chords.len()],
        };
        Ok(Self {
            chords,
            durations,
            key,
        })
    }

    /// Build from chord symbols such as `["C", "Am", "F", "G7"]`
    pub fn from_symbols<S: AsRef<str>>(
        symbols: &[S],
        key: Option<Key>,
        durations: Option<Vec<f64>>,
    ) -> Result<Self> {
        let chords = symbols
            .iter()
            .map(|s| Chord::from_symbol(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(chords, key, durations)
    }

    /// Build from Roman numerals in a key, e.g. `["I", "vi", "IV", "V7"]`
    ///
    /// Chord quality always comes from the key's scale; case is accepted but
    /// not enforced. A trailing `7` selects the diatonic seventh chord.
    pub fn from_roman_numerals<S: AsRef<str>>(
        numerals: &[S],
        key: Key,
        durations: Option<Vec<f64>>,
    ) -> Result<Self> {
        let chords = numerals
            .iter()
            .map(|n| parse_roman_numeral(n.as_ref(), &key))
            .collect::<Result<Vec<_>>>()?;
        Self::new(chords, Some(key), durations)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Always false; progressions are never empty
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Copy of the progression with a different key
    pub fn with_key(mut self, key: Option<Key>) -> Self {
        self.key = key;
        self
    }

    pub fn get(&self, index: usize) -> Option<&Chord> {
        self.chords.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chord> {
        self.chords.iter()
    }

    /// Replace a chord in place
    ///
    /// This is the only mutating operation; prefer [`Self::substitute`] when
    /// the progression is shared.
    pub fn set(&mut self, index: usize, chord: Chord) -> Result<()> {
        let len = self.len();
        let slot = self
            .chords
            .get_mut(index)
            .ok_or(TheoryError::IndexOutOfRange { index, len })?;
        *slot = chord;
        Ok(())
    }

    pub fn total_duration(&self) -> f64 {
        self.durations.iter().sum()
    }

    /// Beat at which each chord starts
    pub fn start_times(&self) -> Vec<f64> {
        self.durations
            .iter()
            .scan(0.0, |t, d| {
                let start = *t;
                *t += d;
                Some(start)
            })
            .collect()
    }

    /// Chords in first-seen order without repeats
    pub fn unique_chords(&self) -> Vec<Chord> {
        let mut unique: Vec<Chord> = Vec::new();
        for chord in &self.chords {
            if !unique.contains(chord) {
                unique.push(*chord);
            }
        }
        unique
    }

    pub fn symbols(&self) -> Vec<String> {
        self.chords.iter().map(|c| c.symbol()).collect()
    }

    /// Roman-numeral analysis in `key`, or the progression's own key
    ///
    /// Major keys capitalize degrees 1, 4 and 5; minor keys capitalize 3, 6
    /// and 7. Non-diatonic chords get a `*`; chords whose root is outside the
    /// scale are shown as `(symbol)`.
    pub fn roman_numerals(&self, key: Option<&Key>) -> Result<Vec<String>> {
        let key = key
            .or(self.key.as_ref())
            .ok_or_else(|| TheoryError::InvalidKey("no key for roman numeral analysis".to_string()))?;

        Ok(self
            .chords
            .iter()
            .map(|chord| {
                let analysis = key.analyze_chord(chord);
                match analysis.degree {
                    Some(degree) => {
                        let upper = match key.mode() {
                            Mode::Major => matches!(degree, 1 | 4 | 5),
                            Mode::Minor => matches!(degree, 3 | 6 | 7),
                        };
                        let table = if upper { &UPPER_NUMERALS } else { &LOWER_NUMERALS };
                        let mut numeral = table[degree - 1].to_string();
                        if !analysis.is_diatonic {
                            numeral.push('*');
                        }
                        numeral
                    }
                    None => format!("({})", chord.symbol()),
                }
            })
            .collect())
    }

    pub fn harmonic_rhythm(&self) -> HarmonicRhythm {
        let total = self.total_duration();
        let mut distinct: Vec<f64> = Vec::new();
        for &d in &self.durations {
            if !distinct.contains(&d) {
                distinct.push(d);
            }
        }
        HarmonicRhythm {
            total_duration: total,
            average_duration: total / self.len() as f64,
            fastest_change: self.durations.iter().copied().fold(f64::INFINITY, f64::min),
            slowest_change: self.durations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            variety: distinct.len(),
        }
    }

    /// Adjacent chord pairs with the root movement between them
    pub fn transitions(&self) -> Vec<(Chord, Chord, Interval)> {
        self.chords
            .windows(2)
            .map(|pair| (pair[0], pair[1], Interval::between(pair[0].root(), pair[1].root())))
            .collect()
    }

    /// Transpose every chord and the key
    pub fn transpose(&self, semitones: i32) -> Result<Self> {
        let chords = self
            .chords
            .iter()
            .map(|c| c.transpose(semitones))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            chords,
            durations: self.durations.clone(),
            key: self.key.as_ref().map(|k| k.transpose(semitones)),
        })
    }

    /// Copy with the chord at `index` replaced
    pub fn substitute(&self, index: usize, chord: Chord) -> Result<Self> {
        let mut copy = self.clone();
        copy.set(index, chord)?;
        Ok(copy)
    }

    /// Copy with a chord inserted before `index` (`index == len` appends)
    pub fn insert(&self, index: usize, chord: Chord, duration: f64) -> Result<Self> {
        if index > self.len() {
            return Err(TheoryError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let mut copy = self.clone();
        copy.chords.insert(index, chord);
        copy.durations.insert(index, duration);
        Ok(copy)
    }

    /// Copy followed by another progression; keeps this key
    pub fn extend(&self, other: &ChordProgression) -> Self {
        let mut copy = self.clone();
        copy.chords.extend_from_slice(&other.chords);
        copy.durations.extend_from_slice(&other.durations);
        copy
    }

    /// Copy repeated `times` times
    pub fn repeat(&self, times: usize) -> Result<Self> {
        if times < 1 {
            return Err(TheoryError::InvalidRepeat(times));
        }
        Ok(Self {
            chords: self.chords.repeat(times),
            durations: self.durations.repeat(times),
            key: self.key.clone(),
        })
    }

    /// Copy with a suggestion applied at its position
    pub fn apply(&self, suggestion: &ChordSuggestion) -> Result<Self> {
        match suggestion.position {
            Position::Replace(i) => self.substitute(i, suggestion.chord),
            Position::InsertAfter(i) => self.insert(i + 1, suggestion.chord, DEFAULT_DURATION),
        }
    }
}

fn parse_roman_numeral(numeral: &str, key: &Key) -> Result<Chord> {
    let trimmed = numeral.trim();
    let invalid = || TheoryError::InvalidSymbol(numeral.to_string());

    let (body, size) = match trimmed.strip_suffix('7') {
        Some(body) => (body, ChordSize::Seventh),
        None => (trimmed, ChordSize::Triad),
    };
    let body = body.trim_end_matches(['°', 'o', '+']);

    let degree = UPPER_NUMERALS
        .iter()
        .position(|n| *n == body)
        .or_else(|| LOWER_NUMERALS.iter().position(|n| *n == body))
        .ok_or_else(invalid)?
        + 1;

    key.chord_for_degree(degree, size)
}

impl fmt::Display for ChordProgression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .chords
            .iter()
            .zip(&self.durations)
            .map(|(chord, &duration)| {
                if duration == DEFAULT_DURATION {
                    chord.symbol()
                } else {
                    format!("{}({:?})", chord.symbol(), duration)
                }
            })
            .collect();
        write!(f, "{}", parts.join(" - "))
    }
}

/// One chord of a structured progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEntry {
    pub symbol: String,
    #[serde(default = "default_duration")]
    pub duration: f64,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION
}

/// Structured progression exchanged with collaborators
///
/// `{key: "C major", chords: [{symbol: "C", duration: 1.0}, ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionDoc {
    #[serde(default)]
    pub key: Option<String>,
    pub chords: Vec<ChordEntry>,
}

impl ProgressionDoc {
    /// Validate symbols, durations and key into a progression
    pub fn to_progression(&self) -> Result<ChordProgression> {
        let key = self.key.as_deref().map(Key::parse).transpose()?;
        let symbols: Vec<&str> = self.chords.iter().map(|c| c.symbol.as_str()).collect();
        let durations = self.chords.iter().map(|c| c.duration).collect();
        ChordProgression::from_symbols(&symbols, key, Some(durations))
    }
}

impl From<&ChordProgression> for ProgressionDoc {
    fn from(progression: &ChordProgression) -> Self {
        Self {
            key: progression.key().map(|k| k.to_string()),
            chords: progression
                .chords()
                .iter()
                .zip(progression.durations())
                .map(|(chord, &duration)| ChordEntry {
                    symbol: chord.symbol(),
                    duration,
                })
                .collect(),
        }
    }
}
