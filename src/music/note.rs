// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitched notes.
//!
//! A [`Note`] is a spelled pitch class plus an octave. Spelling is kept so
//! that `Db4` prints as `Db4`, but identity is the MIDI number: `C#4 == Db4`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TheoryError};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Semitone offset type
pub type Semitones = i32;

/// Sharp spellings indexed by pitch class
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings indexed by pitch class
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Lowest and highest octave accepted when spelling a note by name
pub const MIN_OCTAVE: i32 = 0;
pub const MAX_OCTAVE: i32 = 10;

/// Octave that MIDI notes 0-11 print with
const MIDI_FLOOR_OCTAVE: i32 = -1;

/// Resolve a pitch name like `"F#"` or `"Bb"` to (pitch class, flat spelling)
///
/// Only the twelve sharp and twelve flat spellings above are accepted, so
/// `E#` and `Cb` are rejected.
pub fn parse_pitch_name(name: &str) -> Result<(u8, bool)> {
    let name = name.trim();
    if let Some(pc) = SHARP_NAMES.iter().position(|n| *n == name) {
        return Ok((pc as u8, false));
    }
    if let Some(pc) = FLAT_NAMES.iter().position(|n| *n == name) {
        return Ok((pc as u8, true));
    }
    Err(TheoryError::InvalidPitch(name.to_string()))
}

/// A spelled note with an octave
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    midi: MidiNote,
    flat: bool,
}

impl Note {
    /// Create a note from a pitch name and octave (e.g. `"Bb"`, 3)
    pub fn new(pitch: &str, octave: i32) -> Result<Self> {
        Self::spelled(pitch, octave, MIN_OCTAVE)
    }

    fn spelled(pitch: &str, octave: i32, lowest_octave: i32) -> Result<Self> {
        let (pc, flat) = parse_pitch_name(pitch)?;
        if !(lowest_octave..=MAX_OCTAVE).contains(&octave) {
            return Err(TheoryError::InvalidOctave(octave));
        }
        let midi = (octave + 1) * 12 + pc as i32;
        if !(0..=127).contains(&midi) {
            return Err(TheoryError::MidiOutOfRange(midi));
        }
        Ok(Self {
            midi: midi as MidiNote,
            flat,
        })
    }

    /// Create a note from a MIDI number, spelled with sharps
    pub fn from_midi(midi: i32) -> Result<Self> {
        if !(0..=127).contains(&midi) {
            return Err(TheoryError::MidiOutOfRange(midi));
        }
        Ok(Self {
            midi: midi as MidiNote,
            flat: false,
        })
    }

    /// Note with a pitch class in an octave, clamped into the MIDI range
    pub fn from_pitch_class(pc: u8, octave: i32, flat: bool) -> Self {
        let midi = ((octave + 1) * 12 + (pc % 12) as i32).clamp(0, 127);
        Self {
            midi: midi as MidiNote,
            flat,
        }
    }

    /// Parse a note with octave such as `"C#4"` or `"Eb3"`
    ///
    /// Also accepts octave -1 so every printed note parses back.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| TheoryError::InvalidPitch(s.to_string()))?;
        let (pitch, octave) = s.split_at(split);
        let octave: i32 = octave
            .parse()
            .map_err(|_| TheoryError::InvalidPitch(s.to_string()))?;
        Self::spelled(pitch, octave, MIDI_FLOOR_OCTAVE)
    }

    /// MIDI number (0-127)
    pub fn midi(self) -> MidiNote {
        self.midi
    }

    /// Pitch class (0-11)
    pub fn pitch_class(self) -> u8 {
        self.midi % 12
    }

    /// Spelled pitch name without octave
    pub fn name(self) -> &'static str {
        let pc = self.pitch_class() as usize;
        if self.flat {
            FLAT_NAMES[pc]
        } else {
            SHARP_NAMES[pc]
        }
    }

    /// Octave number; MIDI notes below 12 report octave -1
    pub fn octave(self) -> i32 {
        self.midi as i32 / 12 - 1
    }

    /// Whether the note is spelled with an accidental
    pub fn has_accidental(self) -> bool {
        self.name().len() > 1
    }

    /// Frequency in Hz, A4 = 440 in equal temperament
    pub fn frequency(self) -> f64 {
        440.0 * 2f64.powf((self.midi as f64 - 69.0) / 12.0)
    }

    /// The same pitch spelled with the other accidental
    ///
    /// Natural notes have no partner and return `None`.
    pub fn enharmonic_equivalent(self) -> Option<Self> {
        if !self.has_accidental() {
            return None;
        }
        Some(Self {
            midi: self.midi,
            flat: !self.flat,
        })
    }

    /// Same pitch spelled with flats (`true`) or sharps (`false`)
    pub fn respell(self, flat: bool) -> Self {
        Self {
            midi: self.midi,
            flat,
        }
    }

    /// Whether accidentals are spelled as flats
    pub fn is_flat(self) -> bool {
        self.flat && self.has_accidental()
    }

    /// Transpose by semitones, failing outside the MIDI range
    pub fn transpose(self, semitones: Semitones) -> Result<Self> {
        Self::from_midi(self.midi as i32 + semitones)
    }

    /// Ascending interval in semitones to another note's pitch class (0-11)
    pub fn interval_to(self, other: Note) -> u8 {
        (other.pitch_class() as i32 - self.pitch_class() as i32).rem_euclid(12) as u8
    }

    /// Signed semitone distance to another note
    pub fn semitones_to(self, other: Note) -> Semitones {
        other.midi as i32 - self.midi as i32
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.midi == other.midi
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.midi.hash(state);
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> Ordering {
        self.midi.cmp(&other.midi)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

impl FromStr for Note {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Note {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_from_name() {
        assert_eq!(Note::new("C", 4).unwrap().midi(), 60);
        assert_eq!(Note::new("A", 4).unwrap().midi(), 69);
        assert_eq!(Note::new("C", 0).unwrap().midi(), 12);
        assert_eq!(Note::new("G", 9).unwrap().midi(), 127);
        assert!(Note::new("G#", 9).is_err());
    }

    #[test]
    fn test_from_pitch_class() {
        let bb = Note::from_pitch_class(10, 3, true);
        assert_eq!(bb.to_string(), "Bb3");
        assert_eq!(Note::from_pitch_class(7, 10, false).midi(), 127);
    }

    #[test]
    fn test_from_midi_uses_sharps() {
        let note = Note::from_midi(61).unwrap();
        assert_eq!(note.name(), "C#");
        assert_eq!(note.octave(), 4);
        assert_eq!(Note::from_midi(5).unwrap().octave(), -1);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            Note::new("H", 4),
            Err(TheoryError::InvalidPitch("H".to_string()))
        );
        assert_eq!(Note::new("E#", 4), Err(TheoryError::InvalidPitch("E#".to_string())));
        assert_eq!(Note::new("C", 11), Err(TheoryError::InvalidOctave(11)));
        assert_eq!(Note::new("G", 10), Err(TheoryError::MidiOutOfRange(139)));
        assert_eq!(Note::from_midi(128), Err(TheoryError::MidiOutOfRange(128)));
        assert_eq!(Note::from_midi(-1), Err(TheoryError::MidiOutOfRange(-1)));
    }

    #[test]
    fn test_enharmonic() {
        let cs = Note::new("C#", 4).unwrap();
        let db = Note::new("Db", 4).unwrap();
        assert_eq!(cs, db);
        assert_eq!(cs.midi(), db.midi());
        assert_eq!(cs.enharmonic_equivalent().unwrap().name(), "Db");
        assert_eq!(db.enharmonic_equivalent().unwrap().name(), "C#");
        assert!(Note::new("E", 4).unwrap().enharmonic_equivalent().is_none());
    }

    #[test]
    fn test_transpose() {
        let c4 = Note::new("C", 4).unwrap();
        assert_eq!(c4.transpose(7).unwrap().midi(), 67);
        assert_eq!(c4.transpose(-12).unwrap().midi(), 48);
        assert!(Note::from_midi(120).unwrap().transpose(8).is_err());
        assert!(Note::from_midi(3).unwrap().transpose(-4).is_err());
    }

    #[test]
    fn test_frequency() {
        let a4 = Note::new("A", 4).unwrap();
        assert!((a4.frequency() - 440.0).abs() < 1e-9);
        let a5 = Note::new("A", 5).unwrap();
        assert!((a5.frequency() - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_and_display() {
        let note = Note::parse("Eb3").unwrap();
        assert_eq!(note.to_string(), "Eb3");
        assert_eq!(note.midi(), 51);
        assert!(Note::parse("Eb").is_err());
        assert!(Note::parse("X4").is_err());
        assert_eq!(Note::parse("C-1").unwrap().midi(), 0);
        assert_eq!(Note::parse("C-2"), Err(TheoryError::InvalidOctave(-2)));
        assert_eq!(Note::new("C", -1), Err(TheoryError::InvalidOctave(-1)));
    }

    #[test]
    fn test_display_round_trip_full_range() {
        for midi in 0..=127 {
            for note in [Note::from_midi(midi).unwrap(), Note::from_midi(midi).unwrap().respell(true)] {
                let text = note.to_string();
                let parsed = Note::parse(&text).unwrap();
                assert_eq!(parsed, note, "{}", text);
                assert_eq!(parsed.name(), note.name());

                let json = serde_json::to_string(&note).unwrap();
                let back: Note = serde_json::from_str(&json).unwrap();
                assert_eq!(back.to_string(), text);
            }
        }
    }

    #[test]
    fn test_ordering_by_midi() {
        let mut notes = vec![
            Note::new("G", 4).unwrap(),
            Note::new("C", 4).unwrap(),
            Note::new("E", 4).unwrap(),
        ];
        notes.sort();
        let names: Vec<_> = notes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["C", "E", "G"]);
    }

    #[test]
    fn test_interval_to() {
        let c = Note::new("C", 4).unwrap();
        let a = Note::new("A", 3).unwrap();
        assert_eq!(c.interval_to(a), 9);
        assert_eq!(a.interval_to(c), 3);
        assert_eq!(a.semitones_to(c), 3);
    }
}
