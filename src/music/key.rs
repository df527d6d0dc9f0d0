// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keys, key signatures and harmonic function.
//!
//! A key is a tonic plus major/minor mode. Minor keys use the natural minor
//! scale. Signatures come from fixed circle-of-fifths tables, so spellings
//! outside those tables (e.g. `D# major`) report a signature of 0.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::chord::Chord;
use super::note::{parse_pitch_name, Note};
use super::scale::{ChordSize, Scale, ScaleType};
use crate::error::{Result, TheoryError};

/// Octave used for key tonics
const TONIC_OCTAVE: i32 = 4;

/// Major key tonics with signed accidental counts (sharps positive)
const MAJOR_SIGNATURES: [(&str, i32); 15] = [
    ("C", 0),
    ("G", 1),
    ("D", 2),
    ("A", 3),
    ("E", 4),
    ("B", 5),
    ("F#", 6),
    ("C#", 7),
    ("F", -1),
    ("Bb", -2),
    ("Eb", -3),
    ("Ab", -4),
    ("Db", -5),
    ("Gb", -6),
    ("Cb", -7),
];

/// Minor key tonics with signed accidental counts (sharps positive)
const MINOR_SIGNATURES: [(&str, i32); 15] = [
    ("A", 0),
    ("E", 1),
    ("B", 2),
    ("F#", 3),
    ("C#", 4),
    ("G#", 5),
    ("D#", 6),
    ("A#", 7),
    ("D", -1),
    ("G", -2),
    ("C", -3),
    ("F", -4),
    ("Bb", -5),
    ("Eb", -6),
    ("Ab", -7),
];

const SHARPS_ORDER: [&str; 7] = ["F#", "C#", "G#", "D#", "A#", "E#", "B#"];
const FLATS_ORDER: [&str; 7] = ["Bb", "Eb", "Ab", "Db", "Gb", "Cb", "Fb"];

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }

    pub fn from_name(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" | "maj" => Ok(Mode::Major),
            "minor" | "min" => Ok(Mode::Minor),
            _ => Err(TheoryError::InvalidKey(s.to_string())),
        }
    }

    /// The other mode
    pub fn parallel(self) -> Self {
        match self {
            Mode::Major => Mode::Minor,
            Mode::Minor => Mode::Major,
        }
    }

    /// Scale type that backs keys in this mode
    pub fn scale_type(self) -> ScaleType {
        match self {
            Mode::Major => ScaleType::Major,
            Mode::Minor => ScaleType::NaturalMinor,
        }
    }

    fn signatures(self) -> &'static [(&'static str, i32); 15] {
        match self {
            Mode::Major => &MAJOR_SIGNATURES,
            Mode::Minor => &MINOR_SIGNATURES,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Harmonic function of a chord within a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    Tonic,
    Subdominant,
    Dominant,
    Unknown,
}

impl Function {
    /// Function of a scale degree
    ///
    /// Degree 6 is tonic in both modes (submediant substitution); the two
    /// modes share one table.
    pub fn for_degree(degree: usize, mode: Mode) -> Self {
        match (mode, degree) {
            (_, 1) | (_, 3) | (_, 6) => Function::Tonic,
            (_, 2) | (_, 4) => Function::Subdominant,
            (_, 5) | (_, 7) => Function::Dominant,
            _ => Function::Unknown,
        }
    }

    /// One-letter tag: T, S, D or ?
    pub fn letter(self) -> char {
        match self {
            Function::Tonic => 'T',
            Function::Subdominant => 'S',
            Function::Dominant => 'D',
            Function::Unknown => '?',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Tonic => "tonic",
            Function::Subdominant => "subdominant",
            Function::Dominant => "dominant",
            Function::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A chord's role within a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordAnalysis {
    /// Scale degree of the chord root, if the root is in the scale
    pub degree: Option<usize>,
    pub function: Function,
    /// True when the chord's pitch classes equal the diatonic triad on its degree
    pub is_diatonic: bool,
    /// Chord pitch classes outside the key's scale
    pub non_chord_tones: Vec<u8>,
}

/// How two keys relate on the circle of fifths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRelation {
    Same,
    Relative,
    Parallel,
    Dominant,
    Subdominant,
    /// Within two steps on the circle of fifths
    CloselyRelated,
    /// Three or four steps apart
    DistantlyRelated,
    Unrelated,
}

/// A musical key with tonic and mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    tonic: Note,
    mode: Mode,
    scale: Scale,
}

impl Key {
    /// Create a key; the tonic is moved to octave 4
    pub fn new(tonic: Note, mode: Mode) -> Self {
        let flats = match signature_for(tonic.name(), mode) {
            Some(sig) => sig < 0,
            None => tonic.is_flat(),
        };
        let scale = Scale::on_pitch_class(tonic.pitch_class(), mode.scale_type(), flats);
        Self {
            tonic: scale.tonic(),
            mode,
            scale,
        }
    }

    /// Key on a pitch class, spelled with the fewest accidentals
    pub fn from_pitch_class(pc: u8, mode: Mode) -> Self {
        let pc = pc % 12;
        let flat = mode
            .signatures()
            .iter()
            .filter(|(name, _)| {
                parse_pitch_name(name).map(|(p, _)| p == pc).unwrap_or(false)
            })
            .min_by_key(|(_, sig)| sig.abs())
            .map(|(_, sig)| *sig < 0)
            .unwrap_or(false);
        Self::new(Note::from_pitch_class(pc, TONIC_OCTAVE, flat), mode)
    }

    /// C major, the default when nothing better is known
    pub fn c_major() -> Self {
        Self::from_pitch_class(0, Mode::Major)
    }

    /// Parse a key string such as `"F# minor"`, `"Bb major"` or `"Am"`
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || TheoryError::InvalidKey(s.to_string());
        let (tonic, mode) = match trimmed.split_once(char::is_whitespace) {
            Some((tonic, mode)) => (tonic, Mode::from_name(mode).map_err(|_| invalid())?),
            None => match trimmed.strip_suffix('m') {
                Some(tonic) if !tonic.is_empty() => (tonic, Mode::Minor),
                _ => (trimmed, Mode::Major),
            },
        };
        let tonic = Note::new(tonic, TONIC_OCTAVE).map_err(|_| invalid())?;
        Ok(Self::new(tonic, mode))
    }

    /// Key with the given signed accidental count
    pub fn from_signature(count: i32, mode: Mode) -> Result<Self> {
        let (name, _) = mode
            .signatures()
            .iter()
            .find(|(_, sig)| *sig == count)
            .ok_or_else(|| TheoryError::InvalidSignature {
                count,
                mode: mode.name().to_string(),
            })?;
        Ok(Self::new(Note::new(name, TONIC_OCTAVE)?, mode))
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_major(&self) -> bool {
        self.mode == Mode::Major
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Signed accidental count; 0 for spellings outside the tables
    pub fn signature(&self) -> i32 {
        signature_for(self.tonic.name(), self.mode).unwrap_or(0)
    }

    /// Sharps or flats of the signature in order
    pub fn accidentals(&self) -> Vec<&'static str> {
        let sig = self.signature();
        if sig >= 0 {
            SHARPS_ORDER[..sig as usize].to_vec()
        } else {
            FLATS_ORDER[..sig.unsigned_abs() as usize].to_vec()
        }
    }

    /// Transpose the tonic by `semitones` and pick the cleanest spelling
    pub fn transpose(&self, semitones: i32) -> Self {
        let pc = (self.tonic.pitch_class() as i32 + semitones).rem_euclid(12) as u8;
        Self::from_pitch_class(pc, self.mode)
    }

    pub fn relative(&self) -> Self {
        match self.mode {
            Mode::Major => Self::from_pitch_class(self.shifted(-3), Mode::Minor),
            Mode::Minor => Self::from_pitch_class(self.shifted(3), Mode::Major),
        }
    }

    pub fn parallel(&self) -> Self {
        Self::from_pitch_class(self.tonic.pitch_class(), self.mode.parallel())
    }

    /// Key a perfect fifth above
    pub fn dominant(&self) -> Self {
        self.transpose(7)
    }

    /// Key a perfect fourth above
    pub fn subdominant(&self) -> Self {
        self.transpose(5)
    }

    /// Relative, dominant, subdominant and the relatives of the latter two
    pub fn closely_related(&self) -> Vec<Key> {
        let dominant = self.dominant();
        let subdominant = self.subdominant();
        vec![
            self.relative(),
            dominant.relative(),
            subdominant.relative(),
            dominant,
            subdominant,
        ]
    }

    /// Key centered on one of this key's scale degrees, same mode
    pub fn tonicize(&self, degree: usize) -> Result<Self> {
        let note = self.scale.degree(degree)?;
        Ok(Self::from_pitch_class(note.pitch_class(), self.mode))
    }

    pub fn contains(&self, note: Note) -> bool {
        self.scale.contains(note)
    }

    pub fn chord_for_degree(&self, degree: usize, size: ChordSize) -> Result<Chord> {
        self.scale.chord_for_degree(degree, size)
    }

    /// The seven diatonic chords in degree order
    pub fn diatonic_chords(&self, size: ChordSize) -> Vec<Chord> {
        (1..=self.scale.len())
            .filter_map(|d| self.scale.chord_for_degree(d, size).ok())
            .collect()
    }

    /// Degree, function and diatonic status of a chord in this key
    pub fn analyze_chord(&self, chord: &Chord) -> ChordAnalysis {
        let degree = self.scale.note_degree(chord.root());
        let chord_pcs = chord.pitch_classes();

        let is_diatonic = degree
            .and_then(|d| self.scale.chord_for_degree(d, ChordSize::Triad).ok())
            .map(|expected| expected.pitch_classes() == chord_pcs)
            .unwrap_or(false);

        let non_chord_tones = if is_diatonic {
            Vec::new()
        } else {
            chord_pcs.difference(self.scale.pitch_classes()).iter().collect()
        };

        ChordAnalysis {
            degree,
            function: degree
                .map(|d| Function::for_degree(d, self.mode))
                .unwrap_or(Function::Unknown),
            is_diatonic,
            non_chord_tones,
        }
    }

    /// Shorthand for `analyze_chord(chord).function`
    pub fn function_of(&self, chord: &Chord) -> Function {
        self.analyze_chord(chord).function
    }

    /// Relationship between this key and another
    pub fn relation_to(&self, other: &Key) -> KeyRelation {
        if self == other {
            return KeyRelation::Same;
        }
        if self.relative() == *other {
            return KeyRelation::Relative;
        }
        if self.parallel() == *other {
            return KeyRelation::Parallel;
        }
        if self.dominant() == *other {
            return KeyRelation::Dominant;
        }
        if self.subdominant() == *other {
            return KeyRelation::Subdominant;
        }
        match self.fifths_distance(other) {
            0..=2 => KeyRelation::CloselyRelated,
            3..=4 => KeyRelation::DistantlyRelated,
            _ => KeyRelation::Unrelated,
        }
    }

    /// Steps around the circle of fifths between the two key signatures (0-6)
    pub fn fifths_distance(&self, other: &Key) -> u8 {
        let a = self.fifths_position();
        let b = other.fifths_position();
        let d = (a as i32 - b as i32).rem_euclid(12) as u8;
        d.min(12 - d)
    }

    /// Pitch classes shared by the two keys' scales
    pub fn common_pitch_classes(&self, other: &Key) -> usize {
        self.scale
            .pitch_classes()
            .intersection(other.scale.pitch_classes())
            .len()
    }

    /// Position of the relative-major tonic on the circle of fifths from C
    fn fifths_position(&self) -> u8 {
        let major_pc = match self.mode {
            Mode::Major => self.tonic.pitch_class(),
            Mode::Minor => self.shifted(3),
        };
        (major_pc as u32 * 7 % 12) as u8
    }

    fn shifted(&self, semitones: i32) -> u8 {
        (self.tonic.pitch_class() as i32 + semitones).rem_euclid(12) as u8
    }
}

fn signature_for(name: &str, mode: Mode) -> Option<i32> {
    mode.signatures()
        .iter()
        .find(|(tonic, _)| *tonic == name)
        .map(|(_, sig)| *sig)
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.tonic.pitch_class() == other.tonic.pitch_class() && self.mode == other.mode
    }
}

impl Eq for Key {}

impl Default for Key {
    fn default() -> Self {
        Self::c_major()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic.name(), self.mode)
    }
}

impl FromStr for Key {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Key {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}
