// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chords, chord qualities and chord symbols.
//!
//! The quality catalog is closed. Its declaration order is significant:
//! the chord detector walks it in this order and keeps the first strictly
//! better match, so reordering [`Quality::ALL`] changes detection results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::note::{Note, Semitones};
use crate::error::{Result, TheoryError};

/// Default octave for roots parsed from chord symbols
pub const SYMBOL_OCTAVE: i32 = 4;

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Quality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Major7,
    Minor7,
    Dominant7,
    Diminished7,
    HalfDiminished7,
    MinorMajor7,
    Augmented7,
    Major9,
    Minor9,
    Dominant9,
    Major11,
    Minor11,
    Dominant11,
    Major13,
    Minor13,
    Dominant13,
    Dominant7Flat5,
    Dominant7Sharp5,
    Dominant7Flat9,
    Dominant7Sharp9,
    Dominant7Sharp11,
    Dominant7Flat13,
}

/// Extra spellings accepted when parsing symbols, besides each canonical suffix
const ALIASES: &[(&str, Quality)] = &[
    ("M", Quality::Major),
    ("maj", Quality::Major),
    ("min", Quality::Minor),
    ("°", Quality::Diminished),
    ("+", Quality::Augmented),
    ("M7", Quality::Major7),
    ("min7", Quality::Minor7),
    ("°7", Quality::Diminished7),
    ("ø7", Quality::HalfDiminished7),
    ("M9", Quality::Major9),
];

impl Quality {
    /// Every quality in catalog order
    pub const ALL: [Quality; 28] = [
        Quality::Major,
        Quality::Minor,
        Quality::Diminished,
        Quality::Augmented,
        Quality::Sus2,
        Quality::Sus4,
        Quality::Major7,
        Quality::Minor7,
        Quality::Dominant7,
        Quality::Diminished7,
        Quality::HalfDiminished7,
        Quality::MinorMajor7,
        Quality::Augmented7,
        Quality::Major9,
        Quality::Minor9,
        Quality::Dominant9,
        Quality::Major11,
        Quality::Minor11,
        Quality::Dominant11,
        Quality::Major13,
        Quality::Minor13,
        Quality::Dominant13,
        Quality::Dominant7Flat5,
        Quality::Dominant7Sharp5,
        Quality::Dominant7Flat9,
        Quality::Dominant7Sharp9,
        Quality::Dominant7Sharp11,
        Quality::Dominant7Flat13,
    ];

    /// Semitone offsets from the root, in chord-tone order
    pub fn intervals(self) -> &'static [Semitones] {
        match self {
            Quality::Major => &[0, 4, 7],
            Quality::Minor => &[0, 3, 7],
            Quality::Diminished => &[0, 3, 6],
            Quality::Augmented => &[0, 4, 8],
            Quality::Sus2 => &[0, 2, 7],
            Quality::Sus4 => &[0, 5, 7],
            Quality::Major7 => &[0, 4, 7, 11],
            Quality::Minor7 => &[0, 3, 7, 10],
            Quality::Dominant7 => &[0, 4, 7, 10],
            Quality::Diminished7 => &[0, 3, 6, 9],
            Quality::HalfDiminished7 => &[0, 3, 6, 10],
            Quality::MinorMajor7 => &[0, 3, 7, 11],
            Quality::Augmented7 => &[0, 4, 8, 10],
            Quality::Major9 => &[0, 4, 7, 11, 2],
            Quality::Minor9 => &[0, 3, 7, 10, 2],
            Quality::Dominant9 => &[0, 4, 7, 10, 2],
            Quality::Major11 => &[0, 4, 7, 11, 2, 5],
            Quality::Minor11 => &[0, 3, 7, 10, 2, 5],
            Quality::Dominant11 => &[0, 4, 7, 10, 2, 5],
            Quality::Major13 => &[0, 4, 7, 11, 2, 5, 9],
            Quality::Minor13 => &[0, 3, 7, 10, 2, 5, 9],
            Quality::Dominant13 => &[0, 4, 7, 10, 2, 5, 9],
            Quality::Dominant7Flat5 => &[0, 4, 6, 10],
            Quality::Dominant7Sharp5 => &[0, 4, 8, 10],
            Quality::Dominant7Flat9 => &[0, 4, 7, 10, 1],
            Quality::Dominant7Sharp9 => &[0, 4, 7, 10, 3],
            Quality::Dominant7Sharp11 => &[0, 4, 7, 10, 6],
            Quality::Dominant7Flat13 => &[0, 4, 7, 10, 8],
        }
    }

    /// Canonical symbol suffix appended to the root
    pub fn suffix(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Diminished => "dim",
            Quality::Augmented => "aug",
            Quality::Sus2 => "sus2",
            Quality::Sus4 => "sus4",
            Quality::Major7 => "maj7",
            Quality::Minor7 => "m7",
            Quality::Dominant7 => "7",
            Quality::Diminished7 => "dim7",
            Quality::HalfDiminished7 => "m7b5",
            Quality::MinorMajor7 => "mMaj7",
            Quality::Augmented7 => "+7",
            Quality::Major9 => "maj9",
            Quality::Minor9 => "m9",
            Quality::Dominant9 => "9",
            Quality::Major11 => "maj11",
            Quality::Minor11 => "m11",
            Quality::Dominant11 => "11",
            Quality::Major13 => "maj13",
            Quality::Minor13 => "m13",
            Quality::Dominant13 => "13",
            Quality::Dominant7Flat5 => "7b5",
            Quality::Dominant7Sharp5 => "7#5",
            Quality::Dominant7Flat9 => "7b9",
            Quality::Dominant7Sharp9 => "7#9",
            Quality::Dominant7Sharp11 => "7#11",
            Quality::Dominant7Flat13 => "7b13",
        }
    }

    /// Catalog name, e.g. `"half_diminished7"`
    pub fn name(self) -> &'static str {
        match self {
            Quality::Major => "major",
            Quality::Minor => "minor",
            Quality::Diminished => "diminished",
            Quality::Augmented => "augmented",
            Quality::Sus2 => "sus2",
            Quality::Sus4 => "sus4",
            Quality::Major7 => "major7",
            Quality::Minor7 => "minor7",
            Quality::Dominant7 => "dominant7",
            Quality::Diminished7 => "diminished7",
            Quality::HalfDiminished7 => "half_diminished7",
            Quality::MinorMajor7 => "minor_major7",
            Quality::Augmented7 => "augmented7",
            Quality::Major9 => "major9",
            Quality::Minor9 => "minor9",
            Quality::Dominant9 => "dominant9",
            Quality::Major11 => "major11",
            Quality::Minor11 => "minor11",
            Quality::Dominant11 => "dominant11",
            Quality::Major13 => "major13",
            Quality::Minor13 => "minor13",
            Quality::Dominant13 => "dominant13",
            Quality::Dominant7Flat5 => "dominant7b5",
            Quality::Dominant7Sharp5 => "dominant7#5",
            Quality::Dominant7Flat9 => "dominant7b9",
            Quality::Dominant7Sharp9 => "dominant7#9",
            Quality::Dominant7Sharp11 => "dominant7#11",
            Quality::Dominant7Flat13 => "dominant7b13",
        }
    }

    /// Look up a quality by catalog name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|q| q.name() == name)
            .ok_or_else(|| TheoryError::UnknownQuality(name.to_string()))
    }

    /// Look up a quality by symbol token (canonical suffix or alias)
    pub fn from_token(token: &str) -> Result<Self> {
        if let Some(q) = Self::ALL.iter().copied().find(|q| q.suffix() == token) {
            return Ok(q);
        }
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, q)| *q)
            .ok_or_else(|| TheoryError::UnknownQuality(token.to_string()))
    }

    /// Pitch-class set of this quality rooted on C
    pub fn template(self) -> PitchClassSet {
        self.intervals().iter().map(|&i| i.rem_euclid(12) as u8).collect()
    }

    /// Minor-third qualities whose third is labelled `b3`
    pub fn is_minor_family(self) -> bool {
        matches!(
            self,
            Quality::Minor | Quality::Minor7 | Quality::Minor9 | Quality::Minor11 | Quality::Minor13
        )
    }

    /// Dominant seventh and its natural extensions
    pub fn is_dominant_family(self) -> bool {
        matches!(
            self,
            Quality::Dominant7 | Quality::Dominant9 | Quality::Dominant11 | Quality::Dominant13
        )
    }

    pub fn is_triad(self) -> bool {
        self.intervals().len() == 3
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<String> for Quality {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_name(&s)
    }
}

impl From<Quality> for String {
    fn from(q: Quality) -> Self {
        q.name().to_string()
    }
}

/// A set of pitch classes packed into the low 12 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, pc: u8) {
        self.0 |= 1 << (pc % 12);
    }

    pub fn contains(self, pc: u8) -> bool {
        self.0 & (1 << (pc % 12)) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Rotate every member up by `semitones`
    pub fn transpose(self, semitones: i32) -> Self {
        self.iter()
            .map(|pc| (pc as i32 + semitones).rem_euclid(12) as u8)
            .collect()
    }

    /// Members in ascending order
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0u8..12).filter(move |&pc| self.contains(pc))
    }
}

impl FromIterator<u8> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

/// A chord: root, quality and bass note
///
/// The bass defaults to the root. Equality compares root and bass by MIDI
/// number, so `C#` and `Db` chords are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord {
    root: Note,
    quality: Quality,
    bass: Note,
}

impl Chord {
    /// Create a root-position chord; fails if any tone leaves the MIDI range
    pub fn new(root: Note, quality: Quality) -> Result<Self> {
        for &interval in quality.intervals() {
            root.transpose(interval)?;
        }
        Ok(Self {
            root,
            quality,
            bass: root,
        })
    }

    /// Create a chord with an explicit bass note
    pub fn with_bass(root: Note, quality: Quality, bass: Note) -> Result<Self> {
        Ok(Self::new(root, quality)?.set_bass(bass))
    }

    /// Parse a chord symbol such as `"F#m7"`, `"Bbmaj7/D"` or `"G7b9"`
    ///
    /// Roots and basses are placed in octave 4.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim();
        let (chord_part, bass_part) = match symbol.split_once('/') {
            Some((chord, bass)) => (chord, Some(bass)),
            None => (symbol, None),
        };

        let mut root_len = match chord_part.chars().next() {
            Some('A'..='G') => 1,
            _ => return Err(TheoryError::InvalidSymbol(symbol.to_string())),
        };
        if matches!(chord_part[1..].chars().next(), Some('#') | Some('b')) {
            root_len += 1;
        }
        let (root_str, token) = chord_part.split_at(root_len);

        let root = Note::new(root_str, SYMBOL_OCTAVE)?;
        let quality = Quality::from_token(token)?;
        let chord = Self::new(root, quality)?;

        match bass_part {
            Some(bass) => {
                let bass = Note::new(bass, SYMBOL_OCTAVE)?;
                Ok(chord.set_bass(bass))
            }
            None => Ok(chord),
        }
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn bass(&self) -> Note {
        self.bass
    }

    /// Whether the bass differs from the root pitch class
    pub fn is_slash(&self) -> bool {
        self.bass.pitch_class() != self.root.pitch_class()
    }

    /// Copy of this chord with a different bass
    pub fn set_bass(mut self, bass: Note) -> Self {
        self.bass = bass;
        self
    }

    /// Chord tones, root transposed by each cataloged interval
    pub fn notes(&self) -> Vec<Note> {
        self.quality
            .intervals()
            .iter()
            .filter_map(|&i| self.root.transpose(i).ok())
            .collect()
    }

    pub fn pitch_classes(&self) -> PitchClassSet {
        self.quality.template().transpose(self.root.pitch_class() as i32)
    }

    pub fn contains_pitch_class(&self, pc: u8) -> bool {
        self.pitch_classes().contains(pc)
    }

    /// Number of pitch classes shared with another chord
    pub fn common_tones(&self, other: &Chord) -> usize {
        self.pitch_classes().intersection(other.pitch_classes()).len()
    }

    /// Chord symbol, with `/bass` appended for slash chords
    pub fn symbol(&self) -> String {
        let mut symbol = format!("{}{}", self.root.name(), self.quality.suffix());
        if self.is_slash() {
            symbol.push('/');
            symbol.push_str(self.bass.name());
        }
        symbol
    }

    /// Transpose root and bass together
    pub fn transpose(&self, semitones: Semitones) -> Result<Self> {
        let root = self.root.transpose(semitones)?;
        let bass = self.bass.transpose(semitones)?;
        Ok(Self::new(root, self.quality)?.set_bass(bass))
    }

    /// Copy of the chord with the n-th chord tone in the bass
    pub fn invert(&self, inversion: usize) -> Result<Self> {
        let notes = self.notes();
        let bass = notes
            .get(inversion)
            .copied()
            .ok_or_else(|| TheoryError::InvalidSymbol(format!("{} inversion {}", self.symbol(), inversion)))?;
        Ok(self.set_bass(bass))
    }

    /// Which chord tone sits in the bass; `None` for a non-chord bass
    pub fn inversion(&self) -> Option<usize> {
        let bass_pc = self.bass.pitch_class();
        self.notes().iter().position(|n| n.pitch_class() == bass_pc)
    }

    /// Label a note's role in the chord (`"root"`, `"b3"`, `"5"`, `"b7"` ...)
    ///
    /// Returns `None` if the note's pitch class is not a chord tone.
    pub fn chord_tone_function(&self, note: Note) -> Option<&'static str> {
        if !self.contains_pitch_class(note.pitch_class()) {
            return None;
        }
        let minor = self.quality.is_minor_family();
        let label = match self.root.interval_to(note) {
            0 => "root",
            1 => "b9",
            2 => "9",
            3 if minor => "b3",
            3 => "3",
            4 if minor => "#3",
            4 => "3",
            5 => "11",
            6 => "b5",
            7 => "5",
            8 => "b13",
            9 => "13",
            10 => "b7",
            _ => "7",
        };
        Some(label)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Chord {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_symbol(s)
    }
}

impl TryFrom<String> for Chord {
    type Error = TheoryError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_symbol(&s)
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.symbol()
    }
}
