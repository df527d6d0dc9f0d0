// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale definitions and diatonic chord construction.
//!
//! Provides the scale-type catalog, mode rotation, note-to-degree mapping
//! and the chord built on each scale degree.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chord::{Chord, PitchClassSet, Quality};
use super::note::Note;
use crate::error::{Result, TheoryError};

/// Mode names of the major scale, indexed by rotation
const MAJOR_MODE_NAMES: [&str; 7] = [
    "ionian",
    "dorian",
    "phrygian",
    "lydian",
    "mixolydian",
    "aeolian",
    "locrian",
];

/// Scale types supported by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    // Major scale and modes
    Major,        // Ionian
    Dorian,       // Minor with raised 6th
    Phrygian,     // Minor with lowered 2nd
    Lydian,       // Major with raised 4th
    Mixolydian,   // Major with lowered 7th
    NaturalMinor, // Aeolian
    Locrian,      // Diminished

    // Other minor scales
    HarmonicMinor,
    MelodicMinor, // Ascending form

    // Pentatonic scales
    #[serde(rename = "pentatonic_major")]
    MajorPentatonic,
    #[serde(rename = "pentatonic_minor")]
    MinorPentatonic,

    Blues,

    // Symmetric scales
    WholeTone,
    #[serde(rename = "diminished_hw")]
    DiminishedHW, // Half-whole
    #[serde(rename = "diminished_wh")]
    DiminishedWH, // Whole-half
    Chromatic,

    // Rotation of a parent scale that is not itself in the catalog
    Custom,
}

impl ScaleType {
    /// Every cataloged scale type
    pub const ALL: [ScaleType; 16] = [
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
        ScaleType::Chromatic,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::WholeTone,
        ScaleType::DiminishedHW,
        ScaleType::DiminishedWH,
    ];

    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],

            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],

            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],

            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],

            ScaleType::WholeTone => &[0, 2, 4, 6, 8, 10],
            ScaleType::DiminishedHW => &[0, 1, 3, 4, 6, 7, 9, 10],
            ScaleType::DiminishedWH => &[0, 2, 3, 5, 6, 8, 9, 11],
            ScaleType::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],

            ScaleType::Custom => &[],
        }
    }

    /// Parse scale type from string
    pub fn from_name(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        let scale_type = match key.as_str() {
            "major" | "ionian" => ScaleType::Major,
            "dorian" => ScaleType::Dorian,
            "phrygian" => ScaleType::Phrygian,
            "lydian" => ScaleType::Lydian,
            "mixolydian" => ScaleType::Mixolydian,
            "minor" | "naturalminor" | "aeolian" => ScaleType::NaturalMinor,
            "locrian" => ScaleType::Locrian,
            "harmonicminor" => ScaleType::HarmonicMinor,
            "melodicminor" => ScaleType::MelodicMinor,
            "majorpentatonic" | "pentatonicmajor" => ScaleType::MajorPentatonic,
            "minorpentatonic" | "pentatonicminor" => ScaleType::MinorPentatonic,
            "blues" => ScaleType::Blues,
            "wholetone" => ScaleType::WholeTone,
            "diminishedhw" | "halfwhole" => ScaleType::DiminishedHW,
            "diminishedwh" | "wholehalf" => ScaleType::DiminishedWH,
            "chromatic" => ScaleType::Chromatic,
            _ => return Err(TheoryError::UnknownScale(s.to_string())),
        };
        Ok(scale_type)
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::Locrian => "Locrian",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
            ScaleType::Blues => "Blues",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::DiminishedHW => "Diminished (H-W)",
            ScaleType::DiminishedWH => "Diminished (W-H)",
            ScaleType::Chromatic => "Chromatic",
            ScaleType::Custom => "Custom",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Chord size for diatonic chord construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChordSize {
    #[default]
    Triad,
    Seventh,
}

/// A complete scale with tonic and interval pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    tonic: Note,
    scale_type: ScaleType,
    name: String,
    intervals: Vec<u8>,
    notes: Vec<Note>,
}

impl Scale {
    /// Create a scale; accidentals follow the tonic's spelling
    pub fn new(tonic: Note, scale_type: ScaleType) -> Result<Self> {
        Self::spelled(tonic, scale_type, tonic.is_flat())
    }

    /// Create a scale whose accidentals are all flats or all sharps
    pub fn spelled(tonic: Note, scale_type: ScaleType, flats: bool) -> Result<Self> {
        if scale_type == ScaleType::Custom {
            return Err(TheoryError::UnknownScale("custom".to_string()));
        }
        let name = scale_type.name().to_string();
        Self::build(tonic, scale_type, name, scale_type.intervals().to_vec(), flats)
    }

    /// Scale on a pitch class in octave 4; cannot leave the MIDI range
    pub fn on_pitch_class(tonic_pc: u8, scale_type: ScaleType, flats: bool) -> Self {
        let tonic = Note::from_pitch_class(tonic_pc, 4, flats);
        let intervals = scale_type.intervals().to_vec();
        let notes = intervals
            .iter()
            .map(|&i| Note::from_pitch_class(tonic_pc + i, 4 + ((tonic_pc + i) / 12) as i32, flats))
            .collect();
        Self {
            tonic,
            scale_type,
            name: scale_type.name().to_string(),
            intervals,
            notes,
        }
    }

    /// Build the `mode`-th rotation (0-based) of a parent scale on `tonic`
    ///
    /// Rotations of the major scale resolve to their named modes, so
    /// `from_mode(D, 1, Major)` is D Dorian.
    pub fn from_mode(tonic: Note, mode: usize, parent: ScaleType) -> Result<Self> {
        let parent_pattern = parent.intervals();
        if mode >= parent_pattern.len() {
            return Err(TheoryError::InvalidDegree {
                degree: mode,
                len: parent_pattern.len(),
            });
        }

        let mode_root = parent_pattern[mode];
        let pattern: Vec<u8> = parent_pattern[mode..]
            .iter()
            .chain(&parent_pattern[..mode])
            .map(|&step| (step + 12 - mode_root) % 12)
            .collect();

        let known = ScaleType::ALL
            .iter()
            .copied()
            .find(|t| t.intervals() == pattern.as_slice());
        let (scale_type, name) = match (parent, known) {
            (ScaleType::Major, Some(t)) => (t, capitalize(MAJOR_MODE_NAMES[mode])),
            (_, Some(t)) => (t, t.name().to_string()),
            (_, None) => (
                ScaleType::Custom,
                format!("{} mode {}", parent.name(), mode),
            ),
        };
        Self::build(tonic, scale_type, name, pattern, tonic.is_flat())
    }

    fn build(
        tonic: Note,
        scale_type: ScaleType,
        name: String,
        intervals: Vec<u8>,
        flats: bool,
    ) -> Result<Self> {
        let notes = intervals
            .iter()
            .map(|&i| tonic.transpose(i as i32).map(|n| n.respell(flats)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tonic: tonic.respell(flats),
            scale_type,
            name,
            intervals,
            notes,
        })
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Display name, e.g. "Dorian" or "Harmonic Minor mode 4"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the intervals (semitones from tonic)
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// Get the notes in this scale
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn pitch_classes(&self) -> PitchClassSet {
        self.notes.iter().map(|n| n.pitch_class()).collect()
    }

    /// Check if a note's pitch class is in this scale
    pub fn contains(&self, note: Note) -> bool {
        self.contains_pitch_class(note.pitch_class())
    }

    pub fn contains_pitch_class(&self, pc: u8) -> bool {
        self.notes.iter().any(|n| n.pitch_class() == pc)
    }

    /// Get the note at a scale degree (1-based)
    pub fn degree(&self, degree: usize) -> Result<Note> {
        if degree == 0 || degree > self.len() {
            return Err(TheoryError::InvalidDegree {
                degree,
                len: self.len(),
            });
        }
        Ok(self.notes[degree - 1])
    }

    /// Get the scale degree (1-based) for a note's pitch class
    pub fn note_degree(&self, note: Note) -> Option<usize> {
        self.pitch_class_degree(note.pitch_class())
    }

    pub fn pitch_class_degree(&self, pc: u8) -> Option<usize> {
        self.notes
            .iter()
            .position(|n| n.pitch_class() == pc)
            .map(|i| i + 1)
    }

    /// Chord stacked in thirds on a scale degree
    ///
    /// Takes scale positions 0, 2, 4 (and 6) from the degree, wrapping around
    /// the scale. Interval shapes outside the lookup table fall back to major
    /// for triads and dominant seventh for sevenths.
    pub fn chord_for_degree(&self, degree: usize, size: ChordSize) -> Result<Chord> {
        let root = self.degree(degree)?;
        let offsets: &[usize] = match size {
            ChordSize::Triad => &[2, 4],
            ChordSize::Seventh => &[2, 4, 6],
        };
        let shape: Vec<u8> = offsets
            .iter()
            .map(|off| self.notes[(degree - 1 + off) % self.len()])
            .map(|n| root.interval_to(n))
            .collect();

        let quality = match shape.as_slice() {
            [4, 7] => Quality::Major,
            [3, 7] => Quality::Minor,
            [3, 6] => Quality::Diminished,
            [4, 8] => Quality::Augmented,
            [_, _] => Quality::Major,
            [4, 7, 11] => Quality::Major7,
            [3, 7, 10] => Quality::Minor7,
            [4, 7, 10] => Quality::Dominant7,
            [3, 6, 10] => Quality::HalfDiminished7,
            [3, 6, 9] => Quality::Diminished7,
            _ => Quality::Dominant7,
        };
        Chord::new(root, quality)
    }

    /// Scale of another type sharing these notes, starting on one of them
    pub fn relative(&self, scale_type: ScaleType) -> Result<Scale> {
        let target = scale_type.intervals();
        for (i, &candidate) in self.notes.iter().enumerate() {
            let rotated: Vec<u8> = self.notes[i..]
                .iter()
                .chain(&self.notes[..i])
                .map(|&n| candidate.interval_to(n))
                .collect();
            if rotated.len() >= target.len() && &rotated[..target.len()] == target {
                return Scale::spelled(candidate, scale_type, self.tonic.is_flat());
            }
        }
        Err(TheoryError::UnknownScale(format!(
            "no relative {} of {}",
            scale_type.name(),
            self
        )))
    }

    /// Scale of another type on the same tonic
    pub fn parallel(&self, scale_type: ScaleType) -> Result<Scale> {
        Scale::new(self.tonic, scale_type)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic.name(), self.name)
    }
}
