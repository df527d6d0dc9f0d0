// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Signed semitone intervals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::note::{Note, Semitones};
use crate::error::{Result, TheoryError};

/// Long names indexed by simple semitone count
const NAMES: [&str; 12] = [
    "unison",
    "minor second",
    "major second",
    "minor third",
    "major third",
    "perfect fourth",
    "tritone",
    "perfect fifth",
    "minor sixth",
    "major sixth",
    "minor seventh",
    "major seventh",
];

/// Short names indexed by simple semitone count
const SHORT_NAMES: [&str; 12] = [
    "P1", "m2", "M2", "m3", "M3", "P4", "TT", "P5", "m6", "M6", "m7", "M7",
];

/// Major/perfect size of each simple diatonic number (index 1-7)
const BASE_SEMITONES: [Semitones; 8] = [0, 0, 2, 4, 5, 7, 9, 11];

/// An interval as a signed semitone count
///
/// `octaves` is the floor of `semitones / 12` and `simple_semitones` is
/// always in 0..12, so a descending minor third is `(-1, 9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    semitones: Semitones,
}

impl Interval {
    /// Create an interval from a semitone count
    pub fn new(semitones: Semitones) -> Self {
        Self { semitones }
    }

    /// Interval from one note up (or down) to another
    pub fn between(from: Note, to: Note) -> Self {
        Self::new(from.semitones_to(to))
    }

    /// Parse `<quality><number>` such as `P5`, `m3`, `A4` or `M9`
    ///
    /// Quality is case-sensitive: `M` major, `m` minor, `P` perfect,
    /// `d` diminished, `A` augmented.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let invalid = || TheoryError::InvalidInterval(name.to_string());

        let mut chars = name.chars();
        let quality = chars.next().ok_or_else(invalid)?;
        let number: i32 = chars.as_str().parse().map_err(|_| invalid())?;
        if number < 1 {
            return Err(invalid());
        }

        let octaves = (number - 1) / 7;
        let simple = ((number - 1) % 7 + 1) as usize;
        let perfect = matches!(simple, 1 | 4 | 5);
        let mut semitones = BASE_SEMITONES[simple] + octaves * 12;

        match quality {
            'M' if !perfect => {}
            'm' if !perfect => semitones -= 1,
            'P' if perfect => {}
            'd' => semitones -= if perfect { 1 } else { 2 },
            'A' => semitones += if perfect { 1 } else { 2 },
            _ => return Err(invalid()),
        }

        Ok(Self::new(semitones))
    }

    /// Total signed semitones
    pub fn semitones(self) -> Semitones {
        self.semitones
    }

    /// Semitones within one octave (0-11)
    pub fn simple_semitones(self) -> u8 {
        self.semitones.rem_euclid(12) as u8
    }

    /// Whole octaves, floored
    pub fn octaves(self) -> i32 {
        self.semitones.div_euclid(12)
    }

    /// Inversion within the octave
    pub fn invert(self) -> Self {
        Self::new((12 - self.simple_semitones() as i32) % 12)
    }

    pub fn add(self, other: Interval) -> Self {
        Self::new(self.semitones + other.semitones)
    }

    pub fn subtract(self, other: Interval) -> Self {
        Self::new(self.semitones - other.semitones)
    }

    /// Unison, thirds, perfect fifth and sixths
    pub fn is_consonant(self) -> bool {
        matches!(self.simple_semitones(), 0 | 3 | 4 | 7 | 8 | 9)
    }

    /// Unison, perfect fourth and perfect fifth
    pub fn is_perfect(self) -> bool {
        matches!(self.simple_semitones(), 0 | 5 | 7)
    }

    /// Descriptive name, e.g. "major third" or "perfect fifth + 1 octave(s)"
    pub fn name(self) -> String {
        let base = NAMES[self.simple_semitones() as usize];
        if self.octaves() > 0 {
            format!("{} + {} octave(s)", base, self.octaves())
        } else {
            base.to_string()
        }
    }

    /// Abbreviated name, e.g. "M3" or "P5+1oct"
    pub fn short_name(self) -> String {
        let base = SHORT_NAMES[self.simple_semitones() as usize];
        if self.octaves() > 0 {
            format!("{}+{}oct", base, self.octaves())
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Interval {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition() {
        let i = Interval::new(19);
        assert_eq!(i.octaves(), 1);
        assert_eq!(i.simple_semitones(), 7);

        let down = Interval::new(-3);
        assert_eq!(down.octaves(), -1);
        assert_eq!(down.simple_semitones(), 9);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Interval::from_name("P5").unwrap().semitones(), 7);
        assert_eq!(Interval::from_name("m3").unwrap().semitones(), 3);
        assert_eq!(Interval::from_name("M3").unwrap().semitones(), 4);
        assert_eq!(Interval::from_name("A4").unwrap().semitones(), 6);
        assert_eq!(Interval::from_name("d5").unwrap().semitones(), 6);
        assert_eq!(Interval::from_name("d7").unwrap().semitones(), 9);
        assert_eq!(Interval::from_name("P8").unwrap().semitones(), 12);
        assert_eq!(Interval::from_name("M9").unwrap().semitones(), 14);
        assert_eq!(Interval::from_name("P11").unwrap().semitones(), 17);
        assert_eq!(Interval::from_name("m13").unwrap().semitones(), 20);
    }

    #[test]
    fn test_from_name_rejects_bad_quality() {
        assert!(Interval::from_name("P3").is_err());
        assert!(Interval::from_name("m5").is_err());
        assert!(Interval::from_name("X2").is_err());
        assert!(Interval::from_name("M").is_err());
        assert!(Interval::from_name("M0").is_err());
        assert!(Interval::from_name("").is_err());
    }

    #[test]
    fn test_invert() {
        assert_eq!(Interval::new(4).invert().semitones(), 8);
        assert_eq!(Interval::new(7).invert().semitones(), 5);
        assert_eq!(Interval::new(0).invert().semitones(), 0);
        assert_eq!(Interval::new(12).invert().semitones(), 0);
    }

    #[test]
    fn test_classification() {
        assert!(Interval::new(7).is_consonant());
        assert!(Interval::new(7).is_perfect());
        assert!(!Interval::new(6).is_consonant());
        assert!(Interval::new(9).is_consonant());
        assert!(!Interval::new(9).is_perfect());
    }

    #[test]
    fn test_names() {
        assert_eq!(Interval::new(4).name(), "major third");
        assert_eq!(Interval::new(19).name(), "perfect fifth + 1 octave(s)");
        assert_eq!(Interval::new(6).short_name(), "TT");
        assert_eq!(Interval::new(14).short_name(), "M2+1oct");
    }

    #[test]
    fn test_between_and_arithmetic() {
        let c4 = Note::new("C", 4).unwrap();
        let g4 = Note::new("G", 4).unwrap();
        let fifth = Interval::between(c4, g4);
        assert_eq!(fifth.semitones(), 7);
        assert_eq!(Interval::between(g4, c4).semitones(), -7);
        assert_eq!(fifth.add(Interval::new(5)).semitones(), 12);
        assert_eq!(fifth.subtract(Interval::new(3)).semitones(), 4);
    }
}
