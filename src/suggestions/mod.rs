// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord suggestion strategies.
//!
//! Each strategy scans a progression for places where its technique applies
//! and proposes chords with a confidence, a reason and a position. The set
//! of strategies is closed; [`StrategyKind`] names them and builds them, and
//! the [`engine::SuggestionEngine`] runs an ordered list of them.

pub mod borrowed;
pub mod chromatic;
pub mod engine;
pub mod neapolitan;
pub mod subv7;
pub mod suspend;
pub mod tsd;
pub mod voice_leading;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSuggestion, Function, Key, Note, Quality};

pub use engine::{PotentialReport, SuggestionEngine};

/// Trait for all suggestion strategy implementations
pub trait SuggestionStrategy: Send + Sync {
    /// Propose chords for the progression
    ///
    /// `key` overrides the progression's own key. Strategies that need a key
    /// return no suggestions when neither is present.
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>>;

    /// Strategy name used for filtering and tagging
    fn name(&self) -> &'static str;
}

/// The built-in strategies, in default engine order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    BorrowedChord,
    ChromaticApproach,
    Neapolitan,
    SubV7,
    Suspend,
    #[serde(rename = "TSDMovement")]
    TsdMovement,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::BorrowedChord,
        StrategyKind::ChromaticApproach,
        StrategyKind::Neapolitan,
        StrategyKind::SubV7,
        StrategyKind::Suspend,
        StrategyKind::TsdMovement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::BorrowedChord => "BorrowedChord",
            StrategyKind::ChromaticApproach => "ChromaticApproach",
            StrategyKind::Neapolitan => "Neapolitan",
            StrategyKind::SubV7 => "SubV7",
            StrategyKind::Suspend => "Suspend",
            StrategyKind::TsdMovement => "TSDMovement",
        }
    }

    /// Exact, case-sensitive name lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::BorrowedChord => {
                "Suggests chords borrowed from parallel modes and related keys"
            }
            StrategyKind::ChromaticApproach => {
                "Suggests chromatic passing and approach chords for smooth voice leading"
            }
            StrategyKind::Neapolitan => {
                "Suggests Neapolitan sixth chords and related pre-dominant harmonies"
            }
            StrategyKind::SubV7 => "Suggests tritone substitution chords for dominant harmony",
            StrategyKind::Suspend => {
                "Suggests suspension chords and resolution patterns for added tension"
            }
            StrategyKind::TsdMovement => {
                "Suggests chords to strengthen functional harmony (tonic, subdominant, dominant)"
            }
        }
    }

    /// Build the strategy
    pub fn create(self) -> Box<dyn SuggestionStrategy> {
        match self {
            StrategyKind::BorrowedChord => Box::new(borrowed::BorrowedChordStrategy),
            StrategyKind::ChromaticApproach => Box::new(chromatic::ChromaticApproachStrategy),
            StrategyKind::Neapolitan => Box::new(neapolitan::NeapolitanStrategy),
            StrategyKind::SubV7 => Box::new(subv7::SubV7Strategy),
            StrategyKind::Suspend => Box::new(suspend::SuspendStrategy),
            StrategyKind::TsdMovement => Box::new(tsd::TsdMovementStrategy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Helpers shared by the strategies

/// Key to analyze against: the explicit one, else the progression's
fn analysis_key<'a>(progression: &'a ChordProgression, key: Option<&'a Key>) -> Option<&'a Key> {
    key.or_else(|| progression.key())
}

/// Last two positions of a progression
fn is_cadential(progression: &ChordProgression, index: usize) -> bool {
    index + 2 >= progression.len()
}

fn function_at(progression: &ChordProgression, index: usize, key: &Key) -> Option<Function> {
    progression.get(index).map(|c| key.function_of(c))
}

fn degree_of(chord: &Chord, key: &Key) -> Option<usize> {
    key.scale().note_degree(chord.root())
}

/// Root a number of semitones from `root`, spelled with flats or sharps
fn shifted_root(root: Note, semitones: i32, flat: bool) -> Option<Note> {
    root.transpose(semitones).ok().map(|n| n.respell(flat))
}

/// Chord on a root, `None` if the quality cannot be built there
fn build(root: Note, quality: Quality) -> Option<Chord> {
    Chord::new(root, quality).ok()
}

/// Whether keys in this signature spell accidentals as flats
fn prefers_flats(key: &Key) -> bool {
    key.signature() < 0 || key.tonic().is_flat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.create().name(), kind.name());
            assert!(!kind.description().is_empty());
        }
        assert_eq!(StrategyKind::from_name("subv7"), None);
    }

    #[test]
    fn test_cadential_positions() {
        let p = ChordProgression::from_symbols(&["C", "F", "G", "C"], None, None).unwrap();
        assert!(!is_cadential(&p, 1));
        assert!(is_cadential(&p, 2));
        assert!(is_cadential(&p, 3));
    }
}
