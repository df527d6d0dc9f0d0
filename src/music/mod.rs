// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory data model.
//!
//! Notes and intervals at the bottom, chords, scales and keys on top of
//! them, and progressions built from chords.

pub mod chord;
pub mod interval;
pub mod key;
pub mod note;
pub mod progression;
pub mod scale;

pub use chord::{Chord, PitchClassSet, Quality};
pub use interval::Interval;
pub use key::{ChordAnalysis, Function, Key, KeyRelation, Mode};
pub use note::{MidiNote, Note, Semitones};
pub use progression::{ChordEntry, ChordProgression, ChordSuggestion, Position, ProgressionDoc};
pub use scale::{ChordSize, Scale, ScaleType};
