// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! chordsmith - symbolic music theory for chord progressions.
//!
//! The crate models notes, intervals, chords, scales, keys and progressions,
//! detects chords and keys from notes and timed note events, proposes chord
//! substitutions through a set of suggestion strategies, and reharmonizes
//! whole progressions with a beam search.

pub mod analysis;
pub mod config;
pub mod error;
pub mod music;
pub mod reharm;
pub mod suggestions;

pub use error::{Result, TheoryError};
pub use music::{Chord, ChordProgression, ChordSuggestion, Key, Mode, Note, Position, Quality};
pub use reharm::{BeamSearch, Reharmonization};
pub use suggestions::{StrategyKind, SuggestionEngine, SuggestionStrategy};
