// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Reharmonization of whole progressions.
//!
//! A beam search walks the progression position by position, choosing at
//! each step between the original chord and the engine's replacement
//! suggestions. Sequences are scored on suggestion confidence, voice
//! leading, functional flow and clashes with an optional melody.

pub mod beam;

pub use beam::{BeamSearch, Choice, Reharmonization, DEFAULT_BEAM_WIDTH};

use crate::analysis::NoteEvent;
use crate::music::{Chord, Function};

/// Penalty per minor-second clash between a chord tone and a melody note
pub const CLASH_PENALTY: f64 = 5.0;

/// Strength of a move between two harmonic functions
pub fn functional_transition(from: Function, to: Function) -> f64 {
    use Function::*;
    match (from, to) {
        (Subdominant, Dominant) | (Dominant, Tonic) => 1.0,
        (Tonic, Subdominant) | (Tonic, Dominant) => 0.7,
        (Subdominant, Tonic) => 0.6,
        (Tonic, Tonic) => 0.5,
        (Dominant, Subdominant) => 0.1,
        _ => 0.3,
    }
}

/// Melody notes sounding in `[start, end)` a semitone from a chord tone
///
/// Every offending (melody note, chord tone) pair counts once.
pub fn melody_clashes(chord: &Chord, melody: &[NoteEvent], start: f64, end: f64) -> usize {
    let chord_pcs = chord.pitch_classes();
    melody
        .iter()
        .filter(|e| e.overlaps(start, end))
        .map(|e| {
            chord_pcs
                .iter()
                .filter(|&pc| matches!((e.pitch_class() as i32 - pc as i32).rem_euclid(12), 1 | 11))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use Function::*;
        assert_eq!(functional_transition(Subdominant, Dominant), 1.0);
        assert_eq!(functional_transition(Dominant, Tonic), 1.0);
        assert_eq!(functional_transition(Tonic, Dominant), 0.7);
        assert_eq!(functional_transition(Subdominant, Tonic), 0.6);
        assert_eq!(functional_transition(Tonic, Tonic), 0.5);
        assert_eq!(functional_transition(Dominant, Subdominant), 0.1);
        assert_eq!(functional_transition(Dominant, Dominant), 0.3);
        assert_eq!(functional_transition(Unknown, Tonic), 0.3);
    }

    #[test]
    fn test_melody_clashes() {
        let c = Chord::from_symbol("C").unwrap();
        // F rubs against E, D against nothing
        let melody = vec![
            NoteEvent::new(65, 0.0, 1.0, 80).unwrap(),
            NoteEvent::new(62, 0.0, 1.0, 80).unwrap(),
        ];
        assert_eq!(melody_clashes(&c, &melody, 0.0, 1.0), 1);
        // C# against C
        let sharp = vec![NoteEvent::new(61, 0.5, 1.5, 80).unwrap()];
        assert_eq!(melody_clashes(&c, &sharp, 0.0, 1.0), 1);
        // Outside the window
        assert_eq!(melody_clashes(&c, &sharp, 2.0, 3.0), 0);
    }
}
