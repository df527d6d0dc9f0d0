// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chromatic passing and approach chords between adjacent chords.

use super::voice_leading::voice_leading_quality;
use super::{analysis_key, build, prefers_flats, shifted_root, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSuggestion, Key, Note, Position, Quality};

/// Inserts a chord a semitone from the first of two chords whose roots move
/// by a whole step up to a fifth
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromaticApproachStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Descending,
    Ascending,
}

impl Direction {
    fn base(self) -> f64 {
        match self {
            Direction::Descending => 0.75,
            Direction::Ascending => 0.7,
        }
    }

    fn ceiling(self) -> f64 {
        match self {
            Direction::Descending => 0.95,
            Direction::Ascending => 0.9,
        }
    }
}

impl SuggestionStrategy for ChromaticApproachStrategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let Some(key) = analysis_key(progression, key) else {
            return Ok(Vec::new());
        };

        let mut suggestions = Vec::new();
        for (i, pair) in progression.chords().windows(2).enumerate() {
            let (from, to) = (&pair[0], &pair[1]);
            let motion = from.root().semitones_to(to.root());
            if !(2..=7).contains(&motion.abs()) {
                continue;
            }
            let direction = if motion < 0 {
                Direction::Descending
            } else {
                Direction::Ascending
            };
            suggestions.extend(passing_chords(from, to, key, i, direction));
        }
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "ChromaticApproach"
    }
}

fn passing_chords(from: &Chord, to: &Chord, key: &Key, index: usize, direction: Direction) -> Vec<ChordSuggestion> {
    let step = match direction {
        Direction::Descending => -1,
        Direction::Ascending => 1,
    };
    let Some(root) = shifted_root(from.root(), step, prefers_flats(key)) else {
        return Vec::new();
    };

    candidate_qualities(root, to, key)
        .into_iter()
        .filter_map(|(quality, multiplier, note)| {
            let passing = build(root, quality)?;
            let vl = (voice_leading_quality(from, &passing) + voice_leading_quality(&passing, to)) / 2.0;
            let confidence = (direction.base() * multiplier + vl * 0.2).min(direction.ceiling());
            let verb = match direction {
                Direction::Descending => "passing",
                Direction::Ascending => "approach",
            };
            let reasoning = format!(
                "Chromatic {} chord from {} to {}, {}",
                verb,
                from.symbol(),
                to.symbol(),
                note
            );
            Some(ChordSuggestion::new(
                passing,
                confidence,
                reasoning,
                Position::InsertAfter(index),
                vl,
            ))
        })
        .collect()
}

/// Qualities to try on the passing root with their confidence multipliers
///
/// A target a fifth above the passing root turns the dominant seventh into
/// a secondary dominant with a higher multiplier.
fn candidate_qualities(root: Note, target: &Chord, key: &Key) -> Vec<(Quality, f64, &'static str)> {
    let secondary = root.interval_to(target.root()) == 7;
    let mut qualities = vec![(Quality::Diminished7, 1.0, "smooth diminished voice leading")];
    if secondary {
        qualities.push((Quality::Dominant7, 0.9, "acting as a secondary dominant"));
    } else {
        qualities.push((Quality::Dominant7, 0.85, "adds forward drive"));
    }
    qualities.push((Quality::HalfDiminished7, 0.75, "half-diminished color"));
    if key.contains(root) {
        qualities.push((Quality::Minor, 0.65, "gentle chromatic motion"));
    }
    if matches!(key.scale().note_degree(root), Some(1 | 4 | 5)) {
        qualities.push((Quality::Major, 0.6, "bright passing harmony"));
    }
    qualities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(symbols: &[&str]) -> ChordProgression {
        ChordProgression::from_symbols(symbols, Some(Key::c_major()), None).unwrap()
    }

    #[test]
    fn test_descending_passing_chord() {
        // F down to D: passing chords on E
        let p = progression(&["F", "Dm"]);
        let suggestions = ChromaticApproachStrategy.suggest(&p, None).unwrap();
        assert!(!suggestions.is_empty());
        for s in &suggestions {
            assert_eq!(s.position, Position::InsertAfter(0));
            assert_eq!(s.chord.root().pitch_class(), 4);
        }
        let symbols: Vec<String> = suggestions.iter().map(|s| s.chord.symbol()).collect();
        assert!(symbols.contains(&"Edim7".to_string()));
        // E is in C major, so a minor passing chord is offered
        assert!(symbols.contains(&"Em".to_string()));
    }

    #[test]
    fn test_ascending_approach_chord() {
        let p = progression(&["C", "Em"]);
        let suggestions = ChromaticApproachStrategy.suggest(&p, None).unwrap();
        assert!(suggestions.iter().all(|s| s.chord.root().pitch_class() == 1));
        assert!(suggestions.iter().all(|s| s.confidence <= 0.9));
    }

    #[test]
    fn test_secondary_dominant_multiplier() {
        // A down to Eb: the passing root G# has Eb a fifth above it
        let p = progression(&["A", "Eb"]);
        let suggestions = ChromaticApproachStrategy.suggest(&p, None).unwrap();
        let dominants: Vec<&ChordSuggestion> = suggestions
            .iter()
            .filter(|s| s.chord.quality() == Quality::Dominant7)
            .collect();
        assert_eq!(dominants.len(), 1);
        assert_eq!(dominants[0].chord.symbol(), "G#7");
        assert!(dominants[0].reasoning.contains("secondary dominant"));
        let expected = (0.75 * 0.9 + dominants[0].voice_leading_quality * 0.2).min(0.95);
        assert!((dominants[0].confidence - expected).abs() < 1e-9);

        // C up to F#: F# is only a fourth above the approach root C#
        let p = progression(&["C", "F#"]);
        let suggestions = ChromaticApproachStrategy.suggest(&p, None).unwrap();
        let dom = suggestions
            .iter()
            .find(|s| s.chord.quality() == Quality::Dominant7)
            .unwrap();
        assert_eq!(dom.chord.symbol(), "C#7");
        assert!(dom.reasoning.contains("forward drive"));

        // A down a fifth to D: passing root G# has no dominant relation to D
        let p = progression(&["A", "Dm"]);
        let suggestions = ChromaticApproachStrategy.suggest(&p, None).unwrap();
        let dom = suggestions
            .iter()
            .find(|s| s.chord.quality() == Quality::Dominant7)
            .unwrap();
        assert!(dom.reasoning.contains("forward drive"));
    }

    #[test]
    fn test_small_and_large_motion_skipped() {
        assert!(ChromaticApproachStrategy
            .suggest(&progression(&["C", "Db"]), None)
            .unwrap()
            .is_empty());
        assert!(ChromaticApproachStrategy
            .suggest(&progression(&["C", "C"]), None)
            .unwrap()
            .is_empty());
    }
}
