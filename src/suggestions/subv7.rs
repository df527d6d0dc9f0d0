// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tritone substitution of dominant chords.
//!
//! A dominant and the dominant a tritone away share their third and seventh,
//! so every substitute starts from a voice-leading floor of 0.85.

use super::voice_leading::bass_motion_smoothness;
use super::{analysis_key, build, degree_of, function_at, shifted_root, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSuggestion, Function, Key, Position, Quality};

const SHARED_TRITONE_FLOOR: f64 = 0.85;

#[derive(Debug, Default, Clone, Copy)]
pub struct SubV7Strategy;

impl SuggestionStrategy for SubV7Strategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let Some(key) = analysis_key(progression, key) else {
            return Ok(Vec::new());
        };
        let jazz = is_jazz_context(progression);

        let mut suggestions = Vec::new();
        for (i, dominant) in progression.iter().enumerate() {
            if !dominant.quality().is_dominant_family() {
                continue;
            }
            let Some(sub_root) = shifted_root(dominant.root(), 6, true) else {
                continue;
            };
            let Some(primary) = build(sub_root, dominant.quality()) else {
                continue;
            };
            let confidence = confidence(progression, i, dominant, &primary, key, jazz);

            suggestions.push(ChordSuggestion::new(
                primary,
                confidence,
                reasoning(dominant, key),
                Position::Replace(i),
                tritone_voice_leading(progression, i, dominant, &primary),
            ));

            if dominant.quality() == Quality::Dominant7 {
                for quality in [Quality::Dominant9, Quality::Dominant13] {
                    if let Some(extended) = build(sub_root, quality) {
                        suggestions.push(ChordSuggestion::new(
                            extended,
                            confidence * 0.85,
                            format!("Tritone substitution with a {} extension", quality.name()),
                            Position::Replace(i),
                            0.8,
                        ));
                    }
                }
            }

            for (quality, label) in [(Quality::Dominant7Flat5, "♭5"), (Quality::Dominant7Sharp5, "♯5")] {
                if let Some(altered) = build(sub_root, quality) {
                    suggestions.push(ChordSuggestion::new(
                        altered,
                        confidence * 0.75,
                        format!("Altered tritone substitution with {} for jazz color", label),
                        Position::Replace(i),
                        0.75,
                    ));
                }
            }
        }
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "SubV7"
    }
}

fn confidence(
    progression: &ChordProgression,
    index: usize,
    dominant: &Chord,
    substitute: &Chord,
    key: &Key,
    jazz: bool,
) -> f64 {
    let mut confidence: f64 = 0.8;
    if degree_of(dominant, key) == Some(5) {
        confidence += 0.1;
    }
    if smooths_bass_line(progression, index, substitute) {
        confidence += 0.1;
    }
    if function_at(progression, index + 1, key) == Some(Function::Tonic) {
        confidence += 0.1;
    }
    if jazz {
        confidence += 0.15;
    }
    confidence.min(0.95)
}

/// Shared-tritone floor, raised when the substitute's bass moves more
/// smoothly into the next chord than the original did
fn tritone_voice_leading(progression: &ChordProgression, index: usize, dominant: &Chord, substitute: &Chord) -> f64 {
    let mut quality = SHARED_TRITONE_FLOOR;
    if let Some(next) = progression.get(index + 1) {
        if bass_motion_smoothness(substitute, next) > bass_motion_smoothness(dominant, next) {
            quality += 0.1;
        }
    }
    quality.min(1.0)
}

/// Step motion (or unison) into or out of the substitute
fn smooths_bass_line(progression: &ChordProgression, index: usize, substitute: &Chord) -> bool {
    let from_previous = index
        .checked_sub(1)
        .and_then(|p| progression.get(p))
        .is_some_and(|prev| bass_motion_smoothness(prev, substitute) >= 0.8);
    let into_next = progression
        .get(index + 1)
        .is_some_and(|next| bass_motion_smoothness(substitute, next) >= 0.8);
    from_previous || into_next
}

/// At least half the chords are sevenths or extended chords
fn is_jazz_context(progression: &ChordProgression) -> bool {
    let extended = progression
        .iter()
        .filter(|c| {
            matches!(
                c.quality(),
                Quality::Major7
                    | Quality::Minor7
                    | Quality::Dominant7
                    | Quality::Dominant9
                    | Quality::Dominant11
                    | Quality::Dominant13
                    | Quality::Minor9
                    | Quality::Major9
            )
        })
        .count();
    extended * 2 >= progression.len()
}

fn reasoning(dominant: &Chord, key: &Key) -> String {
    if degree_of(dominant, key) == Some(5) {
        format!(
            "Tritone substitution of {} (♭II7 for V7), sharing the same tritone",
            dominant.symbol()
        )
    } else {
        format!(
            "Tritone substitution of {} for chromatic bass motion, sharing the same tritone",
            dominant.symbol()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(symbols: &[&str]) -> ChordProgression {
        ChordProgression::from_symbols(symbols, Some(Key::c_major()), None).unwrap()
    }

    #[test]
    fn test_v7_substitute() {
        let p = progression(&["Dm7", "G7", "Cmaj7"]);
        let suggestions = SubV7Strategy.suggest(&p, None).unwrap();
        let primary = &suggestions[0];
        assert_eq!(primary.chord.symbol(), "Db7");
        assert_eq!(primary.position, Position::Replace(1));
        // Degree 5, resolves to tonic, jazz context
        assert_eq!(primary.confidence, 0.95);
        // Db falling to C reads as a major seventh up, no smoother than G to C
        assert!((primary.voice_leading_quality - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_smoother_bass_raises_voice_leading() {
        // Db7 rises a whole step to Eb where G7 would rise a fourth
        let p = progression(&["C", "G7", "Eb"]);
        let primary = &SubV7Strategy.suggest(&p, None).unwrap()[0];
        assert_eq!(primary.chord.symbol(), "Db7");
        assert!((primary.voice_leading_quality - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_variants_for_plain_dominant7() {
        let p = progression(&["C", "G7", "C"]);
        let symbols: Vec<String> = SubV7Strategy
            .suggest(&p, None)
            .unwrap()
            .iter()
            .map(|s| s.chord.symbol())
            .collect();
        assert_eq!(symbols, vec!["Db7", "Db9", "Db13", "Db7b5", "Db7#5"]);
    }

    #[test]
    fn test_extended_dominant_keeps_quality() {
        let p = progression(&["C", "G9", "C"]);
        let suggestions = SubV7Strategy.suggest(&p, None).unwrap();
        assert_eq!(suggestions[0].chord.symbol(), "Db9");
        assert!(!suggestions.iter().any(|s| s.chord.symbol() == "Db13"));
    }

    #[test]
    fn test_non_dominants_ignored() {
        let p = progression(&["C", "Am", "F", "G"]);
        assert!(SubV7Strategy.suggest(&p, None).unwrap().is_empty());
    }

    #[test]
    fn test_reduced_confidence_for_variants() {
        let p = progression(&["C", "G7", "C"]);
        let suggestions = SubV7Strategy.suggest(&p, None).unwrap();
        let primary = suggestions[0].confidence;
        assert!((suggestions[1].confidence - primary * 0.85).abs() < 1e-9);
        assert!((suggestions[3].confidence - primary * 0.75).abs() < 1e-9);
        assert_eq!(suggestions[3].voice_leading_quality, 0.75);
    }
}
