// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Neapolitan (♭II) chords in pre-dominant positions.

use super::voice_leading::voice_leading_quality;
use super::{analysis_key, build, degree_of, function_at, is_cadential, shifted_root, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSuggestion, Function, Key, Mode, Position, Quality};

#[derive(Debug, Default, Clone, Copy)]
pub struct NeapolitanStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Variant {
    /// First inversion, the classic N6
    Sixth,
    Root,
    Seventh,
}

impl Variant {
    fn base(self) -> f64 {
        match self {
            Variant::Sixth => 0.85,
            Variant::Root => 0.65,
            Variant::Seventh => 0.75,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Variant::Sixth => "Neapolitan sixth (♭II6) as a dramatic pre-dominant",
            Variant::Root => "Root-position Neapolitan (♭II) for harmonic color",
            Variant::Seventh => "Neapolitan seventh (♭II7) as a richer pre-dominant",
        }
    }
}

impl SuggestionStrategy for NeapolitanStrategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let Some(key) = analysis_key(progression, key) else {
            return Ok(Vec::new());
        };
        let Some(root) = shifted_root(key.tonic(), 1, true) else {
            return Ok(Vec::new());
        };
        let Some(triad) = build(root, Quality::Major) else {
            return Ok(Vec::new());
        };
        let variants = [
            (Variant::Sixth, triad.invert(1).ok()),
            (Variant::Root, Some(triad)),
            (Variant::Seventh, build(root, Quality::Dominant7)),
        ];

        let mut suggestions = Vec::new();
        for (i, current) in progression.iter().enumerate() {
            if !is_neapolitan_position(progression, i, key) {
                continue;
            }
            for (variant, chord) in variants.iter() {
                let Some(chord) = chord else { continue };
                let confidence = confidence(progression, i, current, chord, *variant, key);
                let reasoning = format!("{} in {}{}", variant.description(), key, mode_note(key.mode()));
                suggestions.push(ChordSuggestion::new(
                    *chord,
                    confidence,
                    reasoning,
                    Position::Replace(i),
                    voice_leading_quality(current, chord),
                ));
            }
        }
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "Neapolitan"
    }
}

/// Subdominant chords, chords before a dominant, cadential chords with a
/// dominant still to come, and ii chords
fn is_neapolitan_position(progression: &ChordProgression, index: usize, key: &Key) -> bool {
    let Some(current) = progression.get(index) else {
        return false;
    };
    if key.function_of(current) == Function::Subdominant {
        return true;
    }
    if function_at(progression, index + 1, key) == Some(Function::Dominant) {
        return true;
    }
    if is_cadential(progression, index)
        && progression.chords()[index + 1..]
            .iter()
            .any(|c| key.function_of(c) == Function::Dominant)
    {
        return true;
    }
    degree_of(current, key) == Some(2)
}

fn confidence(
    progression: &ChordProgression,
    index: usize,
    current: &Chord,
    chord: &Chord,
    variant: Variant,
    key: &Key,
) -> f64 {
    let mut confidence = variant.base();
    if key.mode() == Mode::Minor {
        confidence += 0.1;
    }
    if key.function_of(current) == Function::Subdominant {
        confidence += 0.1;
    }
    if degree_of(current, key) == Some(2) {
        confidence += 0.15;
    }

    // Resolution through a dominant, better still when the tonic follows
    let mut resolution = 0.5;
    if function_at(progression, index + 1, key) == Some(Function::Dominant) {
        confidence += 0.1;
        resolution += 0.3;
        if function_at(progression, index + 2, key) == Some(Function::Tonic) {
            resolution += 0.2;
        }
    }
    confidence += resolution * 0.2;

    let mut vl = voice_leading_quality(current, chord);
    if variant == Variant::Sixth {
        vl += 0.1;
    }
    (confidence + vl * 0.1).min(0.95)
}

fn mode_note(mode: Mode) -> &'static str {
    match mode {
        Mode::Minor => ", idiomatic in minor keys",
        Mode::Major => ", borrowed from the minor mode for drama",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(symbols: &[&str], key: &str) -> ChordProgression {
        ChordProgression::from_symbols(symbols, Some(Key::parse(key).unwrap()), None).unwrap()
    }

    #[test]
    fn test_ii_v_i_offers_all_variants() {
        let p = progression(&["Dm", "G", "C"], "C major");
        let suggestions = NeapolitanStrategy.suggest(&p, None).unwrap();
        let at_ii: Vec<String> = suggestions
            .iter()
            .filter(|s| s.position == Position::Replace(0))
            .map(|s| s.chord.symbol())
            .collect();
        assert_eq!(at_ii, vec!["Db/F", "Db", "Db7"]);
    }

    #[test]
    fn test_dominant_then_tonic_raises_confidence() {
        let resolved = progression(&["F", "G", "C"], "C major");
        let unresolved = progression(&["F", "Am", "C"], "C major");
        let best = |p: &ChordProgression| {
            NeapolitanStrategy
                .suggest(p, None)
                .unwrap()
                .into_iter()
                .filter(|s| s.position == Position::Replace(0) && s.chord.symbol() == "Db")
                .map(|s| s.confidence)
                .fold(0.0, f64::max)
        };
        assert!(best(&resolved) > best(&unresolved));
    }

    #[test]
    fn test_minor_key_spelling() {
        let p = progression(&["Am", "Dm", "E", "Am"], "A minor");
        let suggestions = NeapolitanStrategy.suggest(&p, None).unwrap();
        assert!(suggestions.iter().any(|s| s.chord.symbol() == "Bb/D"));
        assert!(suggestions.iter().all(|s| s.confidence <= 0.95));
    }

    #[test]
    fn test_tonic_only_has_no_positions() {
        let p = progression(&["C", "Am", "Em"], "C major");
        assert!(NeapolitanStrategy.suggest(&p, None).unwrap().is_empty());
    }
}
