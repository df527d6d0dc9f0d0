// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Functional harmony: tonic, subdominant and dominant movement.
//!
//! Three kinds of suggestion come out of here:
//! - same-function alternates for each chord (vi for I, ii for IV ...)
//! - bridge chords inserted into weak transitions (T→D, D→S)
//! - a cadential completion when the progression does not end D→T

use super::voice_leading::voice_leading_quality;
use super::{analysis_key, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSize, ChordSuggestion, Function, Key, Mode, Position};

const MAJOR_NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii°"];
const MINOR_NUMERALS: [&str; 7] = ["i", "ii°", "III", "iv", "v", "VI", "VII"];

/// Only alternates scoring above this are offered
const MIN_ALTERNATE_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Default, Clone, Copy)]
pub struct TsdMovementStrategy;

/// Scale degrees grouped by function, strongest first
fn functional_group(function: Function, mode: Mode) -> &'static [usize] {
    match (function, mode) {
        (Function::Tonic, _) => &[1, 6, 3],
        (Function::Subdominant, Mode::Major) => &[4, 2],
        (Function::Subdominant, Mode::Minor) => &[4, 2, 6],
        (Function::Dominant, _) => &[5, 7],
        (Function::Unknown, _) => &[],
    }
}

fn primary_degree(function: Function) -> Option<usize> {
    match function {
        Function::Tonic => Some(1),
        Function::Subdominant => Some(4),
        Function::Dominant => Some(5),
        Function::Unknown => None,
    }
}

fn common_substitute(function: Function) -> Option<usize> {
    match function {
        Function::Tonic => Some(6),
        Function::Subdominant => Some(2),
        _ => None,
    }
}

impl SuggestionStrategy for TsdMovementStrategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let Some(key) = analysis_key(progression, key) else {
            return Ok(Vec::new());
        };
        let analyses: Vec<_> = progression.iter().map(|c| key.analyze_chord(c)).collect();

        let mut suggestions = Vec::new();
        for (i, chord) in progression.iter().enumerate() {
            if let Some(degree) = analyses[i].degree {
                suggestions.extend(alternates(chord, i, degree, analyses[i].function, key));
            }
        }

        for i in 0..analyses.len().saturating_sub(1) {
            suggestions.extend(bridges(analyses[i].function, analyses[i + 1].function, i, key));
        }

        let functions: Vec<Function> = analyses.iter().map(|a| a.function).collect();
        suggestions.extend(cadential_completion(&functions, key));
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "TSDMovement"
    }
}

fn alternates(current: &Chord, index: usize, degree: usize, function: Function, key: &Key) -> Vec<ChordSuggestion> {
    functional_group(function, key.mode())
        .iter()
        .filter(|&&alt| alt != degree)
        .filter_map(|&alt| {
            let chord = key.chord_for_degree(alt, ChordSize::Triad).ok()?;
            if chord.symbol() == current.symbol() {
                return None;
            }
            let vl = voice_leading_quality(current, &chord);
            let mut confidence = 0.6;
            if primary_degree(function) == Some(alt) {
                confidence += 0.2;
            }
            if common_substitute(function) == Some(alt) {
                confidence += 0.15;
            }
            let confidence = (confidence + vl * 0.15).min(0.95);
            if confidence <= MIN_ALTERNATE_CONFIDENCE {
                return None;
            }
            Some(ChordSuggestion::new(
                chord,
                confidence,
                alternate_reasoning(function, alt, key.mode()),
                Position::Replace(index),
                vl,
            ))
        })
        .collect()
}

fn bridges(from: Function, to: Function, index: usize, key: &Key) -> Vec<ChordSuggestion> {
    match (from, to) {
        (Function::Tonic, Function::Dominant) => functional_group(Function::Subdominant, key.mode())
            .iter()
            .filter_map(|&degree| key.chord_for_degree(degree, ChordSize::Triad).ok())
            .map(|chord| {
                ChordSuggestion::new(
                    chord,
                    0.8,
                    "Subdominant bridge chord to strengthen a T-S-D progression",
                    Position::InsertAfter(index),
                    0.8,
                )
            })
            .collect(),
        (Function::Dominant, Function::Subdominant) => key
            .chord_for_degree(1, ChordSize::Triad)
            .ok()
            .map(|chord| {
                ChordSuggestion::new(
                    chord,
                    0.7,
                    "Tonic resolution before the subdominant to avoid retrograde motion",
                    Position::InsertAfter(index),
                    0.75,
                )
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Tonic after a final dominant, or a dominant when neither of the last two
/// chords is one
fn cadential_completion(functions: &[Function], key: &Key) -> Option<ChordSuggestion> {
    let [.., penultimate, last] = functions else {
        return None;
    };
    if (*penultimate, *last) == (Function::Dominant, Function::Tonic) {
        return None;
    }
    let end = Position::InsertAfter(functions.len() - 1);
    if *last == Function::Dominant {
        let tonic = key.chord_for_degree(1, ChordSize::Triad).ok()?;
        return Some(ChordSuggestion::new(
            tonic,
            0.9,
            "Tonic resolution to complete a dominant-tonic cadence",
            end,
            0.95,
        ));
    }
    if *penultimate != Function::Dominant {
        let dominant = key.chord_for_degree(5, ChordSize::Triad).ok()?;
        return Some(ChordSuggestion::new(
            dominant,
            0.85,
            "Dominant chord to prepare the final cadence",
            end,
            0.8,
        ));
    }
    None
}

fn alternate_reasoning(function: Function, degree: usize, mode: Mode) -> String {
    let numerals = match mode {
        Mode::Major => &MAJOR_NUMERALS,
        Mode::Minor => &MINOR_NUMERALS,
    };
    let numeral = numerals.get(degree.wrapping_sub(1)).copied().unwrap_or("?");
    let mut text = format!("Stronger {} function using {}", function, numeral);
    match (function, degree) {
        (Function::Tonic, 1) => text.push_str(", the primary tonic gives the strongest resolution"),
        (Function::Tonic, 6) => text.push_str(", the relative chord gives a gentle tonic"),
        (Function::Subdominant, 4) => text.push_str(", the classic subdominant sound"),
        (Function::Subdominant, 2) => text.push_str(", adds sophistication to the subdominant"),
        (Function::Dominant, 5) => text.push_str(", the strongest dominant drive"),
        _ => {}
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(symbols: &[&str], key: &str) -> ChordProgression {
        ChordProgression::from_symbols(symbols, Some(Key::parse(key).unwrap()), None).unwrap()
    }

    #[test]
    fn test_tonic_to_dominant_gets_subdominant_bridge() {
        let p = progression(&["C", "G", "C"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let bridges: Vec<String> = suggestions
            .iter()
            .filter(|s| s.position == Position::InsertAfter(0))
            .map(|s| s.chord.symbol())
            .collect();
        assert_eq!(bridges, vec!["F", "Dm"]);
    }

    #[test]
    fn test_retrograde_gets_tonic_bridge() {
        let p = progression(&["G", "F", "C"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let bridge = suggestions
            .iter()
            .find(|s| s.position == Position::InsertAfter(0))
            .unwrap();
        assert_eq!(bridge.chord.symbol(), "C");
        assert_eq!(bridge.confidence, 0.7);
    }

    #[test]
    fn test_cadence_completion() {
        // Ends on the dominant: resolve to I
        let p = progression(&["C", "F", "G"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let end = suggestions
            .iter()
            .find(|s| s.position == Position::InsertAfter(2))
            .unwrap();
        assert_eq!(end.chord.symbol(), "C");
        assert_eq!(end.confidence, 0.9);

        // No dominant at the end: offer V
        let p = progression(&["C", "Am", "F"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let end = suggestions
            .iter()
            .find(|s| s.position == Position::InsertAfter(2))
            .unwrap();
        assert_eq!(end.chord.symbol(), "G");

        // Already cadences
        let p = progression(&["F", "G", "C"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        assert!(!suggestions.iter().any(|s| s.position == Position::InsertAfter(2)));
    }

    #[test]
    fn test_same_function_alternates() {
        let p = progression(&["Am", "F", "G", "C"], "C major");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let at_zero: Vec<String> = suggestions
            .iter()
            .filter(|s| s.position == Position::Replace(0))
            .map(|s| s.chord.symbol())
            .collect();
        assert!(at_zero.contains(&"C".to_string()));
        for s in &suggestions {
            if s.position.is_replacement() {
                assert!(s.confidence > MIN_ALTERNATE_CONFIDENCE);
            }
        }
    }

    #[test]
    fn test_minor_subdominant_group_includes_six() {
        let p = progression(&["Am", "Dm", "E", "Am"], "A minor");
        let suggestions = TsdMovementStrategy.suggest(&p, None).unwrap();
        let at_iv: Vec<String> = suggestions
            .iter()
            .filter(|s| s.position == Position::Replace(1))
            .map(|s| s.chord.symbol())
            .collect();
        assert!(at_iv.contains(&"F".to_string()));
    }

    #[test]
    fn test_no_key() {
        let p = ChordProgression::from_symbols(&["C", "G"], None, None).unwrap();
        assert!(TsdMovementStrategy.suggest(&p, None).unwrap().is_empty());
    }
}
