// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Modal interchange: chords borrowed from the parallel mode.

use super::voice_leading::voice_leading_quality;
use super::{analysis_key, build, degree_of, function_at, is_cadential, shifted_root, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSize, ChordSuggestion, Function, Key, Mode, Position, Quality};

const NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii"];

/// Suggests the same-degree chord from the parallel key, plus ♭VII and ♭III
/// in major keys
#[derive(Debug, Default, Clone, Copy)]
pub struct BorrowedChordStrategy;

impl SuggestionStrategy for BorrowedChordStrategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let Some(key) = analysis_key(progression, key) else {
            return Ok(Vec::new());
        };

        let mut suggestions = Vec::new();
        for (i, chord) in progression.iter().enumerate() {
            if !is_borrowing_position(progression, i, key) {
                continue;
            }
            let Some(degree) = degree_of(chord, key) else {
                continue;
            };
            suggestions.extend(parallel_borrowing(progression, i, chord, degree, key));
            suggestions.extend(modal_borrowing(i, chord, degree, key));
        }
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "BorrowedChord"
    }
}

/// Diatonic chords in a cadence, with tonic or subdominant function, or
/// right before a dominant
fn is_borrowing_position(progression: &ChordProgression, index: usize, key: &Key) -> bool {
    let Some(chord) = progression.get(index) else {
        return false;
    };
    let analysis = key.analyze_chord(chord);
    if !analysis.is_diatonic {
        return false;
    }
    is_cadential(progression, index)
        || matches!(analysis.function, Function::Tonic | Function::Subdominant)
        || function_at(progression, index + 1, key) == Some(Function::Dominant)
}

fn parallel_borrowing(
    progression: &ChordProgression,
    index: usize,
    current: &Chord,
    degree: usize,
    key: &Key,
) -> Option<ChordSuggestion> {
    let parallel = key.parallel();
    let borrowed = parallel.chord_for_degree(degree, ChordSize::Triad).ok()?;
    if borrowed.symbol() == current.symbol() {
        return None;
    }

    let vl = voice_leading_quality(current, &borrowed);
    let mut confidence = 0.7;
    if key.mode() == Mode::Minor {
        confidence += 0.1;
    }
    match key.function_of(current) {
        Function::Subdominant => confidence += 0.1,
        Function::Tonic if index > 0 => confidence += 0.05,
        _ => {}
    }
    confidence += vl * 0.15;
    if is_cadential(progression, index) {
        confidence += 0.1;
    }

    Some(ChordSuggestion::new(
        borrowed,
        confidence.min(0.95),
        parallel_reasoning(degree, key.mode()),
        Position::Replace(index),
        vl,
    ))
}

/// ♭VII from Mixolydian at degree 7 and ♭III from natural minor at degree 3
fn modal_borrowing(index: usize, current: &Chord, degree: usize, key: &Key) -> Option<ChordSuggestion> {
    if key.mode() != Mode::Major {
        return None;
    }
    let (semitones, base, reasoning) = match degree {
        7 => (10, 0.8, "♭VII borrowed from Mixolydian, common in popular music"),
        3 => (3, 0.65, "♭III borrowed from natural minor for modal color"),
        _ => return None,
    };
    let root = shifted_root(key.tonic(), semitones, true)?;
    let borrowed = build(root, Quality::Major)?;
    let vl = voice_leading_quality(current, &borrowed);
    let confidence = (base + vl * 0.1).min(0.9);
    Some(ChordSuggestion::new(
        borrowed,
        confidence,
        reasoning,
        Position::Replace(index),
        vl,
    ))
}

fn parallel_reasoning(degree: usize, mode: Mode) -> String {
    let numeral = NUMERALS.get(degree.wrapping_sub(1)).copied().unwrap_or("?");
    match (mode, degree) {
        (Mode::Major, 3) => "Borrowed ♭III from the parallel minor for a darker color".to_string(),
        (Mode::Major, 4) => "Borrowed iv from the parallel minor for plagal color".to_string(),
        (Mode::Major, 6) => "Borrowed ♭VI from the parallel minor, sets up a deceptive move".to_string(),
        (Mode::Major, 7) => "Borrowed ♭VII from the parallel minor".to_string(),
        (Mode::Major, _) => format!("Borrowed {} from the parallel minor", numeral),
        (Mode::Minor, 1) => "Picardy third: major I from the parallel major".to_string(),
        (Mode::Minor, 4) => "Borrowed IV from the parallel major brightens the subdominant".to_string(),
        (Mode::Minor, 5) => "Borrowed major V from the parallel major for a stronger dominant".to_string(),
        (Mode::Minor, _) => format!("Borrowed {} from the parallel major", numeral),
    }
}
