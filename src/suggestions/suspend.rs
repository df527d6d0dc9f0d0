// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Suspended chords and suspension-resolution pairs.
//!
//! This is the one strategy that works without a key; the key only adds a
//! bonus for chords in dominant or subdominant function.

use super::voice_leading::voice_leading_quality;
use super::{analysis_key, build, SuggestionStrategy};
use crate::error::Result;
use crate::music::{Chord, ChordProgression, ChordSuggestion, Function, Key, Position, Quality};

#[derive(Debug, Default, Clone, Copy)]
pub struct SuspendStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Suspension {
    Second,
    Fourth,
}

impl Suspension {
    fn quality(self) -> Quality {
        match self {
            Suspension::Second => Quality::Sus2,
            Suspension::Fourth => Quality::Sus4,
        }
    }

    fn base(self) -> f64 {
        match self {
            Suspension::Second => 0.75,
            Suspension::Fourth => 0.8,
        }
    }

    fn applies_to(self, quality: Quality) -> bool {
        match self {
            Suspension::Second => matches!(
                quality,
                Quality::Major | Quality::Minor | Quality::Major7 | Quality::Minor7
            ),
            Suspension::Fourth => matches!(
                quality,
                Quality::Major
                    | Quality::Minor
                    | Quality::Dominant7
                    | Quality::Major7
                    | Quality::Minor7
                    | Quality::Dominant9
                    | Quality::Major9
                    | Quality::Minor9
            ),
        }
    }
}

impl SuggestionStrategy for SuspendStrategy {
    fn suggest(&self, progression: &ChordProgression, key: Option<&Key>) -> Result<Vec<ChordSuggestion>> {
        let key = analysis_key(progression, key);

        let mut suggestions = Vec::new();
        for (i, chord) in progression.iter().enumerate() {
            if !is_candidate(chord.quality()) {
                continue;
            }
            for suspension in [Suspension::Second, Suspension::Fourth] {
                if let Some(s) = suspend(chord, suspension, key, i) {
                    suggestions.push(s);
                }
            }
        }

        for (i, pair) in progression.chords().windows(2).enumerate() {
            if let Some(s) = resolving_suspension(&pair[0], &pair[1], i) {
                suggestions.push(s);
            }
        }
        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        "Suspend"
    }
}

/// Triads, dominants and the common sevenths
fn is_candidate(quality: Quality) -> bool {
    matches!(
        quality,
        Quality::Major | Quality::Minor | Quality::Major7 | Quality::Minor7
    ) || quality.is_dominant_family()
}

fn suspend(chord: &Chord, suspension: Suspension, key: Option<&Key>, index: usize) -> Option<ChordSuggestion> {
    if !suspension.applies_to(chord.quality()) {
        return None;
    }
    let suspended = build(chord.root(), suspension.quality())?.set_bass(chord.bass());
    let function = key.map(|k| k.function_of(chord));

    let strong_sus4 = suspension == Suspension::Fourth
        && matches!(chord.quality(), Quality::Dominant7 | Quality::Major);
    let mut confidence = suspension.base();
    if matches!(function, Some(Function::Dominant | Function::Subdominant)) {
        confidence += 0.15;
    }
    if strong_sus4 {
        confidence += 0.1;
    }
    if matches!(chord.quality(), Quality::Major | Quality::Minor) {
        confidence += 0.05;
    }
    confidence = confidence.min(0.95);
    // sus4 over a dominant or major triad gets a second push
    if strong_sus4 {
        confidence = (confidence + 0.1).min(0.95);
    }

    Some(ChordSuggestion::new(
        suspended,
        confidence,
        reasoning(chord, suspension, function),
        Position::Replace(index),
        voice_leading_quality(chord, &suspended),
    ))
}

/// Suspend the first of two same-root chords so it resolves into the
/// second, which must be a plain major or minor triad
fn resolving_suspension(first: &Chord, second: &Chord, index: usize) -> Option<ChordSuggestion> {
    if first.root().pitch_class() != second.root().pitch_class() {
        return None;
    }
    if !matches!(second.quality(), Quality::Major | Quality::Minor) {
        return None;
    }
    let quality = if first.quality() != Quality::Sus4 {
        Quality::Sus4
    } else {
        Quality::Sus2
    };
    let suspended = build(first.root(), quality)?.set_bass(first.bass());
    Some(ChordSuggestion::new(
        suspended,
        0.85,
        format!(
            "Suspension-resolution pattern: {} → {} with smooth voice leading",
            suspended.symbol(),
            second.symbol()
        ),
        Position::Replace(index),
        0.9,
    ))
}

fn reasoning(chord: &Chord, suspension: Suspension, function: Option<Function>) -> String {
    let mut text = match suspension {
        Suspension::Second => format!(
            "Sus2 suspension of {} for melodic tension and open color",
            chord.symbol()
        ),
        Suspension::Fourth => format!(
            "Sus4 suspension of {} creating tension that resolves to the third",
            chord.symbol()
        ),
    };
    match function {
        Some(Function::Dominant) => text.push_str(", particularly effective on dominant chords"),
        Some(Function::Tonic) => text.push_str(", adds color to tonic harmony"),
        _ => {}
    }
    text
}
