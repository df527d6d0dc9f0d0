// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beam search over per-position chord candidates.

use serde::Serialize;
use tracing::debug;

use super::{functional_transition, melody_clashes, CLASH_PENALTY};
use crate::analysis::{KeyDetector, NoteEvent};
use crate::music::{Chord, ChordProgression, ChordSuggestion, Key, Position};
use crate::suggestions::voice_leading::voice_leading_quality;
use crate::suggestions::SuggestionEngine;

/// Sequences kept after each position when none is configured
pub const DEFAULT_BEAM_WIDTH: usize = 5;

/// Source tag for keeping the chord that was already there
pub const ORIGINAL: &str = "Original";

/// Score used for voice leading and function at the first position
const NEUTRAL: f64 = 0.5;

/// Penalty for taking the same strategy's suggestion twice in a row
const REPETITION_PENALTY: f64 = 0.2;

const CONFIDENCE_WEIGHT: f64 = 0.2;
const VOICE_LEADING_WEIGHT: f64 = 0.3;
const FUNCTION_WEIGHT: f64 = 0.5;

/// The chord chosen at one position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub index: usize,
    pub chord: Chord,
    /// Strategy the chord came from, or `"Original"`
    pub source: String,
    pub confidence: f64,
    pub reasoning: String,
}

impl Choice {
    fn original(index: usize, chord: Chord) -> Self {
        Self {
            index,
            chord,
            source: ORIGINAL.to_string(),
            confidence: 1.0,
            reasoning: "Original chord".to_string(),
        }
    }

    fn suggested(index: usize, suggestion: ChordSuggestion) -> Self {
        Self {
            index,
            chord: suggestion.chord,
            source: suggestion.source,
            confidence: suggestion.confidence,
            reasoning: suggestion.reasoning,
        }
    }

    pub fn is_original(&self) -> bool {
        self.source == ORIGINAL
    }
}

/// Outcome of a reharmonization
#[derive(Debug, Clone)]
pub struct Reharmonization {
    /// Chosen chords with the input's durations
    pub progression: ChordProgression,
    pub choices: Vec<Choice>,
    /// Cumulative score of the chosen sequence
    pub score: f64,
    /// Beam size after each position
    pub trace: Vec<usize>,
}

impl Reharmonization {
    /// Positions where a suggestion replaced the original chord
    pub fn changes(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter().filter(|c| !c.is_original())
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    score: f64,
    choices: Vec<Choice>,
}

/// Bounded-width search for the best-scoring chord sequence
#[derive(Debug)]
pub struct BeamSearch {
    beam_width: usize,
    engine: SuggestionEngine,
}

impl Default for BeamSearch {
    fn default() -> Self {
        Self::new(DEFAULT_BEAM_WIDTH)
    }
}

impl BeamSearch {
    pub fn new(beam_width: usize) -> Self {
        Self {
            beam_width,
            engine: SuggestionEngine::new(),
        }
    }

    /// Use a configured engine for the candidate suggestions
    pub fn with_engine(mut self, engine: SuggestionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    /// Choose one chord per position, keeping the original where nothing
    /// scores better
    ///
    /// `strategies` limits the suggestions considered (empty means all).
    /// Without an explicit or progression key, the key is detected from the
    /// chords. If the beam ever empties, the input comes back unchanged.
    pub fn reharmonize(
        &self,
        progression: &ChordProgression,
        key: Option<&Key>,
        strategies: &[&str],
        melody: &[NoteEvent],
    ) -> Reharmonization {
        let key = match key.or_else(|| progression.key()) {
            Some(key) => key.clone(),
            None => {
                KeyDetector::default()
                    .detect_from_chords(progression.chords(), Some(progression.durations()))
                    .0
            }
        };

        let suggestions = self.engine.suggest(progression, Some(&key), Some(strategies));
        let starts = progression.start_times();

        let mut beam = vec![Candidate {
            score: 0.0,
            choices: Vec::new(),
        }];
        let mut trace = Vec::with_capacity(progression.len());

        for (i, original) in progression.iter().enumerate() {
            let mut options = vec![Choice::original(i, *original)];
            options.extend(
                suggestions
                    .iter()
                    .filter(|s| s.position == Position::Replace(i))
                    .map(|s| Choice::suggested(i, s.clone())),
            );

            let start = starts[i];
            let end = start + progression.durations()[i];

            let mut expanded = Vec::with_capacity(beam.len() * options.len());
            for partial in &beam {
                for option in &options {
                    let step = self.step_score(partial.choices.last(), option, &key, melody, start, end);
                    let mut choices = partial.choices.clone();
                    choices.push(option.clone());
                    expanded.push(Candidate {
                        score: partial.score + step,
                        choices,
                    });
                }
            }

            // Stable, so earlier sequences win ties
            expanded.sort_by(|a, b| b.score.total_cmp(&a.score));
            expanded.truncate(self.beam_width);
            debug!(position = i, options = options.len(), beam = expanded.len(), "beam step");
            trace.push(expanded.len());
            beam = expanded;
            if beam.is_empty() {
                break;
            }
        }

        let best = beam.into_iter().next();
        let chosen = best.and_then(|best| {
            let chords = best.choices.iter().map(|c| c.chord).collect();
            ChordProgression::new(chords, Some(key.clone()), Some(progression.durations().to_vec()))
                .ok()
                .map(|p| (p, best))
        });

        match chosen {
            Some((chosen, best)) => Reharmonization {
                progression: chosen,
                choices: best.choices,
                score: best.score,
                trace,
            },
            None => {
                debug!("beam emptied, keeping the input progression");
                Reharmonization {
                    progression: progression.clone(),
                    choices: progression
                        .iter()
                        .enumerate()
                        .map(|(i, c)| Choice::original(i, *c))
                        .collect(),
                    score: 0.0,
                    trace,
                }
            }
        }
    }

    fn step_score(
        &self,
        previous: Option<&Choice>,
        option: &Choice,
        key: &Key,
        melody: &[NoteEvent],
        start: f64,
        end: f64,
    ) -> f64 {
        let (voice_leading, function) = match previous {
            Some(prev) => (
                voice_leading_quality(&prev.chord, &option.chord),
                functional_transition(key.function_of(&prev.chord), key.function_of(&option.chord)),
            ),
            None => (NEUTRAL, NEUTRAL),
        };
        let clashes = melody_clashes(&option.chord, melody, start, end) as f64;
        let repeated = previous.is_some_and(|prev| !option.is_original() && prev.source == option.source);

        CONFIDENCE_WEIGHT * option.confidence + VOICE_LEADING_WEIGHT * voice_leading + FUNCTION_WEIGHT * function
            - CLASH_PENALTY * clashes
            - if repeated { REPETITION_PENALTY } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAZZ: [&str; 4] = ["SubV7", "BorrowedChord", "ChromaticApproach", "Suspend"];

    fn c_major(symbols: &[&str]) -> ChordProgression {
        ChordProgression::from_symbols(symbols, Some(Key::c_major()), None).unwrap()
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let p = c_major(&["C", "Am", "F", "G"]);
        let search = BeamSearch::new(5);
        let first = search.reharmonize(&p, None, &JAZZ, &[]);
        let second = search.reharmonize(&p, None, &JAZZ, &[]);

        assert_eq!(first.progression.len(), 4);
        assert_eq!(first.trace.len(), 4);
        assert!(first.trace.iter().all(|&size| size <= 5));
        assert_eq!(first.progression.symbols(), second.progression.symbols());
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn test_original_kept_without_pressure() {
        let p = c_major(&["C"]);
        let result = BeamSearch::new(5).reharmonize(&p, None, &["Suspend"], &[]);
        assert_eq!(result.progression.symbols(), vec!["C"]);
        assert!(result.choices[0].is_original());
        assert_eq!(result.changes().count(), 0);
    }

    #[test]
    fn test_melody_clash_forces_substitution() {
        // F over a C triad rubs against E; Csus4 holds F instead
        let p = c_major(&["C"]);
        let melody = vec![NoteEvent::new(65, 0.0, 1.0, 90).unwrap()];
        let result = BeamSearch::new(5).reharmonize(&p, None, &["Suspend"], &melody);
        assert_eq!(result.progression.symbols(), vec!["Csus4"]);
        assert_eq!(result.choices[0].source, "Suspend");
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_zero_width_falls_back_to_input() {
        let p = c_major(&["C", "F", "G", "C"]);
        let result = BeamSearch::new(0).reharmonize(&p, None, &[], &[]);
        assert_eq!(result.progression, p);
        assert_eq!(result.score, 0.0);
        assert!(result.choices.iter().all(Choice::is_original));
    }

    #[test]
    fn test_key_detected_when_missing() {
        let p = ChordProgression::from_symbols(&["C", "F", "G7", "C"], None, None).unwrap();
        let result = BeamSearch::default().reharmonize(&p, None, &[], &[]);
        assert_eq!(result.progression.key(), Some(&Key::c_major()));
        assert_eq!(result.progression.durations(), p.durations());
    }
}
