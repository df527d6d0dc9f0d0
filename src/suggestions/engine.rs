// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Runs a list of strategies and merges their suggestions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::{analysis_key, StrategyKind, SuggestionStrategy};
use crate::music::{ChordProgression, ChordSuggestion, Function, Key, Position};

/// Default cap on merged suggestions
pub const DEFAULT_MAX_SUGGESTIONS: usize = 20;

/// Confidence at or above which a suggestion counts as high confidence
pub const DEFAULT_HIGH_CONFIDENCE: f64 = 0.8;

/// Positions with at least this many high-confidence suggestions are flagged
const OVERLOADED_POSITION: usize = 3;

/// Coordinates the suggestion strategies
pub struct SuggestionEngine {
    strategies: Vec<Box<dyn SuggestionStrategy>>,
    max_suggestions: usize,
    high_confidence_threshold: f64,
}

/// Suggestion opportunities at one chord
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub position: usize,
    pub chord: String,
    pub suggestion_count: usize,
    pub max_confidence: f64,
    /// Sorted, without duplicates
    pub strategies: Vec<String>,
}

/// Overview of how much a progression could be reworked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialReport {
    pub total_suggestions: usize,
    pub high_confidence_suggestions: usize,
    /// Suggestion count per strategy
    pub strategy_coverage: BTreeMap<String, usize>,
    pub positions: Vec<PositionReport>,
    pub improvement_areas: Vec<String>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::from_kinds(&StrategyKind::ALL)
    }
}

impl SuggestionEngine {
    /// Engine running every built-in strategy in default order
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over an explicit strategy list, run in the given order
    pub fn with_strategies(strategies: Vec<Box<dyn SuggestionStrategy>>) -> Self {
        Self {
            strategies,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE,
        }
    }

    pub fn from_kinds(kinds: &[StrategyKind]) -> Self {
        Self::with_strategies(kinds.iter().map(|k| k.create()).collect())
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn with_high_confidence_threshold(mut self, threshold: f64) -> Self {
        self.high_confidence_threshold = threshold;
        self
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    pub fn high_confidence_threshold(&self) -> f64 {
        self.high_confidence_threshold
    }

    /// Names of the strategies this engine runs, in order
    pub fn available_strategies(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn strategy_description(&self, name: &str) -> Option<&'static str> {
        StrategyKind::from_name(name).map(|k| k.description())
    }

    /// Merged, de-duplicated suggestions, best first
    ///
    /// `filter` restricts the run to the named strategies; `None` or an
    /// empty list runs all of them. Each suggestion is tagged with its
    /// source. Duplicates by chord symbol and position keep the higher
    /// confidence. A failing strategy is logged and skipped.
    pub fn suggest(
        &self,
        progression: &ChordProgression,
        key: Option<&Key>,
        filter: Option<&[&str]>,
    ) -> Vec<ChordSuggestion> {
        let mut merged = Vec::new();
        for strategy in self.active(filter) {
            if let Some(suggestions) = run(strategy.as_ref(), progression, key) {
                merged.extend(suggestions);
            }
        }

        let mut unique = dedup(merged);
        unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        unique.truncate(self.max_suggestions);
        unique
    }

    /// Suggestions from each strategy separately, best first within each
    ///
    /// A failing strategy maps to an empty list.
    pub fn suggest_by_strategy(
        &self,
        progression: &ChordProgression,
        key: Option<&Key>,
    ) -> Vec<(&'static str, Vec<ChordSuggestion>)> {
        self.strategies
            .iter()
            .map(|strategy| {
                let mut suggestions = run(strategy.as_ref(), progression, key).unwrap_or_default();
                suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                (strategy.name(), suggestions)
            })
            .collect()
    }

    /// Merged suggestions that replace the chord at `index`
    pub fn suggest_for_position(
        &self,
        progression: &ChordProgression,
        index: usize,
        key: Option<&Key>,
        filter: Option<&[&str]>,
    ) -> Vec<ChordSuggestion> {
        self.suggest(progression, key, filter)
            .into_iter()
            .filter(|s| s.position == Position::Replace(index))
            .collect()
    }

    /// Report on where and how strongly the progression invites changes
    pub fn analyze_potential(&self, progression: &ChordProgression, key: Option<&Key>) -> PotentialReport {
        let suggestions = self.suggest(progression, key, None);
        let high: Vec<&ChordSuggestion> = suggestions
            .iter()
            .filter(|s| s.confidence >= self.high_confidence_threshold)
            .collect();

        let mut strategy_coverage = BTreeMap::new();
        for s in &suggestions {
            *strategy_coverage.entry(s.source.clone()).or_insert(0) += 1;
        }

        let positions = progression
            .iter()
            .enumerate()
            .map(|(i, chord)| {
                let at: Vec<&ChordSuggestion> = suggestions
                    .iter()
                    .filter(|s| s.position == Position::Replace(i))
                    .collect();
                let mut strategies: Vec<String> = at.iter().map(|s| s.source.clone()).collect();
                strategies.sort();
                strategies.dedup();
                PositionReport {
                    position: i,
                    chord: chord.symbol(),
                    suggestion_count: at.len(),
                    max_confidence: at.iter().map(|s| s.confidence).fold(0.0, f64::max),
                    strategies,
                }
            })
            .collect();

        PotentialReport {
            total_suggestions: suggestions.len(),
            high_confidence_suggestions: high.len(),
            strategy_coverage,
            positions,
            improvement_areas: improvement_areas(progression, &high, analysis_key(progression, key)),
        }
    }

    fn active<'a>(&'a self, filter: Option<&'a [&'a str]>) -> impl Iterator<Item = &'a Box<dyn SuggestionStrategy>> {
        self.strategies.iter().filter(move |s| match filter {
            Some(names) if !names.is_empty() => names.contains(&s.name()),
            _ => true,
        })
    }
}

impl fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("strategies", &self.available_strategies())
            .field("max_suggestions", &self.max_suggestions)
            .field("high_confidence_threshold", &self.high_confidence_threshold)
            .finish()
    }
}

/// Run one strategy, tagging its output; `None` if it failed
fn run(strategy: &dyn SuggestionStrategy, progression: &ChordProgression, key: Option<&Key>) -> Option<Vec<ChordSuggestion>> {
    match strategy.suggest(progression, key) {
        Ok(suggestions) => {
            debug!(strategy = strategy.name(), count = suggestions.len(), "strategy finished");
            Some(
                suggestions
                    .into_iter()
                    .map(|s| s.with_source(strategy.name()))
                    .collect(),
            )
        }
        Err(err) => {
            warn!(strategy = strategy.name(), error = %err, "strategy failed, skipping");
            None
        }
    }
}

/// Keep one suggestion per (symbol, position), the most confident, in
/// first-seen order
fn dedup(suggestions: Vec<ChordSuggestion>) -> Vec<ChordSuggestion> {
    let mut seen: HashMap<(String, Position), usize> = HashMap::new();
    let mut unique: Vec<ChordSuggestion> = Vec::new();
    for suggestion in suggestions {
        let key = (suggestion.chord.symbol(), suggestion.position);
        match seen.get(&key) {
            Some(&i) => {
                if suggestion.confidence > unique[i].confidence {
                    unique[i] = suggestion;
                }
            }
            None => {
                seen.insert(key, unique.len());
                unique.push(suggestion);
            }
        }
    }
    unique
}

fn improvement_areas(progression: &ChordProgression, high: &[&ChordSuggestion], key: Option<&Key>) -> Vec<String> {
    let mut areas = Vec::new();

    let mut per_position: BTreeMap<usize, usize> = BTreeMap::new();
    for s in high {
        *per_position.entry(s.position.index()).or_insert(0) += 1;
    }
    for (position, count) in per_position {
        if count >= OVERLOADED_POSITION {
            let symbol = progression
                .get(position)
                .map(|c| c.symbol())
                .unwrap_or_else(|| "?".to_string());
            areas.push(format!(
                "Position {} ({}) has {} high-confidence alternatives",
                position, symbol, count
            ));
        }
    }

    if let Some(key) = key {
        let functions: Vec<Function> = progression.iter().map(|c| key.function_of(c)).collect();
        let unknown = functions.iter().filter(|f| **f == Function::Unknown).count();
        if unknown * 2 > functions.len() {
            areas.push("Many non-diatonic chords, consider re-analyzing the key".to_string());
        }
        if let [.., penultimate, last] = functions.as_slice() {
            if (*penultimate, *last) != (Function::Dominant, Function::Tonic) {
                areas.push("Progression lacks a strong cadential resolution".to_string());
            }
        }
    }
    areas
}
