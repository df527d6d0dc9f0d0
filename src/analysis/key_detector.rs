// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key detection by pitch-class profile correlation.
//!
//! A weighted 12-bin pitch-class histogram is correlated against the 24
//! rotations of a major and a minor reference profile. The profile value for
//! pitch class `pc` under tonic `t` is `profile[(pc - t) mod 12]`. Majors are
//! tried before minors and only a strictly higher correlation replaces the
//! current best.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::NoteEvent;
use crate::error::{Result, TheoryError};
use crate::music::{Chord, Key, KeyRelation, Mode, Note, Quality};

/// Notes per window for [`KeyDetector::stability`]
pub const DEFAULT_STABILITY_WINDOW: usize = 20;

const KRUMHANSL_MAJOR: [f64; 12] = [6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88];
const KRUMHANSL_MINOR: [f64; 12] = [6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17];
const CLASSICAL_MAJOR: [f64; 12] = [6.6, 2.0, 3.5, 2.3, 4.4, 4.1, 2.5, 5.2, 2.4, 3.7, 2.3, 2.9];
const CLASSICAL_MINOR: [f64; 12] = [6.4, 2.7, 3.6, 5.4, 2.5, 3.5, 2.6, 4.8, 4.0, 2.7, 3.4, 3.2];
const FOLK_MAJOR: [f64; 12] = [6.8, 1.5, 3.2, 2.0, 4.2, 4.3, 2.2, 5.5, 2.1, 3.4, 2.0, 2.5];
const FOLK_MINOR: [f64; 12] = [6.5, 2.2, 3.8, 5.8, 2.2, 3.2, 2.2, 5.0, 4.3, 2.4, 3.0, 2.8];

/// Reference profile family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSet {
    #[default]
    Krumhansl,
    Classical,
    Folk,
}

impl ProfileSet {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "krumhansl" | "standard" => Ok(ProfileSet::Krumhansl),
            "classical" => Ok(ProfileSet::Classical),
            "folk" => Ok(ProfileSet::Folk),
            _ => Err(TheoryError::InvalidKey(format!("unknown key profile '{}'", name))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProfileSet::Krumhansl => "krumhansl",
            ProfileSet::Classical => "classical",
            ProfileSet::Folk => "folk",
        }
    }

    fn profile(self, mode: Mode) -> &'static [f64; 12] {
        match (self, mode) {
            (ProfileSet::Krumhansl, Mode::Major) => &KRUMHANSL_MAJOR,
            (ProfileSet::Krumhansl, Mode::Minor) => &KRUMHANSL_MINOR,
            (ProfileSet::Classical, Mode::Major) => &CLASSICAL_MAJOR,
            (ProfileSet::Classical, Mode::Minor) => &CLASSICAL_MINOR,
            (ProfileSet::Folk, Mode::Major) => &FOLK_MAJOR,
            (ProfileSet::Folk, Mode::Minor) => &FOLK_MINOR,
        }
    }
}

/// Relationship report for two keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyComparison {
    pub first: Key,
    pub second: Key,
    pub relation: KeyRelation,
    /// Pitch classes the two scales share
    pub common_notes: usize,
    /// Steps apart on the circle of fifths
    pub distance: u8,
}

/// Profile-correlation key detector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyDetector {
    profiles: ProfileSet,
}

impl KeyDetector {
    pub fn new(profiles: ProfileSet) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> ProfileSet {
        self.profiles
    }

    /// Detect the key of a bag of notes, each optionally weighted
    ///
    /// Missing weights count 1.0. Empty input yields C major with confidence 0.
    pub fn detect_from_notes(&self, notes: &[Note], weights: Option<&[f64]>) -> (Key, f64) {
        if notes.is_empty() {
            return (Key::c_major(), 0.0);
        }
        let histogram = weighted_histogram(notes, weights);
        self.best_key(&histogram)
    }

    /// Detect from timed events weighted by duration and velocity/127
    pub fn detect_from_events(&self, events: &[NoteEvent]) -> (Key, f64) {
        let mut notes = Vec::with_capacity(events.len());
        let mut weights = Vec::with_capacity(events.len());
        for event in events {
            if let Some(note) = event.note() {
                notes.push(note);
                weights.push(event.duration() * event.velocity as f64 / 127.0);
            }
        }
        self.detect_from_notes(&notes, Some(&weights))
    }

    /// Detect from a chord sequence, cross-checked against the dominant root
    ///
    /// Every chord tone is weighted by its chord's duration. When the most
    /// heavily weighted chord root matches the detected tonic the confidence
    /// is raised by 20% (capped at 1), otherwise it is lowered by 10%.
    pub fn detect_from_chords(&self, chords: &[Chord], durations: Option<&[f64]>) -> (Key, f64) {
        if chords.is_empty() {
            return (Key::c_major(), 0.0);
        }
        let duration_of = |i: usize| durations.and_then(|d| d.get(i)).copied().unwrap_or(1.0);

        let mut notes = Vec::new();
        let mut weights = Vec::new();
        let mut root_weights = [0.0f64; 12];
        let mut root_order: Vec<u8> = Vec::new();
        for (i, chord) in chords.iter().enumerate() {
            let duration = duration_of(i);
            for note in chord.notes() {
                notes.push(note);
                weights.push(duration);
            }
            let pc = chord.root().pitch_class();
            if !root_order.contains(&pc) {
                root_order.push(pc);
            }
            root_weights[pc as usize] += duration;
        }

        let (key, confidence) = self.detect_from_notes(&notes, Some(&weights));

        // First-seen root wins ties
        let mut strongest: Option<u8> = None;
        for &pc in &root_order {
            if strongest.map_or(true, |s| root_weights[pc as usize] > root_weights[s as usize]) {
                strongest = Some(pc);
            }
        }

        let combined = if strongest == Some(key.tonic().pitch_class()) {
            (confidence * 1.2).min(1.0)
        } else {
            confidence * 0.9
        };
        debug!(key = %key, confidence = combined, "key from chords");
        (key, combined)
    }

    /// All 24 keys with their confidences, best first
    pub fn ranked_keys(&self, notes: &[Note], weights: Option<&[f64]>) -> Vec<(Key, f64)> {
        if notes.is_empty() {
            return Vec::new();
        }
        let histogram = weighted_histogram(notes, weights);
        let mut ranked: Vec<(Key, f64)> = self
            .correlations(&histogram)
            .into_iter()
            .filter_map(|(key, r)| r.map(|r| (key, confidence_of(r))))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Per-segment keys; an empty segment repeats the previous result
    pub fn detect_modulations(&self, segments: &[Vec<Note>]) -> Vec<(Key, f64)> {
        let mut results: Vec<(Key, f64)> = Vec::with_capacity(segments.len());
        for segment in segments {
            let result = if segment.is_empty() {
                results
                    .last()
                    .cloned()
                    .unwrap_or_else(|| (Key::c_major(), 0.0))
            } else {
                self.detect_from_notes(segment, None)
            };
            results.push(result);
        }
        results
    }

    /// Keys briefly tonicized by dominant-type chords
    ///
    /// A dominant 7th, 9th or 13th whose root falls a fifth (or rises a
    /// fourth) to the next chord tonicizes that next root in the main mode.
    pub fn detect_tonicizations(&self, chords: &[Chord], main_key: &Key) -> Vec<Option<Key>> {
        chords
            .iter()
            .enumerate()
            .map(|(i, chord)| {
                let is_applied_dominant = matches!(
                    chord.quality(),
                    Quality::Dominant7 | Quality::Dominant9 | Quality::Dominant13
                );
                let next = chords.get(i + 1)?;
                if !is_applied_dominant {
                    return None;
                }
                let motion = (next.root().midi() as i32 - chord.root().midi() as i32).rem_euclid(12);
                if motion == 5 || motion == 7 {
                    Some(Key::new(next.root(), main_key.mode()))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Key over a sliding window of notes, keyed by the window's middle index
    ///
    /// Fewer notes than the window yields a single reading at 0.0.
    pub fn stability(&self, notes: &[Note], window: usize) -> Vec<(f64, Key)> {
        if window == 0 || notes.len() < window {
            let (key, _) = self.detect_from_notes(notes, None);
            return vec![(0.0, key)];
        }
        notes
            .windows(window)
            .enumerate()
            .map(|(i, slice)| {
                let (key, _) = self.detect_from_notes(slice, None);
                ((i + window / 2) as f64, key)
            })
            .collect()
    }

    fn correlations(&self, histogram: &[f64; 12]) -> Vec<(Key, Option<f64>)> {
        let mut results = Vec::with_capacity(24);
        for mode in [Mode::Major, Mode::Minor] {
            let profile = self.profiles.profile(mode);
            for tonic in 0..12u8 {
                let mut rotated = [0.0f64; 12];
                for (pc, slot) in rotated.iter_mut().enumerate() {
                    *slot = profile[(pc + 12 - tonic as usize) % 12];
                }
                let r = pearson(histogram, &rotated);
                results.push((Key::from_pitch_class(tonic, mode), r));
            }
        }
        results
    }

    fn best_key(&self, histogram: &[f64; 12]) -> (Key, f64) {
        let mut best: Option<(Key, f64)> = None;
        for (key, r) in self.correlations(histogram) {
            let Some(r) = r else { continue };
            if best.as_ref().map_or(true, |(_, b)| r > *b) {
                best = Some((key, r));
            }
        }
        match best {
            Some((key, r)) => {
                debug!(key = %key, correlation = r, "detected key");
                (key, confidence_of(r))
            }
            None => (Key::c_major(), 0.0),
        }
    }
}

/// Relation, shared pitch classes and circle-of-fifths distance of two keys
pub fn compare_keys(first: &Key, second: &Key) -> KeyComparison {
    KeyComparison {
        first: first.clone(),
        second: second.clone(),
        relation: first.relation_to(second),
        common_notes: first.common_pitch_classes(second),
        distance: first.fifths_distance(second),
    }
}

fn confidence_of(correlation: f64) -> f64 {
    ((correlation + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Weighted pitch-class histogram normalized to sum 1
fn weighted_histogram(notes: &[Note], weights: Option<&[f64]>) -> [f64; 12] {
    let mut histogram = [0.0f64; 12];
    for (i, note) in notes.iter().enumerate() {
        let weight = weights.and_then(|w| w.get(i)).copied().unwrap_or(1.0);
        histogram[note.pitch_class() as usize] += weight;
    }
    let total: f64 = histogram.iter().sum();
    if total > 0.0 {
        for bin in histogram.iter_mut() {
            *bin /= total;
        }
    }
    histogram
}

/// Pearson correlation; `None` when either side has no variance
fn pearson(a: &[f64; 12], b: &[f64; 12]) -> Option<f64> {
    let mean_a = a.iter().sum::<f64>() / 12.0;
    let mean_b = b.iter().sum::<f64>() / 12.0;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let r = cov / denom;
    r.is_finite().then_some(r)
}
