// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chromagram chord detection against binary chord-tone profiles.
//!
//! Scoring is sum-of-squared error, so lower is better (the opposite of
//! [`super::chord_detector`]). The chromagram is scaled so its peak bin is 1
//! before comparison, which keeps it on the same footing as the 0/1 profiles.

use serde::Serialize;
use tracing::debug;

use super::events::NoteEvent;
use crate::music::{Chord, Note, Quality};

const SEMITONES: usize = 12;

/// Energy per pitch class, index 0 = C
pub type Chromagram = [f64; SEMITONES];

/// Applied to each bin as the perfect fifth of another bin
///
/// Every bin is the fifth of exactly one other bin, so the dampening lands
/// once on each of the twelve bins.
pub const FIFTH_DAMPING: f64 = 0.8;

/// Chord kinds the chromagram classifier knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromaKind {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
    Major7,
    Minor7,
    Dominant7,
}

impl ChromaKind {
    pub const ALL: [ChromaKind; 9] = [
        ChromaKind::Major,
        ChromaKind::Minor,
        ChromaKind::Diminished,
        ChromaKind::Augmented,
        ChromaKind::Sus2,
        ChromaKind::Sus4,
        ChromaKind::Major7,
        ChromaKind::Minor7,
        ChromaKind::Dominant7,
    ];

    pub fn quality(self) -> Quality {
        match self {
            ChromaKind::Major => Quality::Major,
            ChromaKind::Minor => Quality::Minor,
            ChromaKind::Diminished => Quality::Diminished,
            ChromaKind::Augmented => Quality::Augmented,
            ChromaKind::Sus2 => Quality::Sus2,
            ChromaKind::Sus4 => Quality::Sus4,
            ChromaKind::Major7 => Quality::Major7,
            ChromaKind::Minor7 => Quality::Minor7,
            ChromaKind::Dominant7 => Quality::Dominant7,
        }
    }
}

/// Result of one chromagram classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromaMatch {
    /// `None` for silence ("N")
    pub chord: Option<Chord>,
    /// Squared error of the winning profile
    pub score: f64,
    /// `max(0, 1 - score)`
    pub confidence: f64,
}

impl ChromaMatch {
    fn silence() -> Self {
        Self {
            chord: None,
            score: 0.0,
            confidence: 0.0,
        }
    }

    /// Chord symbol, or "N" when nothing sounded
    pub fn label(&self) -> String {
        self.chord
            .map(|c| c.symbol())
            .unwrap_or_else(|| "N".to_string())
    }
}

#[derive(Debug, Clone, Copy)]
struct Profile {
    kind: ChromaKind,
    root: u8,
    weights: Chromagram,
}

/// Chromagram chord classifier with precomputed profiles
#[derive(Debug, Clone)]
pub struct ChromagramDetector {
    profiles: Vec<Profile>,
}

impl Default for ChromagramDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromagramDetector {
    pub fn new() -> Self {
        let mut profiles = Vec::with_capacity(ChromaKind::ALL.len() * SEMITONES);
        for kind in ChromaKind::ALL {
            for root in 0..SEMITONES as u8 {
                profiles.push(Profile {
                    kind,
                    root,
                    weights: profile(kind, root),
                });
            }
        }
        Self { profiles }
    }

    /// Classify one chromagram
    ///
    /// An all-zero (or non-positive) chromagram is silence. Ties keep the
    /// first profile in kind-then-root order.
    pub fn detect(&self, chroma: &Chromagram) -> ChromaMatch {
        let peak = chroma.iter().copied().fold(0.0f64, f64::max);
        if peak <= 0.0 || !peak.is_finite() {
            return ChromaMatch::silence();
        }
        let processed: Chromagram = chroma.map(|v| v.max(0.0) / peak * FIFTH_DAMPING);

        let mut best: Option<(&Profile, f64)> = None;
        for p in &self.profiles {
            let score = squared_error(&processed, &p.weights);
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((p, score));
            }
        }

        let Some((profile, score)) = best else {
            return ChromaMatch::silence();
        };
        let root = Note::from_pitch_class(profile.root, 4, false);
        let chord = Chord::new(root, profile.kind.quality()).ok();
        let confidence = (1.0 - score).max(0.0);
        debug!(kind = ?profile.kind, root = profile.root, score, "chromagram match");
        ChromaMatch {
            chord,
            score,
            confidence,
        }
    }

    /// Classify the pitch-class content of a set of notes
    pub fn detect_notes(&self, notes: &[Note]) -> ChromaMatch {
        if notes.is_empty() {
            return ChromaMatch::silence();
        }
        self.detect(&chromagram_from_notes(notes))
    }

    pub fn detect_batch(&self, chromagrams: &[Chromagram]) -> Vec<ChromaMatch> {
        chromagrams.iter().map(|c| self.detect(c)).collect()
    }
}

/// Binary chord-tone profile for a kind on a root
pub fn profile(kind: ChromaKind, root: u8) -> Chromagram {
    let mut weights = [0.0; SEMITONES];
    for &interval in kind.quality().intervals() {
        let pc = (root as i32 + interval).rem_euclid(SEMITONES as i32) as usize;
        weights[pc] = 1.0;
    }
    weights
}

/// One count per note in its pitch-class bin
pub fn chromagram_from_notes(notes: &[Note]) -> Chromagram {
    let mut chroma = [0.0; SEMITONES];
    for note in notes {
        chroma[note.pitch_class() as usize] += 1.0;
    }
    chroma
}

/// Duration-weighted chromagram of timed events
pub fn chromagram_from_events(events: &[NoteEvent]) -> Chromagram {
    let mut chroma = [0.0; SEMITONES];
    for event in events {
        chroma[event.pitch_class() as usize] += event.duration();
    }
    chroma
}

fn squared_error(a: &Chromagram, b: &Chromagram) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
