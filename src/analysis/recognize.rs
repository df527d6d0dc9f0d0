// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note events to a structured progression.
//!
//! Events are cut into fixed windows, one chord is detected per window and
//! repeated chords are merged into a single longer entry. The key is detected
//! once over every event.

use tracing::{debug, info};

use super::chord_detector::ChordDetector;
use super::events::{windows, NoteEvent};
use super::key_detector::KeyDetector;
use crate::music::{Chord, ChordEntry, ProgressionDoc};

/// Window length in beats when none is configured
pub const DEFAULT_WINDOW: f64 = 1.0;

/// Detector bundle for recognizing progressions from performances
#[derive(Debug, Clone)]
pub struct Recognizer {
    pub chord_detector: ChordDetector,
    pub key_detector: KeyDetector,
    pub window_size: f64,
    /// Notes sounding less than this inside a window are ignored
    pub min_chord_duration: f64,
}

impl Default for Recognizer {
    fn default() -> Self {
        Self {
            chord_detector: ChordDetector::default(),
            key_detector: KeyDetector::default(),
            window_size: DEFAULT_WINDOW,
            min_chord_duration: 0.0,
        }
    }
}

impl Recognizer {
    pub fn recognize(&self, events: &[NoteEvent]) -> ProgressionDoc {
        let key = if events.is_empty() {
            None
        } else {
            let (key, confidence) = self.key_detector.detect_from_events(events);
            debug!(key = %key, confidence, "recognized key");
            Some(key.to_string())
        };

        let mut entries: Vec<(Chord, f64)> = Vec::new();
        for (start, window_events) in windows(events, self.window_size) {
            let end = start + self.window_size;
            let held: Vec<NoteEvent> = window_events
                .into_iter()
                .filter(|e| overlap(e, start, end) >= self.min_chord_duration)
                .collect();
            let Some(chord) = self.chord_detector.detect_from_events(&held) else {
                continue;
            };
            match entries.last_mut() {
                Some((last, duration)) if *last == chord => *duration += self.window_size,
                _ => entries.push((chord, self.window_size)),
            }
        }

        info!(chords = entries.len(), "recognized progression");
        ProgressionDoc {
            key,
            chords: entries
                .into_iter()
                .map(|(chord, duration)| ChordEntry {
                    symbol: chord.symbol(),
                    duration,
                })
                .collect(),
        }
    }
}

/// Recognize with default detectors and the given window length
pub fn recognize(events: &[NoteEvent], window: f64) -> ProgressionDoc {
    Recognizer {
        window_size: window,
        ..Recognizer::default()
    }
    .recognize(events)
}

fn overlap(event: &NoteEvent, start: f64, end: f64) -> f64 {
    (event.end_time.min(end) - event.start_time.max(start)).max(0.0)
}
