// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timed note events and helpers for slicing them.
//!
//! Events arrive from a transcription collaborator with times in beats.
//! Everything here is pure: inputs are borrowed and new vectors returned.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TheoryError};
use crate::music::Note;

/// Default tolerance in beats for treating onsets as simultaneous
pub const DEFAULT_GROUP_TOLERANCE: f64 = 0.1;

/// A sounded note with start and end time in beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    /// MIDI pitch (0-127)
    #[serde(rename = "midiPitch")]
    pub pitch: u8,
    pub start_time: f64,
    pub end_time: f64,
    /// Velocity (0-127)
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_velocity() -> u8 {
    64
}

impl NoteEvent {
    /// Create a validated event
    pub fn new(pitch: u8, start_time: f64, end_time: f64, velocity: u8) -> Result<Self> {
        let event = Self {
            pitch,
            start_time,
            end_time,
            velocity,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check ranges and timing; deserialized events should be validated
    pub fn validate(&self) -> Result<()> {
        if self.pitch > 127 {
            return Err(TheoryError::MidiOutOfRange(self.pitch as i32));
        }
        if self.velocity > 127 {
            return Err(TheoryError::InvalidEvent(format!(
                "velocity {} outside 0..=127",
                self.velocity
            )));
        }
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(TheoryError::InvalidEvent("non-finite time".to_string()));
        }
        if self.end_time < self.start_time {
            return Err(TheoryError::InvalidEvent(format!(
                "ends at {} before it starts at {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// The event's pitch as a sharp-spelled note
    pub fn note(&self) -> Option<Note> {
        Note::from_midi(self.pitch as i32).ok()
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch % 12
    }

    /// Whether the event sounds at any point in `[start, end)`
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start_time < end && self.end_time > start
    }
}

fn sorted_by_start(events: &[NoteEvent]) -> Vec<NoteEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    sorted
}

/// Group events whose onsets fall within `tolerance` of a group's first onset
pub fn group_simultaneous(events: &[NoteEvent], tolerance: f64) -> Vec<Vec<NoteEvent>> {
    let mut groups: Vec<Vec<NoteEvent>> = Vec::new();
    let mut anchor = f64::NEG_INFINITY;

    for event in sorted_by_start(events) {
        match groups.last_mut() {
            Some(group) if (event.start_time - anchor).abs() <= tolerance => group.push(event),
            _ => {
                anchor = event.start_time;
                groups.push(vec![event]);
            }
        }
    }
    groups
}

/// Highest note of each simultaneous group
pub fn melody_line(events: &[NoteEvent]) -> Vec<NoteEvent> {
    group_simultaneous(events, DEFAULT_GROUP_TOLERANCE)
        .into_iter()
        .filter_map(|group| group.into_iter().max_by_key(|e| e.pitch))
        .collect()
}

/// Lowest note of each simultaneous group
pub fn bass_line(events: &[NoteEvent]) -> Vec<NoteEvent> {
    group_simultaneous(events, DEFAULT_GROUP_TOLERANCE)
        .into_iter()
        .filter_map(|group| group.into_iter().min_by_key(|e| e.pitch))
        .collect()
}

/// Events sounding at `time` (start inclusive, end exclusive)
pub fn active_at(events: &[NoteEvent], time: f64) -> Vec<NoteEvent> {
    events
        .iter()
        .filter(|e| e.start_time <= time && time < e.end_time)
        .copied()
        .collect()
}

/// Fixed-size windows from the first onset to the last release
///
/// Returns `(window_start, overlapping_events)` for every non-empty window.
pub fn windows(events: &[NoteEvent], size: f64) -> Vec<(f64, Vec<NoteEvent>)> {
    if events.is_empty() || size <= 0.0 {
        return Vec::new();
    }
    let start = events.iter().map(|e| e.start_time).fold(f64::INFINITY, f64::min);
    let end = events.iter().map(|e| e.end_time).fold(f64::NEG_INFINITY, f64::max);

    let mut result = Vec::new();
    let mut index = 0u32;
    loop {
        let window_start = start + index as f64 * size;
        if window_start >= end {
            break;
        }
        let window_end = window_start + size;
        let inside: Vec<NoteEvent> = events
            .iter()
            .filter(|e| e.overlaps(window_start, window_end))
            .copied()
            .collect();
        if !inside.is_empty() {
            result.push((window_start, inside));
        }
        index += 1;
    }
    result
}

/// Snap onsets to a grid; durations round to the grid with a one-step minimum
pub fn quantize(events: &[NoteEvent], grid: f64) -> Vec<NoteEvent> {
    if grid <= 0.0 {
        return events.to_vec();
    }
    events
        .iter()
        .map(|e| {
            let start = (e.start_time / grid).round() * grid;
            let duration = ((e.duration() / grid).round() * grid).max(grid);
            NoteEvent {
                start_time: start,
                end_time: start + duration,
                ..*e
            }
        })
        .collect()
}

/// Occurrence count of each pitch class
pub fn pitch_class_histogram(events: &[NoteEvent]) -> [u32; 12] {
    let mut histogram = [0u32; 12];
    for event in events {
        histogram[event.pitch_class() as usize] += 1;
    }
    histogram
}

/// Notes for all events, skipping any outside the MIDI range
pub fn notes_of(events: &[NoteEvent]) -> Vec<Note> {
    events.iter().filter_map(NoteEvent::note).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(pitch: u8, start: f64, end: f64) -> NoteEvent {
        NoteEvent::new(pitch, start, end, 100).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(NoteEvent::new(128, 0.0, 1.0, 64).is_err());
        assert!(NoteEvent::new(60, 0.0, 1.0, 200).is_err());
        assert!(NoteEvent::new(60, 2.0, 1.0, 64).is_err());
        assert!(NoteEvent::new(60, f64::NAN, 1.0, 64).is_err());
        assert_eq!(ev(60, 0.5, 2.0).duration(), 1.5);
    }

    #[test]
    fn test_group_simultaneous() {
        let events = vec![ev(64, 0.05, 1.0), ev(60, 0.0, 1.0), ev(67, 1.0, 2.0), ev(72, 1.08, 2.0)];
        let groups = group_simultaneous(&events, 0.1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].pitch, 60);
        assert_eq!(groups[1].len(), 2);
        assert!(group_simultaneous(&[], 0.1).is_empty());
    }

    #[test]
    fn test_melody_and_bass_lines() {
        let events = vec![ev(60, 0.0, 1.0), ev(72, 0.0, 1.0), ev(55, 1.0, 2.0), ev(67, 1.0, 2.0)];
        let melody: Vec<u8> = melody_line(&events).iter().map(|e| e.pitch).collect();
        let bass: Vec<u8> = bass_line(&events).iter().map(|e| e.pitch).collect();
        assert_eq!(melody, vec![72, 67]);
        assert_eq!(bass, vec![60, 55]);
    }

    #[test]
    fn test_active_at() {
        let events = vec![ev(60, 0.0, 1.0), ev(64, 0.5, 2.0)];
        assert_eq!(active_at(&events, 0.75).len(), 2);
        assert_eq!(active_at(&events, 1.0).len(), 1);
        assert!(active_at(&events, 2.0).is_empty());
    }

    #[test]
    fn test_windows_skip_empty() {
        let events = vec![ev(60, 0.0, 1.0), ev(62, 3.0, 4.0)];
        let w = windows(&events, 1.0);
        let starts: Vec<f64> = w.iter().map(|(t, _)| *t).collect();
        assert_eq!(starts, vec![0.0, 3.0]);
        assert!(windows(&events, 0.0).is_empty());
    }

    #[test]
    fn test_quantize() {
        let events = vec![ev(60, 0.13, 0.2)];
        let q = quantize(&events, 0.25);
        assert_eq!(q[0].start_time, 0.25);
        assert_eq!(q[0].duration(), 0.25);
    }

    #[test]
    fn test_histogram() {
        let events = vec![ev(60, 0.0, 1.0), ev(72, 1.0, 2.0), ev(67, 0.0, 1.0)];
        let h = pitch_class_histogram(&events);
        assert_eq!(h[0], 2);
        assert_eq!(h[7], 1);
        assert_eq!(h.iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_serde_field_names() {
        let json = r#"{"midiPitch": 60, "startTime": 0.0, "endTime": 1.5, "velocity": 90}"#;
        let event: NoteEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.pitch, 60);
        assert_eq!(event.end_time, 1.5);
    }
}
