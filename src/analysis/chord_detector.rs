// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Template-matching chord detection.
//!
//! Every present pitch class is tried as a root against every quality in the
//! catalog. The score rewards template coverage, a root in the bass and the
//! presence of a third and fifth, and penalizes notes outside the template.
//! Roots are tried in ascending pitch-class order and qualities in catalog
//! order; only a strictly higher score replaces the current best, which fixes
//! how ties resolve.

use serde::Serialize;
use tracing::debug;

use super::events::NoteEvent;
use crate::music::{Chord, Interval, Note, PitchClassSet, Quality};

/// Best score must exceed this for a chord to be reported
pub const ACCEPT_THRESHOLD: f64 = 0.5;

/// Template-matching chord detector
#[derive(Debug, Clone, PartialEq)]
pub struct ChordDetector {
    /// Fewest distinct pitch classes that can form a chord
    pub min_notes: usize,
    /// Scales the root-in-bass bonus; 2.0 gives a bonus of 0.2
    pub bass_weight: f64,
}

impl Default for ChordDetector {
    fn default() -> Self {
        Self {
            min_notes: 2,
            bass_weight: 2.0,
        }
    }
}

/// Complexity summary of a chord
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordComplexity {
    pub num_notes: usize,
    pub has_extensions: bool,
    pub has_alterations: bool,
    pub score: f64,
}

/// Root-motion category between two chords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    Static,
    Chromatic,
    Stepwise,
    FifthMotion,
    ThirdMotion,
    Leap,
}

/// Smoothness judged by common tones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionQuality {
    Smooth,
    Moderate,
    Rough,
}

/// Voice-leading summary between two chords
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceLeadingMotion {
    pub root_motion: i32,
    pub common_tones: Vec<u8>,
    pub motion_type: MotionType,
    pub quality: MotionQuality,
}

impl ChordDetector {
    pub fn new(min_notes: usize, bass_weight: f64) -> Self {
        Self {
            min_notes,
            bass_weight,
        }
    }

    /// Detect a chord from notes, with an optional explicit bass for slash chords
    ///
    /// Returns `None` when there are too few distinct pitch classes or no
    /// template scores above [`ACCEPT_THRESHOLD`].
    pub fn detect(&self, notes: &[Note], bass: Option<Note>) -> Option<Chord> {
        self.detect_scored(notes, bass).map(|(chord, _)| chord)
    }

    /// Like [`Self::detect`], also returning the winning score
    pub fn detect_scored(&self, notes: &[Note], bass: Option<Note>) -> Option<(Chord, f64)> {
        if notes.len() < self.min_notes {
            return None;
        }
        let present: PitchClassSet = notes.iter().map(|n| n.pitch_class()).collect();
        if present.len() < self.min_notes {
            return None;
        }
        let lowest_pc = notes.iter().min().map(|n| n.pitch_class());

        let mut best: Option<(u8, Quality, f64)> = None;
        for root in present.iter() {
            let normalized = present.transpose(-(root as i32));
            for quality in Quality::ALL {
                let score = self.score(normalized, quality, lowest_pc == Some(root));
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((root, quality, score));
                }
            }
        }

        let (root_pc, quality, score) = best?;
        if score <= ACCEPT_THRESHOLD {
            debug!(score, "no chord above threshold");
            return None;
        }

        let root = Note::from_pitch_class(root_pc, 4, false);
        let chord = Chord::new(root, quality).ok()?;
        let chord = match bass {
            Some(b) if b.pitch_class() != root_pc => chord.set_bass(b),
            _ => chord,
        };
        debug!(chord = %chord, score, "detected chord");
        Some((chord, score))
    }

    /// Score one root/quality hypothesis against root-relative pitch classes
    pub fn score(&self, normalized: PitchClassSet, quality: Quality, root_in_bass: bool) -> f64 {
        let template = quality.template();
        if template.is_empty() || normalized.is_empty() {
            return 0.0;
        }

        let coverage = template.intersection(normalized).len() as f64 / template.len() as f64;
        let extra_ratio = normalized.difference(template).len() as f64 / normalized.len() as f64;
        let bass_bonus = if root_in_bass { 0.1 * self.bass_weight } else { 0.0 };

        let mut essential = 0.0;
        let template_has_third = template.contains(3) || template.contains(4);
        if template_has_third && (normalized.contains(3) || normalized.contains(4)) {
            essential += 0.1;
        }
        if template.contains(7) && normalized.contains(7) {
            essential += 0.1;
        }

        (coverage - 0.5 * extra_ratio + bass_bonus + essential).max(0.0)
    }

    /// Detect from timed events; the lowest pitch is the bass
    pub fn detect_from_events(&self, events: &[NoteEvent]) -> Option<Chord> {
        if events.len() < self.min_notes {
            return None;
        }
        let notes: Vec<Note> = events.iter().filter_map(NoteEvent::note).collect();
        let bass = notes.iter().min().copied();
        self.detect(&notes, bass)
    }

    /// Detect one chord per group, ignoring notes shorter than `min_duration`
    pub fn detect_sequence(&self, groups: &[Vec<NoteEvent>], min_duration: f64) -> Vec<Option<Chord>> {
        groups
            .iter()
            .map(|group| {
                let held: Vec<NoteEvent> = group
                    .iter()
                    .filter(|e| e.duration() >= min_duration)
                    .copied()
                    .collect();
                if held.len() >= self.min_notes {
                    self.detect_from_events(&held)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Slash-chord readings of the same chord tones over other bass notes
    pub fn alternatives(&self, chord: &Chord) -> Vec<Chord> {
        let notes = chord.notes();
        let mut alternatives: Vec<Chord> = Vec::new();
        for &note in &notes {
            if note.pitch_class() == chord.root().pitch_class() {
                continue;
            }
            if let Some(alt) = self.detect(&notes, Some(note)) {
                if alt != *chord && !alternatives.contains(&alt) {
                    alternatives.push(alt);
                }
            }
        }
        alternatives
    }
}

/// Score extensions, alterations, sevenths, dim/aug colour and slash basses
pub fn complexity(chord: &Chord) -> ChordComplexity {
    let name = chord.quality().name();
    let has_extensions = ["9", "11", "13"].iter().any(|e| name.contains(e));
    let has_alterations = ["b5", "#5", "b9", "#9", "#11", "b13"]
        .iter()
        .any(|a| name.contains(a));

    let mut score = 0.0;
    if has_extensions {
        score += 1.0;
    }
    if has_alterations {
        score += 2.0;
    }
    if name.contains('7') {
        score += 0.5;
    }
    if matches!(
        chord.quality(),
        Quality::Diminished | Quality::Augmented | Quality::Diminished7
    ) {
        score += 1.0;
    }
    if chord.is_slash() {
        score += 1.0;
    }

    ChordComplexity {
        num_notes: chord.notes().len(),
        has_extensions,
        has_alterations,
        score,
    }
}

/// Which chord tone the lowest voiced note is; 0 when it is not a chord tone
pub fn inversion_of(chord: &Chord, voicing: &[Note]) -> usize {
    let Some(bass) = voicing.iter().min() else {
        return 0;
    };
    chord
        .notes()
        .iter()
        .position(|n| n.pitch_class() == bass.pitch_class())
        .unwrap_or(0)
}

/// Root motion and common tones between two chords
pub fn voice_leading_motion(from: &Chord, to: &Chord) -> VoiceLeadingMotion {
    let root_motion = Interval::between(from.root(), to.root());
    let common: Vec<u8> = from.pitch_classes().intersection(to.pitch_classes()).iter().collect();

    let motion_type = match root_motion.simple_semitones() {
        0 => MotionType::Static,
        1 | 11 => MotionType::Chromatic,
        2 | 10 => MotionType::Stepwise,
        5 | 7 => MotionType::FifthMotion,
        4 | 8 => MotionType::ThirdMotion,
        _ => MotionType::Leap,
    };
    let quality = match common.len() {
        0 => MotionQuality::Rough,
        1 => MotionQuality::Moderate,
        _ => MotionQuality::Smooth,
    };

    VoiceLeadingMotion {
        root_motion: root_motion.semitones(),
        common_tones: common,
        motion_type,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(names: &[&str]) -> Vec<Note> {
        names.iter().map(|n| Note::parse(n).unwrap()).collect()
    }

    fn detect(names: &[&str]) -> Option<String> {
        ChordDetector::default()
            .detect(&notes(names), None)
            .map(|c| c.symbol())
    }

    #[test]
    fn test_detects_basic_chords() {
        assert_eq!(detect(&["C4", "E4", "G4"]).as_deref(), Some("C"));
        assert_eq!(detect(&["A4", "C5", "E5"]).as_deref(), Some("Am"));
        assert_eq!(detect(&["G4", "B4", "D5", "F5"]).as_deref(), Some("G7"));
        assert_eq!(detect(&["D4", "F4", "A4", "C5"]).as_deref(), Some("Dm7"));
    }

    #[test]
    fn test_single_note_is_no_chord() {
        assert_eq!(detect(&["C4"]), None);
        assert_eq!(detect(&["C4", "C5"]), None);
        assert_eq!(detect(&[]), None);
    }

    #[test]
    fn test_detects_inverted_triad() {
        // E in the bass still reads as C major
        assert_eq!(detect(&["E3", "G3", "C4"]).as_deref(), Some("C"));
    }

    #[test]
    fn test_explicit_bass_gives_slash_chord() {
        let detector = ChordDetector::default();
        let chord = detector
            .detect(&notes(&["C4", "E4", "G4"]), Some(Note::parse("E3").unwrap()))
            .unwrap();
        assert_eq!(chord.symbol(), "C/E");
    }

    #[test]
    fn test_deterministic_tie_break() {
        // C6 and Am7 share pitch classes; ascending roots and strict improvement
        // must give the same answer every run
        let first = detect(&["C4", "E4", "G4", "A4"]);
        for _ in 0..10 {
            assert_eq!(detect(&["C4", "E4", "G4", "A4"]), first);
        }
        assert!(first.is_some());
    }

    #[test]
    fn test_score_components() {
        let detector = ChordDetector::default();
        let c_major: PitchClassSet = [0u8, 4, 7].into_iter().collect();
        let score = detector.score(c_major, Quality::Major, true);
        assert!((score - 1.4).abs() < 1e-9);
        let score = detector.score(c_major, Quality::Major, false);
        assert!((score - 1.2).abs() < 1e-9);
        let score = detector.score(c_major, Quality::Diminished7, false);
        assert!(score >= 0.0);
    }

    #[test]
    fn test_detect_from_events() {
        let events = vec![
            NoteEvent::new(43, 0.0, 1.0, 90).unwrap(),
            NoteEvent::new(59, 0.0, 1.0, 90).unwrap(),
            NoteEvent::new(62, 0.0, 1.0, 90).unwrap(),
            NoteEvent::new(65, 0.0, 1.0, 90).unwrap(),
        ];
        let chord = ChordDetector::default().detect_from_events(&events).unwrap();
        assert_eq!(chord.symbol(), "G7");
    }

    #[test]
    fn test_detect_sequence_filters_short_notes() {
        let long = |p| NoteEvent::new(p, 0.0, 1.0, 90).unwrap();
        let short = |p| NoteEvent::new(p, 0.0, 0.2, 90).unwrap();
        let groups = vec![vec![long(60), long(64), long(67)], vec![long(60), short(64), short(67)]];
        let result = ChordDetector::default().detect_sequence(&groups, 0.5);
        assert_eq!(result[0].map(|c| c.symbol()).as_deref(), Some("C"));
        assert_eq!(result[1], None);
    }

    #[test]
    fn test_complexity() {
        let plain = complexity(&Chord::from_symbol("C").unwrap());
        assert_eq!(plain.score, 0.0);
        let altered = complexity(&Chord::from_symbol("G7b9").unwrap());
        assert!(altered.has_alterations);
        assert!(altered.has_extensions);
        assert_eq!(altered.score, 3.5);
        let slash = complexity(&Chord::from_symbol("Cdim/Eb").unwrap());
        assert_eq!(slash.score, 2.0);
    }

    #[test]
    fn test_alternatives_are_slash_readings() {
        let chord = Chord::from_symbol("C").unwrap();
        let alts: Vec<String> = ChordDetector::default()
            .alternatives(&chord)
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert_eq!(alts, vec!["C/E", "C/G"]);
    }

    #[test]
    fn test_inversion_of() {
        let chord = Chord::from_symbol("C").unwrap();
        assert_eq!(inversion_of(&chord, &notes(&["E3", "C4", "G4"])), 1);
        assert_eq!(inversion_of(&chord, &notes(&["G2", "C4", "E4"])), 2);
        assert_eq!(inversion_of(&chord, &[]), 0);
    }

    #[test]
    fn test_voice_leading_motion() {
        let c = Chord::from_symbol("C").unwrap();
        let em = Chord::from_symbol("Em").unwrap();
        let am = Chord::from_symbol("Am").unwrap();
        let g = Chord::from_symbol("G").unwrap();
        let motion = voice_leading_motion(&c, &em);
        assert_eq!(motion.motion_type, MotionType::ThirdMotion);
        assert_eq!(motion.common_tones, vec![4, 7]);
        assert_eq!(voice_leading_motion(&c, &am).motion_type, MotionType::Leap);
        assert_eq!(motion.quality, MotionQuality::Smooth);
        assert_eq!(voice_leading_motion(&c, &g).motion_type, MotionType::FifthMotion);
        assert_eq!(voice_leading_motion(&c, &g).quality, MotionQuality::Moderate);
    }
}
