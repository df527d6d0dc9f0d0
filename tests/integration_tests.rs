// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! End-to-end tests across the public chordsmith API

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chordsmith::analysis::{recognize, ChordDetector, KeyDetector, NoteEvent};
use chordsmith::config::{load_progression, save_progression, EngineConfig};
use chordsmith::music::ProgressionDoc;
use chordsmith::{
    BeamSearch, Chord, ChordProgression, ChordSuggestion, Key, Note, Position, Quality, StrategyKind,
    SuggestionEngine, SuggestionStrategy,
};

fn notes(names: &[&str]) -> Vec<Note> {
    names.iter().map(|n| Note::parse(n).unwrap()).collect()
}

fn c_major(symbols: &[&str]) -> ChordProgression {
    ChordProgression::from_symbols(symbols, Some(Key::c_major()), None).unwrap()
}

/// Every quality survives symbol formatting and parsing
#[test]
fn test_symbol_round_trip_all_roots_and_qualities() {
    for pc in 0..12 {
        let root = Note::from_midi(60 + pc).unwrap();
        for quality in Quality::ALL {
            let chord = Chord::new(root, quality).unwrap();
            let parsed = Chord::from_symbol(&chord.symbol()).unwrap();
            assert_eq!(parsed, chord, "{}", chord.symbol());
            assert_eq!(parsed.quality(), quality);
        }
    }
}

/// Enharmonic spellings share a MIDI number, naturals have no partner
#[test]
fn test_enharmonic_identity() {
    let sharp = Note::parse("C#4").unwrap();
    let flat = Note::parse("Db4").unwrap();
    assert_eq!(sharp.midi(), flat.midi());
    assert_eq!(sharp, flat);
    assert_eq!(sharp.enharmonic_equivalent().map(|n| n.to_string()), Some("Db4".to_string()));
    assert!(Note::parse("E4").unwrap().enharmonic_equivalent().is_none());
}

/// Transposition moves the MIDI number and fails off the keyboard
#[test]
fn test_transpose_bounds() {
    let c4 = Note::parse("C4").unwrap();
    for semitones in [-60, -12, -1, 0, 1, 7, 12, 67] {
        let moved = c4.transpose(semitones).unwrap();
        assert_eq!(moved.midi() as i32, c4.midi() as i32 + semitones);
    }
    assert!(c4.transpose(68).is_err());
    assert!(c4.transpose(-61).is_err());
}

/// Chord detection names common voicings and ignores lone notes
#[test]
fn test_chord_detection() {
    let detector = ChordDetector::default();
    let cases = [
        (vec!["C4", "E4", "G4"], "C"),
        (vec!["A4", "C5", "E5"], "Am"),
        (vec!["G4", "B4", "D5", "F5"], "G7"),
    ];
    for (voicing, expected) in cases {
        let chord = detector.detect(&notes(&voicing), None).unwrap();
        assert_eq!(chord.symbol(), expected);
    }
    assert!(detector.detect(&notes(&["C4"]), None).is_none());
}

/// Key detection finds C major from its scale and defaults on silence
#[test]
fn test_key_detection() {
    let detector = KeyDetector::default();
    let scale = notes(&["C4", "D4", "E4", "F4", "G4", "A4", "B4"]);
    let (key, confidence) = detector.detect_from_notes(&scale, None);
    assert_eq!(key, Key::c_major());
    assert!(confidence > 0.5);

    let (key, confidence) = detector.detect_from_notes(&[], None);
    assert_eq!(key, Key::c_major());
    assert_eq!(confidence, 0.0);
}

/// Every built-in strategy keeps its scores in the unit interval
#[test]
fn test_suggestion_scores_bounded_on_random_progressions() {
    let mut rng = StdRng::seed_from_u64(7);
    let keys = [Key::c_major(), Key::parse("A minor").unwrap(), Key::parse("Eb major").unwrap()];
    for _ in 0..40 {
        let len = rng.gen_range(1..7);
        let chords: Vec<Chord> = (0..len)
            .map(|_| {
                let root = Note::from_midi(rng.gen_range(60..72)).unwrap();
                let quality = Quality::ALL[rng.gen_range(0..Quality::ALL.len())];
                Chord::new(root, quality).unwrap()
            })
            .collect();
        let key = keys[rng.gen_range(0..keys.len())].clone();
        let progression = ChordProgression::new(chords, Some(key), None).unwrap();

        for kind in StrategyKind::ALL {
            let suggestions = kind.create().suggest(&progression, None).unwrap();
            for s in suggestions {
                assert!((0.0..=1.0).contains(&s.confidence), "{} {}", kind, s.confidence);
                assert!((0.0..=1.0).contains(&s.voice_leading_quality));
                match s.position {
                    Position::Replace(i) | Position::InsertAfter(i) => assert!(i < progression.len()),
                }
            }
        }
    }
}

struct Fixed {
    name: &'static str,
    confidence: f64,
}

impl SuggestionStrategy for Fixed {
    fn suggest(&self, _progression: &ChordProgression, _key: Option<&Key>) -> chordsmith::Result<Vec<ChordSuggestion>> {
        let chord = Chord::from_symbol("Fmaj7")?;
        Ok(vec![ChordSuggestion::new(chord, self.confidence, "fixed", Position::Replace(0), 0.5)])
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Duplicate (chord, position) pairs collapse to the most confident one
#[test]
fn test_engine_deduplicates_across_strategies() {
    let engine = SuggestionEngine::with_strategies(vec![
        Box::new(Fixed { name: "Low", confidence: 0.4 }),
        Box::new(Fixed { name: "High", confidence: 0.9 }),
    ]);
    let suggestions = engine.suggest(&c_major(&["C", "G"]), None, None);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].confidence, 0.9);
    assert_eq!(suggestions[0].source, "High");
}

/// The default engine ranks its output and respects the cap
#[test]
fn test_engine_ordering_and_cap() {
    let progression = c_major(&["Dm7", "G7", "Cmaj7", "Am7"]);
    let engine = SuggestionEngine::default().with_max_suggestions(6);
    let suggestions = engine.suggest(&progression, None, None);
    assert!(suggestions.len() <= 6);
    assert!(!suggestions.is_empty());
    for pair in suggestions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    let names = engine.available_strategies();
    assert!(suggestions.iter().all(|s| names.contains(&s.source.as_str())));
}

/// The tritone sub of G7 is offered in place of it
#[test]
fn test_tritone_substitution_end_to_end() {
    let progression = c_major(&["Dm7", "G7", "Cmaj7"]);
    let engine = SuggestionEngine::default();
    let at_dominant = engine.suggest_for_position(&progression, 1, None, Some(&["SubV7"][..]));
    assert_eq!(at_dominant[0].chord.symbol(), "Db7");
    assert!(at_dominant.iter().all(|s| s.position == Position::Replace(1)));
}

/// Beam search is repeatable and never grows past its width
#[test]
fn test_beam_search_deterministic() {
    let progression = c_major(&["C", "Am", "F", "G"]);
    let strategies = ["SubV7", "BorrowedChord", "ChromaticApproach", "Suspend"];
    let search = BeamSearch::new(5);

    let first = search.reharmonize(&progression, None, &strategies, &[]);
    let second = search.reharmonize(&progression, None, &strategies, &[]);
    assert_eq!(first.progression.symbols(), second.progression.symbols());
    assert_eq!(first.score, second.score);
    assert_eq!(first.progression.len(), progression.len());
    assert!(first.trace.iter().all(|&size| size <= 5));
    assert_eq!(first.progression.durations(), progression.durations());
}

/// Applying a suggestion edits the progression where it points
#[test]
fn test_apply_suggestions() {
    let progression = c_major(&["C", "G7"]);
    let replace = ChordSuggestion::new(Chord::from_symbol("Db7").unwrap(), 0.9, "sub", Position::Replace(1), 0.9);
    assert_eq!(progression.apply(&replace).unwrap().symbols(), vec!["C", "Db7"]);

    let insert = ChordSuggestion::new(Chord::from_symbol("F").unwrap(), 0.8, "bridge", Position::InsertAfter(0), 0.8);
    assert_eq!(progression.apply(&insert).unwrap().symbols(), vec!["C", "F", "G7"]);
}

/// Progression and config files survive a save and load
#[test]
fn test_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    let progression = ChordProgression::from_symbols(
        &["Am", "Dm7", "E7", "Am"],
        Some(Key::parse("A minor").unwrap()),
        Some(vec![2.0, 1.0, 1.0, 4.0]),
    )
    .unwrap();
    let doc = ProgressionDoc::from(&progression);
    for name in ["prog.yaml", "prog.json"] {
        let path = dir.path().join(name);
        save_progression(&path, &doc).unwrap();
        let loaded = load_progression(&path).unwrap().to_progression().unwrap();
        assert_eq!(loaded, progression);
    }

    let mut config = EngineConfig::default();
    config.beam_width = 3;
    config.strategies = vec!["SubV7".to_string(), "Suspend".to_string()];
    for name in ["engine.yaml", "engine.toml"] {
        let path = dir.path().join(name);
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.beam_width, 3);
        assert_eq!(loaded.strategies, config.strategies);
        assert_eq!(loaded.engine().unwrap().available_strategies(), vec!["SubV7", "Suspend"]);
    }
}

/// A played I-IV-V-I comes back as chords with the right key
#[test]
fn test_recognize_performance() {
    let mut events = Vec::new();
    let voicings: [[u8; 3]; 4] = [[60, 64, 67], [53, 57, 60], [55, 59, 62], [60, 64, 67]];
    for (bar, voicing) in voicings.iter().enumerate() {
        let start = bar as f64 * 2.0;
        for &pitch in voicing {
            events.push(NoteEvent::new(pitch, start, start + 2.0, 90).unwrap());
        }
    }

    let doc = recognize(&events, 2.0);
    let symbols: Vec<&str> = doc.chords.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["C", "F", "G", "C"]);
    assert_eq!(doc.key.as_deref(), Some("C major"));
    assert!(doc.to_progression().is_ok());
}
