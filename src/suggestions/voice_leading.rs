// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice-leading measures shared by the strategies and the beam search.

use crate::music::Chord;

/// Smoothness of moving from one chord to the next, in 0.0..=1.0
///
/// `0.6 * common_tone_ratio + 0.4 * root_motion`. Root motion is `1 - d/12`
/// for the shorter root distance `d`, plus a bonus keyed on the ascending
/// root interval: 0.2 for 5 or 7, 0.1 for 1 or 2, 0.15 for 3 or 4.
pub fn voice_leading_quality(from: &Chord, to: &Chord) -> f64 {
    let from_pcs = from.pitch_classes();
    let to_pcs = to.pitch_classes();
    let max_common = from_pcs.len().min(to_pcs.len());
    if max_common == 0 {
        return 0.5;
    }
    let common_ratio = from_pcs.intersection(to_pcs).len() as f64 / max_common as f64;

    let up = root_interval(from, to);
    let shorter = up.min(12 - up);
    let bonus = match up {
        5 | 7 => 0.2,
        1 | 2 => 0.1,
        3 | 4 => 0.15,
        _ => 0.0,
    };
    let root_motion = 1.0 - shorter as f64 / 12.0 + bonus;

    (0.6 * common_ratio + 0.4 * root_motion).clamp(0.0, 1.0)
}

/// Ascending interval between two chord roots in semitones (0-11)
pub fn root_interval(from: &Chord, to: &Chord) -> u8 {
    from.root().interval_to(to.root())
}

/// How smooth the bass line is between two chord roots
///
/// Keyed on the ascending interval, so a falling semitone (11) is a leap.
pub fn bass_motion_smoothness(from: &Chord, to: &Chord) -> f64 {
    match root_interval(from, to) {
        0..=2 => 1.0,
        3 | 4 => 0.7,
        5 | 7 => 0.6,
        _ => 0.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(symbol: &str) -> Chord {
        Chord::from_symbol(symbol).unwrap()
    }

    #[test]
    fn test_same_chord_is_smooth() {
        assert_eq!(voice_leading_quality(&chord("C"), &chord("C")), 1.0);
    }

    #[test]
    fn test_fifth_motion() {
        // One common tone (G), ascending 7, shorter distance 5
        let q = voice_leading_quality(&chord("C"), &chord("G"));
        let expected = 0.6 * (1.0 / 3.0) + 0.4 * (1.0 - 5.0 / 12.0 + 0.2);
        assert!((q - expected).abs() < 1e-9);
        // Up a fourth scores the same
        let down = voice_leading_quality(&chord("G"), &chord("C"));
        assert!((down - expected).abs() < 1e-9);
    }

    #[test]
    fn test_falling_whole_step_gets_no_step_bonus() {
        // C to Bb is an ascending minor seventh: distance 2, no bonus
        let q = voice_leading_quality(&chord("C"), &chord("Bb"));
        assert!((q - 0.4 * (1.0 - 2.0 / 12.0)).abs() < 1e-9);
        // Bb to C rises a whole step
        let up = voice_leading_quality(&chord("Bb"), &chord("C"));
        assert!((up - 0.4 * (1.0 - 2.0 / 12.0 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_third_bonus_depends_on_direction() {
        let up = voice_leading_quality(&chord("Am"), &chord("C"));
        let down = voice_leading_quality(&chord("C"), &chord("Am"));
        assert!((up - down - 0.4 * 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_tritone_is_roughest() {
        let tritone = voice_leading_quality(&chord("C"), &chord("F#"));
        let step = voice_leading_quality(&chord("C"), &chord("D"));
        assert!(tritone < step);
        assert!((0.0..=1.0).contains(&tritone));
    }

    #[test]
    fn test_bass_smoothness() {
        assert_eq!(bass_motion_smoothness(&chord("C"), &chord("Db")), 1.0);
        assert_eq!(bass_motion_smoothness(&chord("C"), &chord("E")), 0.7);
        assert_eq!(bass_motion_smoothness(&chord("G7"), &chord("C")), 0.6);
        assert_eq!(bass_motion_smoothness(&chord("C"), &chord("G")), 0.6);
        assert_eq!(bass_motion_smoothness(&chord("C"), &chord("F#")), 0.4);
        // Falling a semitone is an ascending major seventh
        assert_eq!(root_interval(&chord("Db7"), &chord("C")), 11);
        assert_eq!(bass_motion_smoothness(&chord("Db7"), &chord("C")), 0.4);
    }
}
