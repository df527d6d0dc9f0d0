// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the theory model.
//!
//! Validation failures are raised immediately and name the offending token.
//! Detection that finds nothing is not an error; detectors return `None` or
//! a default key instead.

use thiserror::Error;

/// Errors raised while constructing or transforming theory values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TheoryError {
    #[error("invalid pitch name '{0}'")]
    InvalidPitch(String),

    #[error("octave {0} outside 0..=10")]
    InvalidOctave(i32),

    #[error("MIDI number {0} outside 0..=127")]
    MidiOutOfRange(i32),

    #[error("unknown chord quality '{0}'")]
    UnknownQuality(String),

    #[error("unknown scale type '{0}'")]
    UnknownScale(String),

    #[error("invalid interval '{0}'")]
    InvalidInterval(String),

    #[error("invalid chord symbol '{0}'")]
    InvalidSymbol(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("scale degree {degree} outside 1..={len}")]
    InvalidDegree { degree: usize, len: usize },

    #[error("no {mode} key with {count} accidentals")]
    InvalidSignature { count: i32, mode: String },

    #[error("{chords} chords but {durations} durations")]
    DurationMismatch { chords: usize, durations: usize },

    #[error("progression must contain at least one chord")]
    EmptyProgression,

    #[error("index {index} out of range for progression of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("repeat count must be at least 1, got {0}")]
    InvalidRepeat(usize),

    #[error("invalid note event: {0}")]
    InvalidEvent(String),

    #[error("strategy '{name}' failed: {reason}")]
    StrategyFailed { name: String, reason: String },
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, TheoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_offending_token() {
        let err = TheoryError::UnknownQuality("maj99".to_string());
        assert!(err.to_string().contains("maj99"));

        let err = TheoryError::DurationMismatch { chords: 3, durations: 2 };
        assert_eq!(err.to_string(), "3 chords but 2 durations");
    }
}
