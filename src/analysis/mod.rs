// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Detection of chords and keys from notes and timed note events.

pub mod chord_detector;
pub mod chromagram;
pub mod events;
pub mod key_detector;
pub mod recognize;

pub use chord_detector::{ChordDetector, VoiceLeadingMotion};
pub use chromagram::{ChromaMatch, Chromagram, ChromagramDetector};
pub use events::NoteEvent;
pub use key_detector::{compare_keys, KeyComparison, KeyDetector, ProfileSet};
pub use recognize::{recognize, Recognizer};
