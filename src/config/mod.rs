// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for chordsmith.
//!
//! Engine settings live in a YAML (or TOML) file; progressions are exchanged
//! as YAML or JSON documents of the form `{key, chords: [{symbol, duration}]}`.
//! The format is picked from the file extension.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{ChordDetector, KeyDetector, ProfileSet, Recognizer};
use crate::music::ProgressionDoc;
use crate::reharm::BeamSearch;
use crate::suggestions::{StrategyKind, SuggestionEngine};

/// File formats for config and progression files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "json" => Format::Json,
            Some(ext) if ext == "toml" => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// Engine, search and detector settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Cap on merged suggestions
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Sequences kept per step of the reharmonization search
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
    /// Strategy names to run; empty runs all of them
    #[serde(default)]
    pub strategies: Vec<String>,
    #[serde(default = "default_high_confidence")]
    pub high_confidence_threshold: f64,
    #[serde(default)]
    pub key_profile: ProfileSet,
    /// Recognition window in beats
    #[serde(default = "default_window_size")]
    pub window_size: f64,
    /// Shortest sounding time in beats for a note to count inside a window
    #[serde(default = "default_min_chord_duration")]
    pub min_chord_duration: f64,
    /// Last field: TOML tables must follow plain values
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Chord detector settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectorConfig {
    #[serde(default = "default_min_notes")]
    pub min_notes: usize,
    #[serde(default = "default_bass_weight")]
    pub bass_weight: f64,
}

fn default_max_suggestions() -> usize {
    20
}
fn default_beam_width() -> usize {
    5
}
fn default_high_confidence() -> f64 {
    0.8
}
fn default_window_size() -> f64 {
    1.0
}
fn default_min_chord_duration() -> f64 {
    0.5
}
fn default_min_notes() -> usize {
    2
}
fn default_bass_weight() -> f64 {
    2.0
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_notes: default_min_notes(),
            bass_weight: default_bass_weight(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            beam_width: default_beam_width(),
            strategies: Vec::new(),
            high_confidence_threshold: default_high_confidence(),
            key_profile: ProfileSet::default(),
            window_size: default_window_size(),
            min_chord_duration: default_min_chord_duration(),
            detector: DetectorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a config file, YAML or TOML by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = match Format::of(path) {
            Format::Toml => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save to a file, TOML for `.toml` and YAML otherwise
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = match Format::of(path) {
            Format::Toml => self.to_toml()?,
            _ => self.to_yaml()?,
        };
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.beam_width == 0 {
            bail!("beam_width must be at least 1");
        }
        if self.max_suggestions == 0 {
            bail!("max_suggestions must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.high_confidence_threshold) {
            bail!(
                "high_confidence_threshold {} outside 0.0..=1.0",
                self.high_confidence_threshold
            );
        }
        if self.detector.min_notes == 0 {
            bail!("detector.min_notes must be at least 1");
        }
        if !self.detector.bass_weight.is_finite() || self.detector.bass_weight < 0.0 {
            bail!("detector.bass_weight {} must be a non-negative number", self.detector.bass_weight);
        }
        if !(self.window_size.is_finite() && self.window_size > 0.0) {
            bail!("window_size {} must be positive", self.window_size);
        }
        if !self.min_chord_duration.is_finite() || self.min_chord_duration < 0.0 {
            bail!("min_chord_duration {} must be non-negative", self.min_chord_duration);
        }
        self.strategy_kinds().map(|_| ())
    }

    /// Configured strategies in the order given, or all of them
    pub fn strategy_kinds(&self) -> Result<Vec<StrategyKind>> {
        if self.strategies.is_empty() {
            return Ok(StrategyKind::ALL.to_vec());
        }
        self.strategies
            .iter()
            .map(|name| match StrategyKind::from_name(name) {
                Some(kind) => Ok(kind),
                None => bail!("unknown strategy '{}'", name),
            })
            .collect()
    }

    pub fn engine(&self) -> Result<SuggestionEngine> {
        Ok(SuggestionEngine::from_kinds(&self.strategy_kinds()?)
            .with_max_suggestions(self.max_suggestions)
            .with_high_confidence_threshold(self.high_confidence_threshold))
    }

    pub fn beam_search(&self) -> Result<BeamSearch> {
        Ok(BeamSearch::new(self.beam_width).with_engine(self.engine()?))
    }

    pub fn chord_detector(&self) -> ChordDetector {
        ChordDetector::new(self.detector.min_notes, self.detector.bass_weight)
    }

    pub fn key_detector(&self) -> KeyDetector {
        KeyDetector::new(self.key_profile)
    }

    pub fn recognizer(&self) -> Recognizer {
        Recognizer {
            chord_detector: self.chord_detector(),
            key_detector: self.key_detector(),
            window_size: self.window_size,
            min_chord_duration: self.min_chord_duration,
        }
    }
}

/// Read a progression document, JSON for `.json` and YAML otherwise
pub fn load_progression<P: AsRef<Path>>(path: P) -> Result<ProgressionDoc> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read progression file: {:?}", path))?;
    match Format::of(path) {
        Format::Json => serde_json::from_str(&contents).context("Failed to parse JSON progression"),
        _ => serde_yaml::from_str(&contents).context("Failed to parse YAML progression"),
    }
}

/// Write a progression document, JSON for `.json` and YAML otherwise
pub fn save_progression<P: AsRef<Path>>(path: P, doc: &ProgressionDoc) -> Result<()> {
    let path = path.as_ref();
    let text = match Format::of(path) {
        Format::Json => serde_json::to_string_pretty(doc).context("Failed to serialize progression to JSON")?,
        _ => serde_yaml::to_string(doc).context("Failed to serialize progression to YAML")?,
    };
    fs::write(path, text).with_context(|| format!("Failed to write progression file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_engine_config() {
        let yaml = r#"
max_suggestions: 10
beam_width: 3
strategies: [SubV7, Suspend]
detector:
  bass_weight: 1.5
key_profile: folk
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.max_suggestions, 10);
        assert_eq!(config.beam_width, 3);
        assert_eq!(config.detector.min_notes, 2);
        assert_eq!(config.detector.bass_weight, 1.5);
        assert_eq!(config.key_profile, ProfileSet::Folk);
        assert_eq!(
            config.strategy_kinds().unwrap(),
            vec![StrategyKind::SubV7, StrategyKind::Suspend]
        );
        assert_eq!(config.engine().unwrap().available_strategies(), vec!["SubV7", "Suspend"]);
    }

    #[test]
    fn test_default_values() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_suggestions, 20);
        assert_eq!(config.beam_width, 5);
        assert_eq!(config.high_confidence_threshold, 0.8);
        assert_eq!(config.window_size, 1.0);
        assert_eq!(config.min_chord_duration, 0.5);
        assert_eq!(config.strategy_kinds().unwrap().len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let config = EngineConfig {
            beam_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            strategies: vec!["Reharm".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Reharm"));

        let config = EngineConfig {
            high_confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_yaml_and_toml() {
        let dir = tempdir().unwrap();
        let original = EngineConfig {
            beam_width: 8,
            strategies: vec!["TSDMovement".to_string()],
            key_profile: ProfileSet::Classical,
            ..Default::default()
        };

        for name in ["engine.yaml", "engine.toml"] {
            let path = dir.path().join(name);
            original.save(&path).unwrap();
            let loaded = EngineConfig::load(&path).unwrap();
            assert_eq!(loaded, original);
        }
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "beam_width: [").unwrap();
        assert!(EngineConfig::load(&path).is_err());

        fs::write(&path, "beam_width: 0").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_progression_files() {
        let dir = tempdir().unwrap();
        let yaml = r#"
key: "A minor"
chords:
  - symbol: Am
    duration: 2.0
  - symbol: E7
"#;
        let path = dir.path().join("song.yaml");
        fs::write(&path, yaml).unwrap();
        let doc = load_progression(&path).unwrap();
        assert_eq!(doc.key.as_deref(), Some("A minor"));
        assert_eq!(doc.chords[1].duration, 1.0);

        let json_path = dir.path().join("song.json");
        save_progression(&json_path, &doc).unwrap();
        let reloaded = load_progression(&json_path).unwrap();
        assert_eq!(reloaded, doc);
        assert_eq!(reloaded.to_progression().unwrap().symbols(), vec!["Am", "E7"]);
    }
}
