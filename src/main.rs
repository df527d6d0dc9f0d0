// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, Level};

use chordsmith::analysis::{ChromagramDetector, NoteEvent};
use chordsmith::config::{load_progression, save_progression, EngineConfig};
use chordsmith::music::{ChordProgression, Key, Note, ProgressionDoc};
use chordsmith::suggestions::StrategyKind;

fn print_usage() {
    println!("chordsmith - chord progression analysis and reharmonization");
    println!();
    println!("Usage: chordsmith <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  suggest <file>          Suggest chord changes for a progression file");
    println!("  reharmonize <file>      Pick the best-scoring reharmonization");
    println!("  analyze <file>          Key, roman numerals and suggestion potential");
    println!("  detect <midi...>        Name the chord formed by MIDI note numbers");
    println!("  recognize <events>      Build a progression from a JSON note-event file");
    println!("  strategies              List the suggestion strategies");
    println!();
    println!("Options:");
    println!("  --strategies <a,b>      Only use the named strategies");
    println!("  --config <file>         Engine config (YAML or TOML)");
    println!("  --key <key>             Analyze in this key, e.g. \"A minor\"");
    println!("  --beam <N>              Beam width for reharmonize");
    println!("  --melody <file>         JSON note events the reharmonization must fit");
    println!("  --window <beats>        Window size for recognize");
    println!("  --output <file>         Write the resulting progression (YAML or JSON)");
    println!("  --verbose, -v           Debug logging");
    println!("  --help, -h              Show this help message");
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    command: Option<String>,
    positional: Vec<String>,
    strategies: Vec<String>,
    config: Option<String>,
    key: Option<String>,
    beam: Option<usize>,
    melody: Option<String>,
    window: Option<f64>,
    output: Option<String>,
    verbose: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", arg))
        };
        match arg.as_str() {
            "--strategies" => {
                options.strategies = value()?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "--config" => options.config = Some(value()?),
            "--key" => options.key = Some(value()?),
            "--beam" => {
                let text = value()?;
                options.beam = Some(text.parse().map_err(|_| anyhow!("Invalid beam width: {}", text))?);
            }
            "--melody" => options.melody = Some(value()?),
            "--window" => {
                let text = value()?;
                options.window = Some(text.parse().map_err(|_| anyhow!("Invalid window size: {}", text))?);
            }
            "--output" => options.output = Some(value()?),
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => options.help = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ if options.command.is_none() => options.command = Some(arg.clone()),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

fn load_config(options: &Options) -> Result<EngineConfig> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if !options.strategies.is_empty() {
        config.strategies = options.strategies.clone();
    }
    if let Some(beam) = options.beam {
        config.beam_width = beam;
    }
    if let Some(window) = options.window {
        config.window_size = window;
    }
    config.validate()?;
    Ok(config)
}

fn file_argument<'a>(options: &'a Options, what: &str) -> Result<&'a str> {
    options
        .positional
        .first()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a file argument", what))
}

/// Progression from file, with `--key` overriding the file's key
fn load_input(options: &Options, what: &str) -> Result<(ChordProgression, Option<Key>)> {
    let path = file_argument(options, what)?;
    let progression = load_progression(path)?
        .to_progression()
        .with_context(|| format!("Invalid progression in {}", path))?;
    let key = options
        .key
        .as_deref()
        .map(Key::parse)
        .transpose()
        .context("Invalid --key")?;
    Ok((progression, key))
}

fn load_events(path: &str) -> Result<Vec<NoteEvent>> {
    let contents = fs::read_to_string(path).with_context(|| format!("Failed to read events file: {}", path))?;
    let events: Vec<NoteEvent> =
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse note events in {}", path))?;
    for event in &events {
        event.validate()?;
    }
    Ok(events)
}

fn write_output(options: &Options, doc: &ProgressionDoc) -> Result<()> {
    if let Some(path) = &options.output {
        save_progression(Path::new(path), doc)?;
        println!("Wrote {}", path);
    }
    Ok(())
}

fn run_suggest(options: &Options) -> Result<()> {
    let config = load_config(options)?;
    let (progression, key) = load_input(options, "suggest")?;
    let engine = config.engine()?;

    println!("Progression: {}", progression);
    let suggestions = engine.suggest(&progression, key.as_ref(), None);
    if suggestions.is_empty() {
        println!("No suggestions");
        return Ok(());
    }
    for s in &suggestions {
        println!(
            "  {:<12} {:<10} conf {:.2}  vl {:.2}  [{}] {}",
            s.position.to_string(),
            s.chord.symbol(),
            s.confidence,
            s.voice_leading_quality,
            s.source,
            s.reasoning
        );
    }
    Ok(())
}

fn run_reharmonize(options: &Options) -> Result<()> {
    let config = load_config(options)?;
    let (progression, key) = load_input(options, "reharmonize")?;
    let melody = match &options.melody {
        Some(path) => load_events(path)?,
        None => Vec::new(),
    };
    let search = config.beam_search()?;
    let strategies: Vec<&str> = config.strategies.iter().map(String::as_str).collect();

    let result = search.reharmonize(&progression, key.as_ref(), &strategies, &melody);
    debug!(trace = ?result.trace, "beam sizes");

    println!("Original:     {}", progression);
    println!("Reharmonized: {}", result.progression);
    println!("Score:        {:.3}", result.score);
    for choice in result.changes() {
        println!(
            "  {} -> {} [{}] {}",
            progression
                .get(choice.index)
                .map(|c| c.symbol())
                .unwrap_or_default(),
            choice.chord.symbol(),
            choice.source,
            choice.reasoning
        );
    }
    write_output(options, &ProgressionDoc::from(&result.progression))
}

fn run_analyze(options: &Options) -> Result<()> {
    let config = load_config(options)?;
    let (progression, key) = load_input(options, "analyze")?;

    let key = match key.or_else(|| progression.key().cloned()) {
        Some(key) => {
            println!("Key: {}", key);
            key
        }
        None => {
            let (key, confidence) = config
                .key_detector()
                .detect_from_chords(progression.chords(), Some(progression.durations()));
            println!("Key: {} (detected, confidence {:.2})", key, confidence);
            key
        }
    };

    let numerals = progression.roman_numerals(Some(&key))?;
    println!("Progression: {}", progression);
    for (chord, numeral) in progression.iter().zip(&numerals) {
        println!("  {:<10} {:<6} {}", chord.symbol(), numeral, key.function_of(chord));
    }

    let report = config.engine()?.analyze_potential(&progression, Some(&key));
    println!(
        "Suggestions: {} ({} high confidence)",
        report.total_suggestions, report.high_confidence_suggestions
    );
    for (strategy, count) in &report.strategy_coverage {
        println!("  {:<18} {}", strategy, count);
    }
    for area in &report.improvement_areas {
        println!("  * {}", area);
    }
    Ok(())
}

fn run_detect(options: &Options) -> Result<()> {
    let config = load_config(options)?;
    if options.positional.is_empty() {
        bail!("detect requires MIDI note numbers");
    }
    let notes = options
        .positional
        .iter()
        .map(|text| -> Result<Note> {
            let midi: i32 = text.parse().map_err(|_| anyhow!("Invalid MIDI note: {}", text))?;
            Ok(Note::from_midi(midi)?)
        })
        .collect::<Result<Vec<Note>>>()?;

    let detector = config.chord_detector();
    match detector.detect_scored(&notes, None) {
        Some((chord, score)) => {
            println!("Chord: {} (score {:.2})", chord, score);
            let alternatives: Vec<String> = detector.alternatives(&chord).iter().map(|c| c.symbol()).collect();
            if !alternatives.is_empty() {
                println!("Alternatives: {}", alternatives.join(", "));
            }
        }
        None => println!("Chord: none"),
    }

    let chroma = ChromagramDetector::new().detect_notes(&notes);
    println!("Chromagram: {} (confidence {:.2})", chroma.label(), chroma.confidence);
    Ok(())
}

fn run_recognize(options: &Options) -> Result<()> {
    let config = load_config(options)?;
    let path = file_argument(options, "recognize")?;
    let events = load_events(path)?;
    let doc = config.recognizer().recognize(&events);

    println!("Key: {}", doc.key.as_deref().unwrap_or("unknown"));
    for entry in &doc.chords {
        println!("  {:<10} {} beats", entry.symbol, entry.duration);
    }
    write_output(options, &doc)
}

fn run_strategies() {
    for kind in StrategyKind::ALL {
        println!("  {:<18} {}", kind.name(), kind.description());
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;
    init_logging(options.verbose);

    if options.help {
        print_usage();
        return Ok(());
    }

    let Some(command) = options.command.as_deref() else {
        println!("chordsmith - chord progression analysis and reharmonization");
        println!("Run with --help for usage information");
        return Ok(());
    };

    match command {
        "suggest" => run_suggest(&options),
        "reharmonize" => run_reharmonize(&options),
        "analyze" => run_analyze(&options),
        "detect" => run_detect(&options),
        "recognize" => run_recognize(&options),
        "strategies" => {
            run_strategies();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}
