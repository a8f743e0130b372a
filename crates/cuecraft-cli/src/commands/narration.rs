//! Narration command implementation
//!
//! Runs the narration pattern analyzer on a piece of text, with word
//! timings from a JSON file or estimated at 0.3 s per word.

use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_analysis::narration::DEFAULT_WORD_DURATION;
use cuecraft_analysis::NarrationAnalyzer;
use cuecraft_spec::{WordTimestamp, DEFAULT_FPS};
use std::fs;
use std::process::ExitCode;

use super::reporting::{print_json, print_moments};

/// Run the narration command
///
/// # Arguments
/// * `text` - Narration text
/// * `timestamps` - Optional JSON file with a `[{word, start, end}]` array
/// * `fps` - Frame rate, defaults to 30
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(
    text: &str,
    timestamps: Option<&str>,
    fps: Option<u32>,
    json_output: bool,
) -> Result<ExitCode> {
    let analyzer = NarrationAnalyzer::new(fps.unwrap_or(DEFAULT_FPS));

    let moments = match timestamps {
        Some(path) => {
            let words = load_timestamps(path)?;
            analyzer.analyze(text, &words, None)
        }
        None => analyzer.analyze_text(text, DEFAULT_WORD_DURATION),
    };

    if json_output {
        print_json(&moments)?;
    } else {
        println!("{} {}", "Narration:".cyan().bold(), text);
        if moments.is_empty() {
            println!("  {}", "no sound moments".dimmed());
        } else {
            print_moments(&moments);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_timestamps(path: &str) -> Result<Vec<WordTimestamp>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read timestamps: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse timestamps: {}", path))
}
