//! Analyze command implementation
//!
//! Previews the timeline analysis of every scene in a project without
//! generating cues or touching the storyboard.

use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_spec::PipelineConfig;
use std::path::Path;
use std::process::ExitCode;

use crate::orchestrator::{Orchestrator, CONFIG_FILE};

use super::reporting::print_json;

/// Run the analyze command
///
/// # Arguments
/// * `project` - Project directory
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(project: &str, json_output: bool) -> Result<ExitCode> {
    let project_dir = Path::new(project);
    let config_path = project_dir.join(CONFIG_FILE);
    let config = PipelineConfig::from_file_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let preview = Orchestrator::new(project_dir, config)
        .preview_analysis()
        .context("Failed to analyze project")?;

    if json_output {
        print_json(&preview)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Analyzing:".cyan().bold(), project_dir.display());
    println!();
    for (scene_id, scene) in &preview {
        println!(
            "{} {} {} frames, {} moments",
            scene_id.bold(),
            format!("({})", scene.scene_type).dimmed(),
            scene.duration_frames,
            scene.total_moments
        );
        for (kind, count) in &scene.moments_by_type {
            println!("    {:<18} {}", kind.as_str(), count);
        }
        for note in &scene.notes {
            println!("    {} {}", "note:".yellow(), note);
        }
    }
    println!();
    println!("{} {}", "Scenes:".blue().bold(), preview.len());

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_storyboard_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().display().to_string(), true).unwrap_err();
        assert!(format!("{:#}", err).contains("Storyboard not found"));
    }
}
