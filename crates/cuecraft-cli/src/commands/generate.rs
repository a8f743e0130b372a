//! Generate command implementation
//!
//! Runs the full SFX pipeline over a project and writes the resulting cues
//! into its storyboard.

use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_spec::{CueMode, PipelineConfig, WriteMode};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::orchestrator::{Orchestrator, SfxGenerationResult, CONFIG_FILE};

use super::reporting::print_json;

/// Flags of `cuecraft generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub project: String,
    pub config: Option<String>,
    pub custom: bool,
    pub llm: bool,
    pub llm_command: Vec<String>,
    pub dry_run: bool,
    pub merge: bool,
    pub max_per_second: Option<f64>,
    pub min_gap_frames: Option<u32>,
    pub fps: Option<u32>,
    pub json: bool,
}

/// Run the generate command
///
/// # Returns
/// Exit code: 0 on success, 1 when any scene or the storyboard update failed
pub fn run(options: &GenerateOptions) -> Result<ExitCode> {
    let project_dir = Path::new(&options.project);
    let config = load_config(project_dir, options)?;

    if !options.json {
        println!("{} {}", "Generating SFX for:".cyan().bold(), project_dir.display());
        println!(
            "  {} {}  {} {}{}",
            "Mode:".dimmed(),
            config.mode,
            "Write:".dimmed(),
            config.write_mode,
            if options.dry_run {
                format!("  {}", "(dry run)".yellow())
            } else {
                String::new()
            }
        );
    }

    let result = Orchestrator::new(project_dir, config).generate(options.dry_run);

    if options.json {
        print_json(&result)?;
    } else {
        print_summary(&result);
    }

    Ok(if result.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Loads the config file (explicit, or `<project>/cuecraft.json` if present)
/// and applies command-line overrides.
pub fn load_config(project_dir: &Path, options: &GenerateOptions) -> Result<PipelineConfig> {
    let mut config = match &options.config {
        Some(path) => PipelineConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => {
            let path: PathBuf = project_dir.join(CONFIG_FILE);
            PipelineConfig::from_file_or_default(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
    };

    if options.custom {
        config.mode = CueMode::Custom;
    }
    if options.merge {
        config.write_mode = WriteMode::Merge;
    }
    if let Some(fps) = options.fps {
        config.fps = fps;
    }
    if let Some(max) = options.max_per_second {
        config.aggregation.max_per_second = max;
    }
    if let Some(gap) = options.min_gap_frames {
        config.aggregation.min_gap_frames = gap;
    }
    if options.llm {
        config.semantic.enabled = true;
    }
    if !options.llm_command.is_empty() {
        config.semantic.enabled = true;
        config.semantic.command = options.llm_command.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_summary(result: &SfxGenerationResult) {
    println!();
    for report in &result.scene_reports {
        let status = match result.scenes_updated.get(&report.scene_id) {
            Some(true) => "updated".green(),
            Some(false) => "not in storyboard".red(),
            None if result.dry_run => "dry run".yellow(),
            None => "skipped".yellow(),
        };
        println!(
            "  {} {} {} -> {} cues [{}]",
            report.scene_id.bold(),
            format!("({})", report.scene_type).dimmed(),
            report.raw_moments(),
            report.cues,
            status
        );
        for note in &report.notes {
            println!("      {} {}", "note:".dimmed(), note);
        }
    }

    println!();
    println!("{} {}", "Project:".blue().bold(), result.project_id);
    println!("{} {}", "Scenes analyzed:".blue().bold(), result.scenes_analyzed);
    println!("{} {}", "Moments detected:".blue().bold(), result.moments_detected);
    println!("{} {}", "Cues generated:".blue().bold(), result.cues_generated);

    if !result.errors.is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for error in &result.errors {
            println!("  {} {}", "-".red(), error);
        }
    }

    println!();
    if result.success() {
        println!("{}", "SUCCESS".green().bold());
    } else {
        println!("{}", "FAILED".red().bold());
    }
}
