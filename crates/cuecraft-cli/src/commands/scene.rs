//! Scene command implementation
//!
//! Runs the timeline analyzer on a single scene file.

use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_analysis::SceneAnalyzer;
use cuecraft_spec::DEFAULT_FPS;
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{print_json, print_moments};

/// Run the scene command
///
/// # Arguments
/// * `file` - Scene source file
/// * `fps` - Frame rate, defaults to 30
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code 1 when the file does not exist
pub fn run(file: &str, fps: Option<u32>, json_output: bool) -> Result<ExitCode> {
    let path = Path::new(file);
    let analyzer = SceneAnalyzer::new(fps.unwrap_or(DEFAULT_FPS));
    let result = analyzer
        .analyze_scene(path)
        .with_context(|| format!("Failed to analyze scene: {}", file))?;
    let found = path.is_file();

    if json_output {
        print_json(&result)?;
    } else {
        println!("{} {}", "Scene:".cyan().bold(), file);
        println!("  {} {}", "Type:".dimmed(), result.scene_type);
        println!("  {} {}", "Duration:".dimmed(), result.duration_frames);
        println!("  {} {}", "Moments:".dimmed(), result.moments.len());
        for note in &result.analysis_notes {
            println!("  {} {}", "note:".yellow(), note);
        }
        if !result.moments.is_empty() {
            println!();
            print_moments(&result.moments);
        }
    }

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook.tsx");
        std::fs::write(
            &path,
            "const o = interpolate(frame, [0, 15], [0, 1]);\nconst DURATION = 90;\n",
        )
        .unwrap();
        let code = run(&path.display().to_string(), None, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_scene_file() {
        let code = run("/definitely/not/here.tsx", Some(30), true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
