//! Library command implementation
//!
//! Renders the sound catalog to disk, or reports what is already there.

use anyhow::{Context, Result};
use colored::Colorize;
use cuecraft_backend_audio::SoundLibrary;
use cuecraft_spec::DEFAULT_SAMPLE_RATE;
use std::process::ExitCode;

use super::reporting::print_json;

/// Run the library command
///
/// # Arguments
/// * `out` - Directory holding the library WAV files
/// * `list` - Print the catalog instead of rendering
/// * `missing` - Print sounds not yet on disk instead of rendering
/// * `sample_rate` - Render sample rate, defaults to 44100
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(
    out: &str,
    list: bool,
    missing: bool,
    sample_rate: Option<u32>,
    json_output: bool,
) -> Result<ExitCode> {
    let library =
        SoundLibrary::new(out).with_sample_rate(sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE));

    if list {
        let infos: Vec<_> = library
            .list_sounds()
            .into_iter()
            .filter_map(|name| library.info(name))
            .collect();
        if json_output {
            print_json(&infos)?;
        } else {
            println!("{}", "Sound library:".cyan().bold());
            for info in &infos {
                let marker = if library.sound_exists(info.name) {
                    "+".green()
                } else {
                    "-".dimmed()
                };
                println!(
                    "  {} {:<18} {:>5.2}s  {}",
                    marker,
                    info.name,
                    info.default_duration,
                    info.description.dimmed()
                );
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    if missing {
        let names = library.missing_sounds();
        if json_output {
            print_json(&names)?;
        } else if names.is_empty() {
            println!("{}", "All library sounds present".green());
        } else {
            println!("{}", "Missing sounds:".yellow().bold());
            for name in &names {
                println!("  {}", name);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let generated = library
        .generate_all()
        .with_context(|| format!("Failed to render sound library into {}", out))?;
    if json_output {
        print_json(&generated)?;
    } else {
        println!(
            "{} {} sounds into {}",
            "Rendered".green().bold(),
            generated.len(),
            library.sfx_dir().display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_then_nothing_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().display().to_string();

        assert_eq!(run(&out, false, false, Some(22050), true).unwrap(), ExitCode::SUCCESS);
        let library = SoundLibrary::new(dir.path());
        assert!(library.missing_sounds().is_empty());
        assert!(dir.path().join("ui_pop.wav").is_file());
    }

    #[test]
    fn test_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sfx");
        run(&out.display().to_string(), true, false, None, true).unwrap();
        assert!(!out.exists());
    }
}
