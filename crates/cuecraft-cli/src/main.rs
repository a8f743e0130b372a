//! cuecraft CLI - sound effects for narrated explainer videos
//!
//! This binary analyzes a project's scenes and narration, and writes SFX
//! cues into its storyboard.

mod cli_args;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli_args::{Cli, Commands};
use cuecraft_cli::commands;
use cuecraft_cli::commands::generate::GenerateOptions;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            project,
            config,
            custom,
            llm,
            llm_command,
            dry_run,
            merge,
            max_per_second,
            min_gap_frames,
            fps,
            json,
        } => commands::generate::run(&GenerateOptions {
            project,
            config,
            custom,
            llm,
            llm_command: llm_command
                .map(|cmd| cmd.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
            dry_run,
            merge,
            max_per_second,
            min_gap_frames,
            fps,
            json,
        }),
        Commands::Analyze { project, json } => commands::analyze::run(&project, json),
        Commands::Scene { file, fps, json } => commands::scene::run(&file, fps, json),
        Commands::Library {
            out,
            list,
            missing,
            sample_rate,
            json,
        } => commands::library::run(&out, list, missing, sample_rate, json),
        Commands::Narration {
            text,
            timestamps,
            fps,
            json,
        } => commands::narration::run(&text, timestamps.as_deref(), fps, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "cuecraft",
            "generate",
            "--project",
            "projects/demo",
            "--custom",
            "--merge",
            "--max-per-second",
            "2.5",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                project,
                custom,
                merge,
                max_per_second,
                dry_run,
                llm,
                json,
                ..
            } => {
                assert_eq!(project, "projects/demo");
                assert!(custom);
                assert!(merge);
                assert!(dry_run);
                assert_eq!(max_per_second, Some(2.5));
                assert!(!llm);
                assert!(!json);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_parses_llm_command() {
        let cli = Cli::try_parse_from([
            "cuecraft",
            "generate",
            "-p",
            "demo",
            "--llm-command",
            "claude -p",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                project,
                llm_command,
                ..
            } => {
                assert_eq!(project, "demo");
                assert_eq!(llm_command.as_deref(), Some("claude -p"));
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_requires_project() {
        let err = Cli::try_parse_from(["cuecraft", "analyze"]).err().unwrap();
        assert!(err.to_string().contains("--project"));
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["cuecraft", "scene", "--file", "a.tsx", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_library_list_conflicts_with_missing() {
        assert!(
            Cli::try_parse_from(["cuecraft", "library", "--out", "sfx", "--list", "--missing"])
                .is_err()
        );
    }
}
