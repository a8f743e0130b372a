//! CLI argument definitions for the cuecraft command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// cuecraft - Sound design for narrated explainer videos
#[derive(Parser)]
#[command(name = "cuecraft")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Detect sound moments in every scene and write SFX cues to the storyboard
    Generate {
        /// Project directory (contains storyboard/storyboard.json)
        #[arg(short, long)]
        project: String,

        /// Pipeline config file (default: <project>/cuecraft.json if present)
        #[arg(short, long)]
        config: Option<String>,

        /// Synthesize a unique sound per cue instead of using the library
        #[arg(long)]
        custom: bool,

        /// Enable semantic analysis
        #[arg(long)]
        llm: bool,

        /// Command that answers semantic prompts on stdin, split on
        /// whitespace (implies --llm)
        #[arg(long)]
        llm_command: Option<String>,

        /// Analyze and generate without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Merge with existing cues instead of replacing them
        #[arg(long)]
        merge: bool,

        /// Maximum cues per second
        #[arg(long)]
        max_per_second: Option<f64>,

        /// Minimum frames between cues
        #[arg(long)]
        min_gap_frames: Option<u32>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Preview per-scene timeline analysis without generating cues
    Analyze {
        /// Project directory
        #[arg(short, long)]
        project: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Analyze a single scene source file
    Scene {
        /// Path to the scene file (.tsx)
        #[arg(short, long)]
        file: String,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render the sound library, or list what it contains
    Library {
        /// Output directory for the WAV files
        #[arg(short, long)]
        out: String,

        /// List catalog sounds instead of rendering
        #[arg(long, conflicts_with = "missing")]
        list: bool,

        /// List sounds not yet rendered
        #[arg(long)]
        missing: bool,

        /// Sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Detect sound moments in narration text
    Narration {
        /// Narration text
        #[arg(short, long)]
        text: String,

        /// JSON file with word timestamps
        #[arg(long)]
        timestamps: Option<String>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}
