//! cuecraft CLI library.
//!
//! Cue generation, storyboard integration and the project orchestrator,
//! plus the command implementations behind the `cuecraft` binary.
//!
//! ```no_run
//! use cuecraft_cli::orchestrator::Orchestrator;
//! use cuecraft_spec::PipelineConfig;
//!
//! let result = Orchestrator::new("projects/llm-inference", PipelineConfig::default())
//!     .generate(false);
//! assert!(result.success(), "{:?}", result.errors);
//! ```

pub mod commands;
pub mod cues;
pub mod orchestrator;
pub mod storyboard;
