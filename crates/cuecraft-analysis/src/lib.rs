//! cuecraft Analysis
//!
//! Finds the instants in a scene that deserve a sound and fuses them into one
//! bounded list.
//!
//! # Overview
//!
//! - [`timeline`] - pattern scan of a scene's animation source
//! - [`narration`] - lexical triggers in narration, aligned to word timing
//! - [`semantic`] - boundary to an external model that proposes moments
//! - [`aggregate`] - merge, edge trimming and density limits
//!
//! # Example
//!
//! ```
//! use cuecraft_analysis::aggregate::aggregate_moments;
//! use cuecraft_analysis::timeline::SceneAnalyzer;
//! use cuecraft_spec::AggregationConfig;
//!
//! let code = "const DURATION = 150;\nopacity: interpolate(frame, [20, 35], [0, 1])";
//! let scene = SceneAnalyzer::new(30).analyze_source(code, "intro", "intro");
//!
//! let moments = aggregate_moments(
//!     &scene.moments,
//!     &[],
//!     &[],
//!     &AggregationConfig::default(),
//!     Some(scene.duration_frames),
//!     30,
//! );
//! assert_eq!(moments.len(), 1);
//! assert_eq!(moments[0].frame(), 20);
//! ```

pub mod aggregate;
pub mod error;
pub mod narration;
pub mod semantic;
pub mod timeline;

pub use aggregate::{aggregate_moments, dedupe_consecutive_kinds, group_by_second, DensityReport};
pub use error::{AnalysisError, AnalysisResult};
pub use narration::{estimate_word_timestamps, NarrationAnalyzer};
pub use semantic::{
    CommandClient, HeuristicClient, SemanticAnalyzer, SemanticClient, SemanticRequest,
};
pub use timeline::{find_scene_files, SceneAnalyzer};
