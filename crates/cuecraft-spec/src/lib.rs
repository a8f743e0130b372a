//! cuecraft data model
//!
//! This crate holds the types shared by every stage of the cuecraft
//! sound-design pipeline:
//!
//! - [`SoundMoment`] - a candidate sound-worthy instant produced by an analyzer
//! - [`SfxCue`] - a resolved, volume-bounded playback instruction
//! - [`WordTimestamp`] - per-word narration timing from the TTS stage
//! - [`SceneAnalysisResult`] - everything one analyzer learned about a scene
//! - [`AggregationConfig`] / [`PipelineConfig`] - tunables and the config file
//!
//! # Invariants
//!
//! Out-of-range values are never errors. Confidence and intensity are clamped
//! into `[0, 1]`, cue volume into `[0, MAX_CUE_VOLUME]`, and negative frames
//! become frame 0, all at construction time.
//!
//! # Example
//!
//! ```
//! use cuecraft_spec::{MomentKind, MomentSource, SoundMoment};
//!
//! let moment = SoundMoment::new(MomentKind::Reveal, -4, 1.7, "big number")
//!     .with_intensity(0.9)
//!     .with_source(MomentSource::Narration);
//!
//! assert_eq!(moment.frame(), 0);
//! assert_eq!(moment.confidence(), 1.0);
//! ```

pub mod analysis;
pub mod config;
pub mod cue;
pub mod error;
pub mod moment;
pub mod timing;

pub use analysis::SceneAnalysisResult;
pub use config::{
    AggregationConfig, CueMode, PipelineConfig, SemanticConfig, WriteMode, DEFAULT_FPS,
    DEFAULT_SAMPLE_RATE,
};
pub use cue::{calculate_volume, SfxCue, MAX_CUE_VOLUME};
pub use error::{ConfigError, PipelineError, StageError};
pub use moment::{MomentKind, MomentSource, SoundMoment, DEFAULT_INTENSITY};
pub use timing::{WordTimestamp, REFERENCE_FPS};
