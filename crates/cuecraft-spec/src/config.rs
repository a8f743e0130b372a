//! Pipeline configuration.
//!
//! A project may carry a `cuecraft.json` next to its storyboard. Every field
//! is optional; missing fields take the defaults below.
//!
//! ```json
//! {
//!   "fps": 30,
//!   "mode": "custom",
//!   "write_mode": "merge",
//!   "aggregation": { "max_per_second": 2.0, "min_gap_frames": 12 },
//!   "semantic": { "enabled": true, "command": ["llm", "-m", "fast"], "timeout_secs": 30 }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::moment::MomentSource;

/// Default frame rate of rendered scenes.
pub const DEFAULT_FPS: u32 = 30;

/// Default output sample rate for synthesized audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Priority assigned to a source missing from the priority table.
const FALLBACK_PRIORITY: f64 = 0.5;

/// Tunables for fusing the three moment streams.
///
/// Frame-count settings are absolute and do not scale with fps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Most moments allowed in any one-second window.
    pub max_per_second: f64,
    /// Smallest gap allowed between two admitted moments.
    pub min_gap_frames: u32,
    /// Moments within this many frames of a group's first moment merge.
    pub merge_window_frames: u32,
    /// Moments this close to either scene edge are dropped.
    pub edge_buffer_frames: u32,
    /// Merge tie-break weight per source.
    pub source_priority: BTreeMap<MomentSource, f64>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        let mut source_priority = BTreeMap::new();
        source_priority.insert(MomentSource::Code, 0.9);
        source_priority.insert(MomentSource::Narration, 0.8);
        source_priority.insert(MomentSource::Llm, 0.7);
        Self {
            max_per_second: 3.0,
            min_gap_frames: 10,
            merge_window_frames: 10,
            edge_buffer_frames: 15,
            source_priority,
        }
    }
}

impl AggregationConfig {
    /// Priority of a source, 0.5 when not listed.
    pub fn priority(&self, source: MomentSource) -> f64 {
        self.source_priority
            .get(&source)
            .copied()
            .unwrap_or(FALLBACK_PRIORITY)
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_per_second > 0.0) {
            return Err(ConfigError::invalid(
                "aggregation.max_per_second",
                format!("must be positive, got {}", self.max_per_second),
            ));
        }
        if let Some((source, p)) = self
            .source_priority
            .iter()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(ConfigError::invalid(
                "aggregation.source_priority",
                format!("priority for '{}' must be non-negative, got {}", source, p),
            ));
        }
        Ok(())
    }
}

/// Settings for the external semantic analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Whether to call the analyzer at all.
    pub enabled: bool,
    /// Command line to run; the prompt is written to its stdin.
    /// Empty means use the offline heuristic.
    pub command: Vec<String>,
    /// Wall-clock bound on one call.
    pub timeout_secs: u64,
    /// Most moments kept from one reply.
    pub max_moments: usize,
    /// Smallest gap between kept moments.
    pub min_gap_seconds: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
            timeout_secs: 60,
            max_moments: 8,
            min_gap_seconds: 0.5,
        }
    }
}

/// How cues map to audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueMode {
    /// Reuse one pre-rendered sound per kind.
    #[default]
    Library,
    /// Synthesize a unique file per cue.
    Custom,
}

impl CueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueMode::Library => "library",
            CueMode::Custom => "custom",
        }
    }
}

impl std::fmt::Display for CueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How new cues combine with cues already in the storyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Discard existing cues.
    #[default]
    Replace,
    /// Frame-keyed union; new cues win on collision.
    Merge,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Replace => "replace",
            WriteMode::Merge => "merge",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scene frame rate.
    pub fps: u32,
    /// Library or custom cue generation.
    pub mode: CueMode,
    /// Replace or merge existing storyboard cues.
    pub write_mode: WriteMode,
    /// Write `storyboard.json.bak` before overwriting.
    pub backup: bool,
    /// Aggregator tunables.
    pub aggregation: AggregationConfig,
    /// External semantic analyzer.
    pub semantic: SemanticConfig,
    /// Extra roots searched for `src/scenes/<project>/<name>.tsx`.
    pub scene_search_dirs: Vec<PathBuf>,
    /// Sample rate for rendered audio.
    pub sample_rate: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            mode: CueMode::default(),
            write_mode: WriteMode::default(),
            backup: true,
            aggregation: AggregationConfig::default(),
            semantic: SemanticConfig::default(),
            scene_search_dirs: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::invalid("fps", "must be positive"));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        self.aggregation.validate()?;
        if self.semantic.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "semantic.timeout_secs",
                "must be at least one second",
            ));
        }
        if !(self.semantic.min_gap_seconds >= 0.0) {
            return Err(ConfigError::invalid(
                "semantic.min_gap_seconds",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}
