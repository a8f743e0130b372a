//! Storyboard integration.
//!
//! The storyboard is a JSON document owned by the upstream video pipeline.
//! It is held as a [`serde_json::Value`] so every field this crate does not
//! know about survives a load/save round trip untouched; only each scene's
//! `sfx_cues` array is rewritten.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cuecraft_spec::{SfxCue, StageError, WriteMode, DEFAULT_FPS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding a scene's cue list.
pub const CUES_KEY: &str = "sfx_cues";

/// Inter-scene buffer used when the document does not set one.
pub const DEFAULT_SCENE_BUFFER_SECONDS: f64 = 1.0;

/// Result type for storyboard operations.
pub type StoryboardResult<T> = Result<T, StoryboardError>;

/// Errors raised while reading or writing a storyboard.
#[derive(Debug, Error)]
pub enum StoryboardError {
    #[error("Storyboard not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read storyboard {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse storyboard {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid cues in scene '{scene_id}': {source}")]
    InvalidCues {
        scene_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write storyboard {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize storyboard: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StageError for StoryboardError {
    fn code(&self) -> &'static str {
        match self {
            StoryboardError::NotFound { .. } => "STORYBOARD_001",
            StoryboardError::Read { .. } => "STORYBOARD_002",
            StoryboardError::Parse { .. } => "STORYBOARD_003",
            StoryboardError::InvalidCues { .. } => "STORYBOARD_004",
            StoryboardError::Write { .. } => "STORYBOARD_005",
            StoryboardError::Serialize(_) => "STORYBOARD_006",
        }
    }

    fn category(&self) -> &'static str {
        "storyboard"
    }
}

/// Summary fields from the top of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub project: String,
    pub title: String,
    pub fps: u32,
    pub scene_count: usize,
    pub total_duration_seconds: f64,
}

/// The fields of a scene the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub scene_type: String,
    pub narration: Option<String>,
    pub audio_duration_seconds: Option<f64>,
}

/// A loaded storyboard document.
#[derive(Debug, Clone)]
pub struct Storyboard {
    path: PathBuf,
    document: Value,
}

impl Storyboard {
    /// Loads `path`. A missing file is [`StoryboardError::NotFound`].
    pub fn load(path: &Path) -> StoryboardResult<Self> {
        if !path.exists() {
            return Err(StoryboardError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| StoryboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = serde_json::from_str(&text).map_err(|source| StoryboardError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded storyboard");
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Wraps an in-memory document that will be saved to `path`.
    pub fn from_value(path: impl Into<PathBuf>, document: Value) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// `storyboard.json` -> `storyboard.json.bak`.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    /// Writes the document back, pretty-printed with two-space indent.
    ///
    /// With `backup`, the current file is first copied to [`Self::backup_path`].
    pub fn save(&self, backup: bool) -> StoryboardResult<()> {
        if backup && self.path.exists() {
            let backup_path = self.backup_path();
            fs::copy(&self.path, &backup_path).map_err(|source| StoryboardError::Write {
                path: backup_path.clone(),
                source,
            })?;
            debug!(path = %backup_path.display(), "wrote storyboard backup");
        }

        let text =
            serde_json::to_string_pretty(&self.document).map_err(StoryboardError::Serialize)?;
        fs::write(&self.path, text).map_err(|source| StoryboardError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Every scene object, in document order.
    pub fn scenes(&self) -> &[Value] {
        self.document
            .get("scenes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Typed view of each scene. Scenes that are not objects are skipped.
    pub fn scene_entries(&self) -> Vec<SceneEntry> {
        self.scenes()
            .iter()
            .filter(|scene| scene.is_object())
            .map(|scene| {
                serde_json::from_value(scene.clone()).unwrap_or_else(|e| {
                    warn!(error = %e, "scene has unexpected field types");
                    SceneEntry {
                        id: str_field(scene, "id").unwrap_or_default().to_string(),
                        scene_type: str_field(scene, "type").unwrap_or_default().to_string(),
                        ..Default::default()
                    }
                })
            })
            .collect()
    }

    pub fn scene_by_id(&self, scene_id: &str) -> Option<&Value> {
        self.scenes()
            .iter()
            .find(|scene| str_field(scene, "id") == Some(scene_id))
    }

    /// Looks a scene up by its `type` path, e.g. `"llm-inference/hook"`.
    pub fn scene_by_type(&self, scene_type: &str) -> Option<&Value> {
        self.scenes()
            .iter()
            .find(|scene| str_field(scene, "type") == Some(scene_type))
    }

    fn scene_by_id_mut(&mut self, scene_id: &str) -> Option<&mut Map<String, Value>> {
        self.document
            .get_mut("scenes")?
            .as_array_mut()?
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|scene| scene.get("id").and_then(Value::as_str) == Some(scene_id))
    }

    /// Writes cues into a scene. Returns false when no scene has `scene_id`.
    ///
    /// Replace mode overwrites the list. Merge mode keys old and new cues by
    /// frame, lets the new cue win a collision, and sorts by frame.
    pub fn update_scene_cues(&mut self, scene_id: &str, cues: &[SfxCue], mode: WriteMode) -> bool {
        let Some(scene) = self.scene_by_id_mut(scene_id) else {
            return false;
        };
        let new_cues: Vec<Value> = cues.iter().map(cue_to_value).collect();

        let merged = match mode {
            WriteMode::Replace => new_cues,
            WriteMode::Merge => {
                let mut by_frame: BTreeMap<u64, Value> = BTreeMap::new();
                let existing = scene
                    .get(CUES_KEY)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for cue in existing.into_iter().chain(new_cues) {
                    match cue.get("frame").and_then(Value::as_u64) {
                        Some(frame) => {
                            by_frame.insert(frame, cue);
                        }
                        None => warn!(scene_id, "dropping cue without a frame"),
                    }
                }
                by_frame.into_values().collect()
            }
        };

        scene.insert(CUES_KEY.to_string(), Value::Array(merged));
        true
    }

    /// Applies [`Self::update_scene_cues`] to every entry of `scene_cues`.
    pub fn update_all_scenes(
        &mut self,
        scene_cues: &BTreeMap<String, Vec<SfxCue>>,
        mode: WriteMode,
    ) -> BTreeMap<String, bool> {
        scene_cues
            .iter()
            .map(|(scene_id, cues)| {
                let updated = self.update_scene_cues(scene_id, cues, mode);
                if !updated {
                    warn!(scene_id = %scene_id, "scene not in storyboard");
                }
                (scene_id.clone(), updated)
            })
            .collect()
    }

    /// Empties one scene's cue list. Returns false when the scene is missing.
    pub fn clear_scene_cues(&mut self, scene_id: &str) -> bool {
        match self.scene_by_id_mut(scene_id) {
            Some(scene) => {
                scene.insert(CUES_KEY.to_string(), Value::Array(Vec::new()));
                true
            }
            None => false,
        }
    }

    pub fn clear_all_cues(&mut self) {
        let Some(scenes) = self.document.get_mut("scenes").and_then(Value::as_array_mut) else {
            return;
        };
        for scene in scenes.iter_mut().filter_map(Value::as_object_mut) {
            scene.insert(CUES_KEY.to_string(), Value::Array(Vec::new()));
        }
    }

    /// Cues currently stored on a scene; empty when the scene is missing.
    pub fn scene_cues(&self, scene_id: &str) -> StoryboardResult<Vec<SfxCue>> {
        match self.scene_by_id(scene_id) {
            Some(scene) => cues_of(scene, scene_id),
            None => Ok(Vec::new()),
        }
    }

    /// Cues of every scene by id. Scenes without an id are listed as `"unknown"`.
    pub fn all_cues(&self) -> StoryboardResult<BTreeMap<String, Vec<SfxCue>>> {
        let mut all = BTreeMap::new();
        for scene in self.scenes() {
            let scene_id = str_field(scene, "id").unwrap_or("unknown");
            all.insert(scene_id.to_string(), cues_of(scene, scene_id)?);
        }
        Ok(all)
    }

    /// `(audio_duration + visual_padding + buffer_between_scenes) * fps`,
    /// truncated. Zero when the scene is missing.
    pub fn scene_duration_frames(&self, scene_id: &str, fps: u32) -> u32 {
        let Some(scene) = self.scene_by_id(scene_id) else {
            return 0;
        };
        let audio = f64_field(scene, "audio_duration_seconds").unwrap_or(0.0);
        let padding = f64_field(scene, "visual_padding_seconds").unwrap_or(0.0);
        let buffer = self
            .document
            .get("audio")
            .and_then(|audio| f64_field(audio, "buffer_between_scenes_seconds"))
            .unwrap_or(DEFAULT_SCENE_BUFFER_SECONDS);

        let frames = ((audio + padding + buffer) * f64::from(fps)).trunc();
        if frames.is_finite() && frames > 0.0 {
            frames.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    pub fn project_info(&self) -> ProjectInfo {
        let fps = self
            .document
            .get("video")
            .and_then(|video| video.get("fps"))
            .and_then(Value::as_u64)
            .and_then(|fps| u32::try_from(fps).ok())
            .unwrap_or(DEFAULT_FPS);

        ProjectInfo {
            project: str_field(&self.document, "project")
                .unwrap_or("unknown")
                .to_string(),
            title: str_field(&self.document, "title").unwrap_or_default().to_string(),
            fps,
            scene_count: self.scenes().len(),
            total_duration_seconds: f64_field(&self.document, "total_duration_seconds")
                .unwrap_or(0.0),
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn cue_to_value(cue: &SfxCue) -> Value {
    // SfxCue is a plain struct of strings and numbers.
    serde_json::to_value(cue).unwrap_or(Value::Null)
}

fn cues_of(scene: &Value, scene_id: &str) -> StoryboardResult<Vec<SfxCue>> {
    match scene.get(CUES_KEY) {
        Some(cues) => serde_json::from_value(cues.clone()).map_err(|source| {
            StoryboardError::InvalidCues {
                scene_id: scene_id.to_string(),
                source,
            }
        }),
        None => Ok(Vec::new()),
    }
}
