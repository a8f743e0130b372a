//! Per-scene analysis results.

use std::path::PathBuf;

use serde::Serialize;

use crate::moment::{MomentKind, SoundMoment};

/// Everything one analyzer learned about a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneAnalysisResult {
    /// Scene identifier (storyboard id or file stem).
    pub scene_id: String,
    /// Path-like category label, e.g. `my_project/intro`.
    pub scene_type: String,
    /// Scene length in frames.
    pub duration_frames: u32,
    /// Detected moments, ordered by frame.
    pub moments: Vec<SoundMoment>,
    /// File the analysis came from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    /// Free-text notes ("Scene file not found", ...).
    pub analysis_notes: Vec<String>,
}

impl SceneAnalysisResult {
    /// Creates an empty result.
    pub fn new(
        scene_id: impl Into<String>,
        scene_type: impl Into<String>,
        duration_frames: u32,
    ) -> Self {
        Self {
            scene_id: scene_id.into(),
            scene_type: scene_type.into(),
            duration_frames,
            moments: Vec::new(),
            source_file: None,
            analysis_notes: Vec::new(),
        }
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.analysis_notes.push(note.into());
        self
    }

    /// Moments of a single kind.
    pub fn moments_of_kind(&self, kind: MomentKind) -> Vec<&SoundMoment> {
        self.moments.iter().filter(|m| m.kind() == kind).collect()
    }

    /// Moments with `start <= frame <= end`.
    pub fn moments_in_range(&self, start: u32, end: u32) -> Vec<&SoundMoment> {
        self.moments
            .iter()
            .filter(|m| m.frame() >= start && m.frame() <= end)
            .collect()
    }
}
