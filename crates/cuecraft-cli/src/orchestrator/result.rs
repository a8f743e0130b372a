//! Orchestrator outputs.

use std::collections::BTreeMap;

use cuecraft_spec::{MomentKind, SceneAnalysisResult};
use serde::Serialize;

/// What happened to one scene during generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneReport {
    pub scene_id: String,
    pub scene_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Duration the aggregator used.
    pub duration_frames: u32,
    pub code_moments: usize,
    pub narration_moments: usize,
    pub semantic_moments: usize,
    /// Moments surviving aggregation.
    pub aggregated_moments: usize,
    pub cues: usize,
    pub notes: Vec<String>,
}

impl SceneReport {
    /// Moments detected across all streams, before aggregation.
    pub fn raw_moments(&self) -> usize {
        self.code_moments + self.narration_moments + self.semantic_moments
    }
}

/// Outcome of a full generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SfxGenerationResult {
    pub project_id: String,
    pub scenes_analyzed: usize,
    pub moments_detected: usize,
    pub cues_generated: usize,
    /// Whether each scene's cues landed in the storyboard. Empty on dry runs.
    pub scenes_updated: BTreeMap<String, bool>,
    pub errors: Vec<String>,
    pub scene_reports: Vec<SceneReport>,
    pub dry_run: bool,
}

impl SfxGenerationResult {
    /// A result that failed before any scene ran.
    pub fn failed(project_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    /// No errors, and every attempted storyboard update found its scene.
    pub fn success(&self) -> bool {
        self.errors.is_empty() && self.scenes_updated.values().all(|updated| *updated)
    }
}

/// Timeline-only summary of a scene, as shown by `cuecraft analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePreview {
    pub scene_type: String,
    pub duration_frames: u32,
    pub total_moments: usize,
    pub moments_by_type: BTreeMap<MomentKind, usize>,
    pub notes: Vec<String>,
}

impl From<&SceneAnalysisResult> for ScenePreview {
    fn from(analysis: &SceneAnalysisResult) -> Self {
        let mut moments_by_type = BTreeMap::new();
        for moment in &analysis.moments {
            *moments_by_type.entry(moment.kind()).or_insert(0) += 1;
        }
        Self {
            scene_type: analysis.scene_type.clone(),
            duration_frames: analysis.duration_frames,
            total_moments: analysis.moments.len(),
            moments_by_type,
            notes: analysis.analysis_notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecraft_spec::SoundMoment;

    #[test]
    fn test_success_requires_every_update() {
        let mut result = SfxGenerationResult::default();
        assert!(result.success());

        result.scenes_updated.insert("hook".to_string(), true);
        assert!(result.success());

        result.scenes_updated.insert("ghost".to_string(), false);
        assert!(!result.success());
    }

    #[test]
    fn test_failed_result() {
        let result = SfxGenerationResult::failed("demo", "Storyboard not found: x");
        assert!(!result.success());
        assert_eq!(result.scenes_analyzed, 0);
        assert_eq!(result.errors, vec!["Storyboard not found: x".to_string()]);
    }

    #[test]
    fn test_preview_counts_kinds() {
        let mut analysis = SceneAnalysisResult::new("hook", "demo/hook", 300);
        analysis.moments = vec![
            SoundMoment::new(MomentKind::ElementAppear, 10, 0.9, ""),
            SoundMoment::new(MomentKind::ElementAppear, 40, 0.9, ""),
            SoundMoment::new(MomentKind::Counter, 60, 0.9, ""),
        ];
        let preview = ScenePreview::from(&analysis.with_note("ok"));
        assert_eq!(preview.total_moments, 3);
        assert_eq!(preview.moments_by_type[&MomentKind::ElementAppear], 2);
        assert_eq!(preview.moments_by_type[&MomentKind::Counter], 1);
        assert_eq!(preview.notes, vec!["ok".to_string()]);

        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["moments_by_type"]["element_appear"], 2);
    }
}
