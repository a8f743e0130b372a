//! Project-level SFX generation.
//!
//! For every scene in a project's storyboard the orchestrator locates the
//! scene's timeline source, runs the timeline, narration and (optionally)
//! semantic analyzers, aggregates their moments, and turns the survivors
//! into cues. Scenes are independent and run in parallel; the storyboard is
//! written once, after every scene has finished.
//!
//! Project layout:
//!
//! ```text
//! <project>/
//!   storyboard/storyboard.json
//!   voiceover/voiceover_manifest.json   (optional)
//!   scenes/*.tsx
//!   sfx/                                (generated audio)
//!   cuecraft.json                       (optional config)
//! ```

mod discovery;
mod result;
mod voiceover;

pub use discovery::{pascal_case, scene_name, title_case, SceneLocator};
pub use result::{SceneReport, ScenePreview, SfxGenerationResult};
pub use voiceover::{VoiceoverManifest, VoiceoverScene};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use cuecraft_analysis::semantic::client_from_config;
use cuecraft_analysis::{
    aggregate_moments, estimate_word_timestamps, NarrationAnalyzer, SceneAnalyzer,
    SemanticAnalyzer, SemanticClient, SemanticRequest,
};
use cuecraft_backend_audio::SoundLibrary;
use cuecraft_spec::{
    CueMode, PipelineConfig, PipelineError, SceneAnalysisResult, SfxCue, SoundMoment,
    WordTimestamp,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cues::{strategy_for, CueStrategy};
use crate::storyboard::{SceneEntry, Storyboard, StoryboardResult};

/// Duration assumed for a scene whose source cannot be analyzed.
const FALLBACK_SCENE_SECONDS: f64 = 10.0;

/// Average spoken word length used when the voiceover has no timings.
const ESTIMATED_WORD_SECONDS: f64 = 0.3;

/// Project configuration file name.
pub const CONFIG_FILE: &str = "cuecraft.json";

/// Runs the SFX pipeline over one project.
pub struct Orchestrator {
    project_dir: PathBuf,
    config: PipelineConfig,
    locator: SceneLocator,
    semantic: Option<Box<dyn SemanticClient>>,
}

/// Everything one scene produced.
struct SceneOutcome {
    report: SceneReport,
    cues: Option<Vec<SfxCue>>,
    error: Option<String>,
}

impl Orchestrator {
    /// Creates an orchestrator. The semantic stream is enabled when the
    /// config says so.
    pub fn new(project_dir: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        let project_dir = project_dir.into();
        let locator = SceneLocator::new(&project_dir).with_search_dirs(&config.scene_search_dirs);
        let semantic = config
            .semantic
            .enabled
            .then(|| client_from_config(&config.semantic));
        Self {
            project_dir,
            config,
            locator,
            semantic,
        }
    }

    /// Uses `client` for the semantic stream, enabling it.
    pub fn with_semantic_client(mut self, client: Box<dyn SemanticClient>) -> Self {
        self.semantic = Some(client);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn storyboard_path(&self) -> PathBuf {
        self.project_dir.join("storyboard").join("storyboard.json")
    }

    pub fn sfx_dir(&self) -> PathBuf {
        self.project_dir.join("sfx")
    }

    pub fn voiceover_manifest_path(&self) -> PathBuf {
        self.project_dir
            .join("voiceover")
            .join("voiceover_manifest.json")
    }

    /// The storyboard's project name, or the directory name without one.
    pub fn project_id(&self) -> String {
        match Storyboard::load(&self.storyboard_path()) {
            Ok(storyboard) => storyboard.project_info().project,
            Err(_) => self.dir_name(),
        }
    }

    fn dir_name(&self) -> String {
        self.project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Timeline analysis of every storyboard scene, optionally restricted to
    /// the given scene types.
    pub fn analyze_scenes(
        &self,
        scene_types: Option<&[String]>,
    ) -> StoryboardResult<Vec<SceneAnalysisResult>> {
        let storyboard = Storyboard::load(&self.storyboard_path())?;
        let project_id = storyboard.project_info().project;

        Ok(storyboard
            .scene_entries()
            .par_iter()
            .filter(|entry| scene_types.map_or(true, |types| types.contains(&entry.scene_type)))
            .map(|entry| self.analyze_entry(entry, &project_id))
            .collect())
    }

    /// Per-scene timeline summaries keyed by scene id.
    pub fn preview_analysis(&self) -> StoryboardResult<BTreeMap<String, ScenePreview>> {
        Ok(self
            .analyze_scenes(None)?
            .iter()
            .map(|analysis| (analysis.scene_id.clone(), ScenePreview::from(analysis)))
            .collect())
    }

    /// Timeline moments of one scene; empty when the scene is unknown.
    pub fn scene_moments(&self, scene_id: &str) -> StoryboardResult<Vec<SoundMoment>> {
        Ok(self
            .analyze_scenes(None)?
            .into_iter()
            .find(|analysis| analysis.scene_id == scene_id)
            .map(|analysis| analysis.moments)
            .unwrap_or_default())
    }

    /// Runs the full pipeline.
    ///
    /// Per-scene failures are collected into the result and never stop the
    /// batch. With `dry_run`, nothing is written: no storyboard update, no
    /// library sounds, no custom cue files.
    pub fn generate(&self, dry_run: bool) -> SfxGenerationResult {
        let storyboard_path = self.storyboard_path();
        let mut storyboard = match Storyboard::load(&storyboard_path) {
            Ok(storyboard) => storyboard,
            Err(e) => {
                warn!(error = %e, "cannot generate without a storyboard");
                return SfxGenerationResult::failed(self.dir_name(), e.to_string());
            }
        };
        let project_id = storyboard.project_info().project;
        let voiceover = self.load_voiceover();

        let strategy = strategy_for(
            self.config.mode,
            &self.sfx_dir(),
            self.config.sample_rate,
            dry_run,
        );
        info!(
            project = %project_id,
            mode = %self.config.mode,
            semantic = self.semantic.is_some(),
            dry_run,
            "generating sfx cues"
        );

        let outcomes: Vec<SceneOutcome> = storyboard
            .scene_entries()
            .par_iter()
            .map(|entry| {
                self.process_scene(
                    entry,
                    &project_id,
                    &storyboard,
                    voiceover.as_ref(),
                    strategy.as_ref(),
                )
            })
            .collect();

        let mut result = SfxGenerationResult {
            project_id,
            scenes_analyzed: outcomes.len(),
            dry_run,
            ..Default::default()
        };
        let mut scene_cues: BTreeMap<String, Vec<SfxCue>> = BTreeMap::new();

        for outcome in outcomes {
            result.moments_detected += outcome.report.raw_moments();
            if let Some(error) = outcome.error {
                result.errors.push(error);
            }
            if let Some(cues) = outcome.cues {
                result.cues_generated += cues.len();
                scene_cues.insert(outcome.report.scene_id.clone(), cues);
            }
            result.scene_reports.push(outcome.report);
        }
        if dry_run {
            info!(cues = result.cues_generated, "dry run, storyboard untouched");
            return result;
        }

        if self.config.mode == CueMode::Library {
            if let Err(e) = self.ensure_library_sounds(&scene_cues) {
                result.errors.push(e.to_string());
            }
        }

        result.scenes_updated = storyboard.update_all_scenes(&scene_cues, self.config.write_mode);
        if let Err(e) = storyboard.save(self.config.backup) {
            result
                .errors
                .push(format!("Failed to update storyboard: {}", e));
        }

        info!(
            scenes = result.scenes_analyzed,
            moments = result.moments_detected,
            cues = result.cues_generated,
            errors = result.errors.len(),
            "sfx generation complete"
        );
        result
    }

    fn load_voiceover(&self) -> Option<VoiceoverManifest> {
        match VoiceoverManifest::load(&self.voiceover_manifest_path()) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable voiceover manifest");
                None
            }
        }
    }

    /// Renders any library sound the cues reference that is not on disk yet.
    fn ensure_library_sounds(
        &self,
        scene_cues: &BTreeMap<String, Vec<SfxCue>>,
    ) -> Result<(), PipelineError> {
        let names: BTreeSet<&str> = scene_cues
            .values()
            .flatten()
            .map(|cue| cue.sound.as_str())
            .collect();
        if names.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = names.into_iter().collect();
        let library = SoundLibrary::new(self.sfx_dir()).with_sample_rate(self.config.sample_rate);
        let generated = library.ensure(&names).map_err(PipelineError::from_stage)?;
        if !generated.is_empty() {
            info!(sounds = ?generated, "rendered missing library sounds");
        }
        Ok(())
    }

    /// Timeline analysis for one storyboard scene. Never fails: a missing
    /// file or analyzer error becomes a note on an empty result.
    fn analyze_entry(&self, entry: &SceneEntry, project_id: &str) -> SceneAnalysisResult {
        let fallback_frames = seconds_to_frames(
            entry.audio_duration_seconds.unwrap_or(FALLBACK_SCENE_SECONDS),
            self.config.fps,
        );

        let Some(path) = self.locator.find(&entry.scene_type, project_id) else {
            debug!(scene_id = %entry.id, scene_type = %entry.scene_type, "scene file not found");
            return SceneAnalysisResult::new(&entry.id, &entry.scene_type, fallback_frames)
                .with_note("Scene file not found");
        };

        match SceneAnalyzer::new(self.config.fps).analyze_scene(&path) {
            Ok(mut analysis) => {
                analysis.scene_id = entry.id.clone();
                if !entry.scene_type.is_empty() {
                    analysis.scene_type = entry.scene_type.clone();
                }
                analysis
            }
            Err(e) => {
                warn!(scene_id = %entry.id, error = %e, "scene analysis failed");
                let mut analysis =
                    SceneAnalysisResult::new(&entry.id, &entry.scene_type, fallback_frames)
                        .with_note(format!("Analysis error: {}", e));
                analysis.source_file = Some(path);
                analysis
            }
        }
    }

    fn process_scene(
        &self,
        entry: &SceneEntry,
        project_id: &str,
        storyboard: &Storyboard,
        voiceover: Option<&VoiceoverManifest>,
        strategy: &dyn CueStrategy,
    ) -> SceneOutcome {
        let fps = self.config.fps;
        let analysis = self.analyze_entry(entry, project_id);

        let duration_frames = if entry.audio_duration_seconds.map_or(false, |s| s > 0.0) {
            storyboard.scene_duration_frames(&entry.id, fps)
        } else {
            analysis.duration_frames
        };

        let (narration, timestamps) = narration_for(entry, voiceover);
        let narration_moments = if narration.trim().is_empty() {
            Vec::new()
        } else {
            NarrationAnalyzer::new(fps).analyze(&narration, &timestamps, Some(&entry.scene_type))
        };

        let semantic_moments = match &self.semantic {
            Some(client) => {
                let request = SemanticRequest::new(
                    &entry.id,
                    &entry.scene_type,
                    narration.as_str(),
                    f64::from(duration_frames) / f64::from(fps.max(1)),
                );
                SemanticAnalyzer::from_config(&self.config.semantic, fps)
                    .analyze(client.as_ref(), &request)
            }
            None => Vec::new(),
        };

        let aggregated = aggregate_moments(
            &analysis.moments,
            &narration_moments,
            &semantic_moments,
            &self.config.aggregation,
            Some(duration_frames),
            fps,
        );

        let mut report = SceneReport {
            scene_id: entry.id.clone(),
            scene_type: analysis.scene_type.clone(),
            source_file: analysis
                .source_file
                .as_ref()
                .map(|p| p.display().to_string()),
            duration_frames,
            code_moments: analysis.moments.len(),
            narration_moments: narration_moments.len(),
            semantic_moments: semantic_moments.len(),
            aggregated_moments: aggregated.len(),
            cues: 0,
            notes: analysis.analysis_notes.clone(),
        };

        match strategy.generate(&entry.id, &aggregated) {
            Ok(cues) => {
                report.cues = cues.len();
                info!(
                    scene_id = %entry.id,
                    moments = aggregated.len(),
                    cues = cues.len(),
                    "processed scene"
                );
                SceneOutcome {
                    report,
                    cues: Some(cues),
                    error: None,
                }
            }
            Err(e) => {
                warn!(scene_id = %entry.id, error = %e, "cue generation failed");
                let error = PipelineError::from_stage(e);
                SceneOutcome {
                    report,
                    cues: None,
                    error: Some(format!("[{}] {}: {}", error.code, entry.id, error.message)),
                }
            }
        }
    }
}

/// Narration text and word timings for a scene.
///
/// Text comes from the storyboard's `narration` field, falling back to the
/// voiceover words. Timings come from the voiceover, or are estimated when
/// there is text but no voiceover entry.
fn narration_for(
    entry: &SceneEntry,
    voiceover: Option<&VoiceoverManifest>,
) -> (String, Vec<WordTimestamp>) {
    let spoken = voiceover.and_then(|manifest| manifest.scene(&entry.id));
    let text = match (&entry.narration, spoken) {
        (Some(text), _) if !text.trim().is_empty() => text.clone(),
        (_, Some(scene)) => scene.spoken_text(),
        _ => String::new(),
    };
    let timestamps = match spoken {
        Some(scene) if !scene.word_timestamps.is_empty() => scene.word_timestamps.clone(),
        _ if !text.trim().is_empty() => estimate_word_timestamps(&text, ESTIMATED_WORD_SECONDS),
        _ => Vec::new(),
    };
    (text, timestamps)
}

fn seconds_to_frames(seconds: f64, fps: u32) -> u32 {
    let frames = (seconds * f64::from(fps)).trunc();
    if frames.is_finite() && frames > 0.0 {
        frames.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
