//! Voiceover manifest written by the TTS stage.

use std::path::Path;

use anyhow::{Context, Result};
use cuecraft_spec::WordTimestamp;
use serde::{Deserialize, Serialize};

/// One narrated scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceoverScene {
    pub scene_id: String,
    pub audio_path: String,
    pub duration_seconds: f64,
    pub word_timestamps: Vec<WordTimestamp>,
}

impl VoiceoverScene {
    /// The narration as the TTS engine spoke it.
    pub fn spoken_text(&self) -> String {
        self.word_timestamps
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `voiceover/voiceover_manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceoverManifest {
    pub scenes: Vec<VoiceoverScene>,
    pub total_duration_seconds: f64,
    pub output_dir: String,
}

impl VoiceoverManifest {
    /// Loads a manifest. `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read voiceover manifest: {}", path.display()))?;
        let manifest = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse voiceover manifest: {}", path.display()))?;
        Ok(Some(manifest))
    }

    pub fn scene(&self, scene_id: &str) -> Option<&VoiceoverScene> {
        self.scenes.iter().find(|s| s.scene_id == scene_id)
    }
}
