//! SFX cues: resolved playback instructions written into the storyboard.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::moment::MomentKind;

/// Hard ceiling on cue volume. Cues must never compete with narration.
pub const MAX_CUE_VOLUME: f64 = 0.15;

/// A sound to play at a frame.
///
/// Volume is clamped to `[0, MAX_CUE_VOLUME]` and rounded to three decimals
/// both when constructed and when deserialized, so a hand-edited storyboard
/// cannot smuggle in a loud cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SfxCue {
    /// Library sound name or generated file stem.
    pub sound: String,
    /// Scene-relative frame.
    pub frame: u32,
    #[serde(
        serialize_with = "serialize_volume",
        deserialize_with = "deserialize_volume"
    )]
    volume: f64,
    /// Optional sustain length in frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_frames: Option<u32>,
}

impl SfxCue {
    /// Creates a cue, clamping the volume.
    pub fn new(sound: impl Into<String>, frame: u32, volume: f64) -> Self {
        Self {
            sound: sound.into(),
            frame,
            volume: clamp_volume(volume),
            duration_frames: None,
        }
    }

    /// Sets the sustain length.
    pub fn with_duration_frames(mut self, duration: Option<u32>) -> Self {
        self.duration_frames = duration;
        self
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

/// Computes a cue volume from a moment's kind and intensity.
///
/// `base_volume(kind) * (0.7 + 0.3 * intensity)`, capped and rounded.
pub fn calculate_volume(kind: MomentKind, intensity: f64) -> f64 {
    let intensity = intensity.clamp(0.0, 1.0);
    clamp_volume(kind.base_volume() * (0.7 + 0.3 * intensity))
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        return 0.0;
    }
    let v = volume.clamp(0.0, MAX_CUE_VOLUME);
    (v * 1000.0).round() / 1000.0
}

fn serialize_volume<S: Serializer>(volume: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(clamp_volume(*volume))
}

fn deserialize_volume<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = f64::deserialize(d)?;
    Ok(clamp_volume(raw))
}
