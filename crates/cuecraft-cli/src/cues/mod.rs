//! Cue generation.
//!
//! Turns a scene's aggregated moments into [`SfxCue`]s. Two strategies share
//! the volume, pitch and duration helpers below:
//!
//! - [`LibraryCues`] points each cue at one of the pre-rendered library sounds
//! - [`CustomCues`] renders a unique, deterministically seeded WAV per cue

mod custom;
mod library;

pub use custom::CustomCues;
pub use library::LibraryCues;

use std::path::Path;

use cuecraft_backend_audio::AudioResult;
use cuecraft_spec::{CueMode, MomentKind, SfxCue, SoundMoment};

/// Pitch offsets never leave one octave either side.
const PITCH_LIMIT: f64 = 12.0;

/// Progress through a scene at which the pitch arc peaks.
const PITCH_PEAK: f64 = 0.67;

/// Strategy for turning moments into cues.
pub trait CueStrategy: Send + Sync {
    /// The mode this strategy implements.
    fn mode(&self) -> CueMode;

    /// Generates one cue per moment, in moment order.
    fn generate(&self, scene_id: &str, moments: &[SoundMoment]) -> AudioResult<Vec<SfxCue>>;
}

/// Builds the strategy for a mode.
///
/// Custom mode writes into `sfx_dir` unless `dry_run` is set.
pub fn strategy_for(
    mode: CueMode,
    sfx_dir: &Path,
    sample_rate: u32,
    dry_run: bool,
) -> Box<dyn CueStrategy> {
    match mode {
        CueMode::Library => Box::new(LibraryCues),
        CueMode::Custom => Box::new(
            CustomCues::new(sfx_dir)
                .with_sample_rate(sample_rate)
                .dry_run(dry_run),
        ),
    }
}

/// Pitch offset in semitones for the `index`-th of `total` cues.
///
/// Cues follow an arc through the scene: starting 2 semitones low, peaking
/// 2 high two thirds of the way in, then settling back. Reveals sit 2 higher,
/// successes 1 higher and warnings 3 lower. A lone cue stays at 0.
pub fn calculate_pitch(kind: MomentKind, index: usize, total: usize) -> f64 {
    if total <= 1 {
        return 0.0;
    }

    let progress = index as f64 / (total - 1) as f64;
    let mut pitch = if progress < PITCH_PEAK {
        -2.0 + progress * 6.0
    } else {
        2.0 - (progress - PITCH_PEAK) * 6.0
    };

    match kind {
        MomentKind::Reveal => pitch += 2.0,
        MomentKind::Warning => pitch -= 3.0,
        MomentKind::Success => pitch += 1.0,
        _ => {}
    }

    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Rendered length in seconds: the kind's base duration scaled into
/// `[0.8, 1.2]` by intensity.
pub fn calculate_duration(kind: MomentKind, intensity: f64) -> f64 {
    kind.base_duration_seconds() * (0.8 + 0.4 * intensity.clamp(0.0, 1.0))
}

/// File stem of a custom cue's sound.
pub fn cue_sound_name(scene_id: &str, kind: MomentKind, index: usize) -> String {
    format!("{}_{}_{}", scene_id, kind, index)
}

/// Key hashed into a custom cue's variation seed.
pub fn cue_seed_key(scene_id: &str, kind: MomentKind, index: usize, frame: u32) -> String {
    format!("{}_{}_{}_{}", scene_id, kind, index, frame)
}
