//! Per-cue custom sound rendering.
//!
//! A custom cue is a catalog generator rendered at a cue-specific duration,
//! pitch and drive, with small seeded variation so no two cues in a video
//! sound identical while re-runs stay byte-identical.

use rand::Rng;
use tracing::debug;

use crate::catalog::{validate_render_params, SoundGenerator, TARGET_PEAK_DB};
use crate::error::{AudioError, AudioResult};
use crate::rng::{create_rng, derive_component_seed};
use crate::synthesis::{normalize, pitch_shift, soft_saturate};
use crate::wav::WavResult;

/// Largest random detune added on top of the requested pitch.
pub const MAX_DETUNE_SEMITONES: f64 = 0.3;

/// Pitch offsets are clamped to one octave either way.
pub const MAX_PITCH_SEMITONES: f64 = 12.0;

/// Everything needed to render one custom cue.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSoundRequest {
    pub generator: SoundGenerator,
    /// Length in seconds.
    pub duration: f64,
    /// Moment intensity in `[0, 1]`; raises saturation drive.
    pub intensity: f64,
    /// Pitch offset before detune.
    pub pitch_semitones: f64,
    /// Variation seed.
    pub seed: u32,
}

/// Renders a custom cue to a WAV buffer.
pub fn render_custom(request: &CustomSoundRequest, sample_rate: u32) -> AudioResult<WavResult> {
    validate_render_params(request.duration, sample_rate)?;
    if !request.intensity.is_finite() {
        return Err(AudioError::invalid_param("intensity", "must be finite"));
    }
    if !request.pitch_semitones.is_finite() {
        return Err(AudioError::invalid_param("pitch_semitones", "must be finite"));
    }

    let mut rng = create_rng(request.seed);
    let raw = request
        .generator
        .synthesize(request.duration, sample_rate, &mut rng);
    if raw.is_empty() {
        return Err(AudioError::InvalidDuration {
            duration: request.duration,
        });
    }

    let mut detune_rng = create_rng(derive_component_seed(request.seed, "detune"));
    let detune = detune_rng.gen_range(-MAX_DETUNE_SEMITONES..=MAX_DETUNE_SEMITONES);
    let semitones =
        (request.pitch_semitones + detune).clamp(-MAX_PITCH_SEMITONES, MAX_PITCH_SEMITONES);

    let mut samples = pitch_shift(&raw, semitones);
    soft_saturate(&mut samples, 0.1 + 0.2 * request.intensity.clamp(0.0, 1.0));
    normalize(&mut samples, TARGET_PEAK_DB);

    debug!(
        generator = request.generator.name(),
        seed = request.seed,
        semitones,
        samples = samples.len(),
        "rendered custom sound"
    );

    Ok(WavResult::from_mono(&samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seed: u32) -> CustomSoundRequest {
        CustomSoundRequest {
            generator: SoundGenerator::RevealHit,
            duration: 0.5,
            intensity: 0.8,
            pitch_semitones: 2.0,
            seed,
        }
    }

    #[test]
    fn test_same_request_same_bytes() {
        let a = render_custom(&request(99), 44100).unwrap();
        let b = render_custom(&request(99), 44100).unwrap();
        assert_eq!(a.pcm_hash, b.pcm_hash);
        assert_eq!(a.wav_data, b.wav_data);
    }

    #[test]
    fn test_seed_changes_output() {
        let a = render_custom(&request(1), 44100).unwrap();
        let b = render_custom(&request(2), 44100).unwrap();
        assert_ne!(a.pcm_hash, b.pcm_hash);
    }

    #[test]
    fn test_length_follows_duration() {
        let wav = render_custom(&request(5), 22050).unwrap();
        assert_eq!(wav.num_samples, (0.5 * 22050.0) as usize);
        assert_eq!(wav.sample_rate, 22050);
    }

    #[test]
    fn test_extreme_pitch_is_clamped() {
        let mut req = request(3);
        req.pitch_semitones = 48.0;
        let wav = render_custom(&req, 44100).unwrap();
        assert_eq!(wav.num_samples, 22050);
    }

    #[test]
    fn test_rejects_nan_intensity() {
        let mut req = request(3);
        req.intensity = f64::NAN;
        assert!(matches!(
            render_custom(&req, 44100),
            Err(AudioError::InvalidParameter { .. })
        ));
    }
}
