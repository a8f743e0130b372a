//! Custom-mode cues: one synthesized file per cue.

use std::path::{Path, PathBuf};

use cuecraft_backend_audio::rng::derive_variation_seed;
use cuecraft_backend_audio::{render_custom, AudioResult, CustomSoundRequest, SoundGenerator};
use cuecraft_spec::{calculate_volume, CueMode, SfxCue, SoundMoment, DEFAULT_SAMPLE_RATE};
use tracing::debug;

use super::{calculate_duration, calculate_pitch, cue_seed_key, cue_sound_name, CueStrategy};

/// Renders a unique sound per moment into `sfx_dir/{scene}_{kind}_{index}.wav`.
///
/// The variation seed is a pure function of scene id, kind, index and frame,
/// so re-running on unchanged moments rewrites byte-identical files.
#[derive(Debug, Clone)]
pub struct CustomCues {
    sfx_dir: PathBuf,
    sample_rate: u32,
    dry_run: bool,
}

impl CustomCues {
    pub fn new(sfx_dir: impl Into<PathBuf>) -> Self {
        Self {
            sfx_dir: sfx_dir.into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            dry_run: false,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Renders but does not write files.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn sfx_dir(&self) -> &Path {
        &self.sfx_dir
    }

    /// The render request for the `index`-th of `total` moments.
    pub fn request_for(
        &self,
        scene_id: &str,
        moment: &SoundMoment,
        index: usize,
        total: usize,
    ) -> AudioResult<CustomSoundRequest> {
        let kind = moment.kind();
        let generator: SoundGenerator = kind.custom_generator().parse()?;
        Ok(CustomSoundRequest {
            generator,
            duration: calculate_duration(kind, moment.intensity()),
            intensity: moment.intensity(),
            pitch_semitones: calculate_pitch(kind, index, total),
            seed: derive_variation_seed(&cue_seed_key(scene_id, kind, index, moment.frame())),
        })
    }
}

impl CueStrategy for CustomCues {
    fn mode(&self) -> CueMode {
        CueMode::Custom
    }

    fn generate(&self, scene_id: &str, moments: &[SoundMoment]) -> AudioResult<Vec<SfxCue>> {
        let mut cues = Vec::with_capacity(moments.len());

        for (index, moment) in moments.iter().enumerate() {
            let request = self.request_for(scene_id, moment, index, moments.len())?;
            let wav = render_custom(&request, self.sample_rate)?;

            let name = cue_sound_name(scene_id, moment.kind(), index);
            if !self.dry_run {
                let path = self.sfx_dir.join(format!("{}.wav", name));
                wav.write_to(&path)?;
                debug!(
                    sound = %name,
                    seed = request.seed,
                    pcm_hash = %wav.pcm_hash,
                    "wrote custom cue"
                );
            }

            cues.push(
                SfxCue::new(
                    name,
                    moment.frame(),
                    calculate_volume(moment.kind(), moment.intensity()),
                )
                .with_duration_frames(moment.duration_frames()),
            );
        }

        Ok(cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecraft_spec::MomentKind;

    fn moments() -> Vec<SoundMoment> {
        vec![
            SoundMoment::new(MomentKind::ElementAppear, 20, 0.9, "title").with_intensity(0.6),
            SoundMoment::new(MomentKind::Highlight, 75, 0.8, "glow").with_intensity(0.4),
            SoundMoment::new(MomentKind::Reveal, 150, 0.95, "number").with_intensity(1.0),
        ]
    }

    #[test]
    fn test_custom_cues_write_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = CustomCues::new(dir.path()).with_sample_rate(22050);
        let cues = strategy.generate("intro", &moments()).unwrap();

        let names: Vec<&str> = cues.iter().map(|c| c.sound.as_str()).collect();
        assert_eq!(
            names,
            vec!["intro_element_appear_0", "intro_highlight_1", "intro_reveal_2"]
        );
        for name in names {
            assert!(dir.path().join(format!("{}.wav", name)).is_file());
        }
        assert_eq!(cues[2].frame, 150);
        assert_eq!(cues[2].volume(), 0.12);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = CustomCues::new(dir.path().join("sfx")).dry_run(true);
        let cues = strategy.generate("intro", &moments()).unwrap();
        assert_eq!(cues.len(), 3);
        assert!(!dir.path().join("sfx").exists());
    }

    #[test]
    fn test_request_mapping() {
        let strategy = CustomCues::new("sfx");
        let moment = SoundMoment::new(MomentKind::Highlight, 75, 0.8, "glow").with_intensity(0.5);
        let request = strategy.request_for("intro", &moment, 1, 3).unwrap();

        assert_eq!(request.generator, SoundGenerator::CacheClick);
        assert!((request.duration - 0.1).abs() < 1e-9);
        assert_eq!(request.seed, derive_variation_seed("intro_highlight_1_75"));
        assert!((request.pitch_semitones - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_seed_depends_on_frame() {
        let strategy = CustomCues::new("sfx");
        let a = SoundMoment::new(MomentKind::Reveal, 100, 0.9, "");
        let b = SoundMoment::new(MomentKind::Reveal, 101, 0.9, "");
        let ra = strategy.request_for("s", &a, 0, 1).unwrap();
        let rb = strategy.request_for("s", &b, 0, 1).unwrap();
        assert_ne!(ra.seed, rb.seed);
    }
}
