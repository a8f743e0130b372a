//! Library-mode cues.

use cuecraft_backend_audio::AudioResult;
use cuecraft_spec::{calculate_volume, CueMode, SfxCue, SoundMoment};

use super::CueStrategy;

/// Maps each moment to the shared library sound for its kind.
///
/// Generation is pure; making sure the referenced sounds exist on disk is
/// left to the caller (see [`cuecraft_backend_audio::SoundLibrary::ensure`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryCues;

impl CueStrategy for LibraryCues {
    fn mode(&self) -> CueMode {
        CueMode::Library
    }

    fn generate(&self, _scene_id: &str, moments: &[SoundMoment]) -> AudioResult<Vec<SfxCue>> {
        Ok(moments
            .iter()
            .map(|moment| {
                SfxCue::new(
                    moment.kind().library_sound(),
                    moment.frame(),
                    calculate_volume(moment.kind(), moment.intensity()),
                )
                .with_duration_frames(moment.duration_frames())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecraft_spec::MomentKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_library_cues() {
        let moments = vec![
            SoundMoment::new(MomentKind::Highlight, 40, 0.8, "glow").with_intensity(1.0),
            SoundMoment::new(MomentKind::Counter, 90, 0.9, "count")
                .with_intensity(0.0)
                .with_duration_frames(45),
        ];
        let cues = LibraryCues.generate("intro", &moments).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].sound, "ui_pop");
        assert_eq!(cues[0].frame, 40);
        assert_eq!(cues[0].volume(), 0.07);
        assert_eq!(cues[0].duration_frames, None);

        assert_eq!(cues[1].sound, "counter_sweep");
        assert_eq!(cues[1].volume(), 0.07);
        assert_eq!(cues[1].duration_frames, Some(45));
    }

    #[test]
    fn test_no_moments_no_cues() {
        assert!(LibraryCues.generate("intro", &[]).unwrap().is_empty());
    }
}
