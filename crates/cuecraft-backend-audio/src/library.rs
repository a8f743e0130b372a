//! The on-disk library of pre-rendered catalog sounds.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{SoundGenerator, SoundInfo};
use crate::error::AudioResult;
use crate::rng::derive_variation_seed;
use crate::wav::WavResult;

/// A directory holding one `<name>.wav` per catalog generator.
#[derive(Debug, Clone)]
pub struct SoundLibrary {
    sfx_dir: PathBuf,
    sample_rate: u32,
}

impl SoundLibrary {
    /// Creates a library rooted at `sfx_dir` rendering at 44.1 kHz.
    pub fn new(sfx_dir: impl Into<PathBuf>) -> Self {
        Self {
            sfx_dir: sfx_dir.into(),
            sample_rate: cuecraft_spec::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Overrides the render sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn sfx_dir(&self) -> &Path {
        &self.sfx_dir
    }

    /// Path of a named sound, whether or not it exists yet.
    pub fn sound_path(&self, name: &str) -> PathBuf {
        self.sfx_dir.join(format!("{}.wav", name))
    }

    /// Renders one catalog sound at its default duration and writes it.
    ///
    /// The seed is derived from the sound's name, so the library is identical
    /// on every machine.
    pub fn generate(&self, generator: SoundGenerator) -> AudioResult<WavResult> {
        let samples = generator.render(
            generator.default_duration(),
            self.sample_rate,
            derive_variation_seed(generator.name()),
        )?;
        let wav = WavResult::from_mono(&samples, self.sample_rate);
        let path = self.sound_path(generator.name());
        wav.write_to(&path)?;
        debug!(sound = generator.name(), path = %path.display(), "wrote library sound");
        Ok(wav)
    }

    /// Renders every catalog sound; returns the names written.
    pub fn generate_all(&self) -> AudioResult<Vec<&'static str>> {
        let mut generated = Vec::new();
        for generator in SoundGenerator::all() {
            self.generate(*generator)?;
            generated.push(generator.name());
        }
        info!(count = generated.len(), dir = %self.sfx_dir.display(), "generated sound library");
        Ok(generated)
    }

    /// Renders the named sounds that are missing on disk; returns those written.
    pub fn ensure(&self, names: &[&str]) -> AudioResult<Vec<&'static str>> {
        let mut generated = Vec::new();
        for name in names {
            if self.sound_exists(name) {
                continue;
            }
            let generator: SoundGenerator = name.parse()?;
            if generated.contains(&generator.name()) {
                continue;
            }
            self.generate(generator)?;
            generated.push(generator.name());
        }
        Ok(generated)
    }

    /// Names of every catalog sound.
    pub fn list_sounds(&self) -> Vec<&'static str> {
        SoundGenerator::all().iter().map(|g| g.name()).collect()
    }

    /// Manifest entry for a sound.
    pub fn info(&self, name: &str) -> Option<SoundInfo> {
        name.parse::<SoundGenerator>().ok().map(|g| g.info())
    }

    pub fn sound_exists(&self, name: &str) -> bool {
        self.sound_path(name).is_file()
    }

    /// Catalog sounds not yet rendered to disk.
    pub fn missing_sounds(&self) -> Vec<&'static str> {
        self.list_sounds()
            .into_iter()
            .filter(|name| !self.sound_exists(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lookup() {
        let lib = SoundLibrary::new("/tmp/unused");
        let info = lib.info("lock_click").unwrap();
        assert_eq!(info.description, "Clean click for things locking into place");
        assert_eq!(info.default_duration, 0.06);
        assert!(lib.info("kazoo").is_none());
    }

    #[test]
    fn test_sound_path() {
        let lib = SoundLibrary::new("/p/sfx");
        assert_eq!(lib.sound_path("ui_pop"), PathBuf::from("/p/sfx/ui_pop.wav"));
    }

    #[test]
    fn test_missing_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let lib = SoundLibrary::new(dir.path());
        assert_eq!(lib.missing_sounds().len(), 17);
    }
}
