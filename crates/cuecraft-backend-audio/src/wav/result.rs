//! Rendered WAV buffer plus its identity hash.

use std::path::Path;

use super::format::WavFormat;
use super::writer::{pcm_hash, samples_to_pcm16, write_wav_to_vec};

/// Result of WAV file generation.
#[derive(Debug, Clone)]
pub struct WavResult {
    /// Complete WAV file bytes.
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of the PCM payload only.
    pub pcm_hash: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
}

impl WavResult {
    /// Creates a WavResult from mono samples.
    pub fn from_mono(samples: &[f64], sample_rate: u32) -> Self {
        let pcm = samples_to_pcm16(samples);
        let pcm_hash = pcm_hash(&pcm);
        let wav_data = write_wav_to_vec(&WavFormat::mono(sample_rate), &pcm);

        Self {
            wav_data,
            pcm_hash,
            sample_rate,
            num_samples: samples.len(),
        }
    }

    /// Returns the duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }

    /// Writes the WAV bytes to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, &self.wav_data)
    }
}
