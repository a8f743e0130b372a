//! Signal primitives the sound catalog is built from.
//!
//! Everything here is a pure function of its inputs (plus an explicit RNG
//! for noise), so catalog sounds are reproducible sample for sample.

pub mod envelope;
pub mod noise;
pub mod oscillator;
pub mod processing;

pub use envelope::{exp_decay, smooth_envelope};
pub use noise::{filtered_noise, swept_noise};
pub use oscillator::{PhaseAccumulator, SweepCurve};
pub use processing::{normalize, peak, pitch_shift, soft_saturate};

/// A sampled time axis for one sound.
///
/// `n = floor(duration * sample_rate)` samples spread evenly over
/// `[0, duration]`, first and last sample included.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    sample_rate: f64,
    duration: f64,
    times: Vec<f64>,
}

impl TimeGrid {
    /// Builds the grid for a sound of `duration` seconds.
    pub fn new(duration: f64, sample_rate: f64) -> Self {
        let n = (duration * sample_rate).max(0.0) as usize;
        let times = match n {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => {
                let step = duration / (n - 1) as f64;
                (0..n).map(|i| i as f64 * step).collect()
            }
        };
        Self {
            sample_rate,
            duration,
            times,
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Pure sine at a fixed frequency.
    pub fn sine(&self, freq: f64) -> Vec<f64> {
        self.times.iter().map(|&t| oscillator::sine_at(t, freq)).collect()
    }

    /// Exponential pitch sweep from `start` to `end` Hz.
    pub fn sweep(&self, start: f64, end: f64) -> Vec<f64> {
        oscillator::pitch_sweep(self.len(), start, end, self.sample_rate)
    }

    /// `exp(-rate * t)`.
    pub fn decay(&self, rate: f64) -> Vec<f64> {
        exp_decay(&self.times, rate)
    }

    /// Click-free attack/release envelope.
    pub fn envelope(&self, attack_ms: f64, release_ms: f64) -> Vec<f64> {
        smooth_envelope(self.len(), attack_ms, release_ms, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_length_truncates() {
        let grid = TimeGrid::new(0.08, 44100.0);
        assert_eq!(grid.len(), 3528);
        let grid = TimeGrid::new(0.0301, 1000.0);
        assert_eq!(grid.len(), 30);
    }

    #[test]
    fn test_grid_endpoints() {
        let grid = TimeGrid::new(0.5, 100.0);
        assert_eq!(grid.times()[0], 0.0);
        assert!((grid.times()[grid.len() - 1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_grid_degenerate() {
        assert!(TimeGrid::new(0.0, 44100.0).is_empty());
        assert!(TimeGrid::new(-1.0, 44100.0).is_empty());
        assert_eq!(TimeGrid::new(1.5, 1.0).times(), &[0.0]);
    }

    #[test]
    fn test_grid_layers_share_length() {
        let grid = TimeGrid::new(0.1, 8000.0);
        assert_eq!(grid.sine(440.0).len(), grid.len());
        assert_eq!(grid.sweep(440.0, 880.0).len(), grid.len());
        assert_eq!(grid.decay(10.0).len(), grid.len());
        assert_eq!(grid.envelope(5.0, 20.0).len(), grid.len());
    }
}
