//! Oscillators.

use std::f64::consts::TAU;

/// Frequency sweep curve types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepCurve {
    /// Linear interpolation.
    Linear,
    /// Exponential interpolation (linear in log-frequency).
    Exponential,
}

impl SweepCurve {
    /// Interpolates between `start` and `end` at progress `t` in `[0, 1]`.
    pub fn interpolate(&self, start: f64, end: f64, t: f64) -> f64 {
        match self {
            SweepCurve::Linear => start + (end - start) * t,
            SweepCurve::Exponential => {
                if start <= 0.0 || end <= 0.0 {
                    // Fall back to linear for non-positive values
                    start + (end - start) * t
                } else {
                    start * (end / start).powf(t)
                }
            }
        }
    }
}

/// Integrates instantaneous frequency into phase.
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    phase: f64,
    sample_rate: f64,
}

impl PhaseAccumulator {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Advances by one sample at `freq` Hz and returns the new phase in radians.
    #[inline]
    pub fn advance(&mut self, freq: f64) -> f64 {
        self.phase += TAU * freq / self.sample_rate;
        if self.phase >= TAU * 1024.0 {
            self.phase %= TAU;
        }
        self.phase
    }
}

/// `sin(2 pi f t)`.
#[inline]
pub fn sine_at(t: f64, freq: f64) -> f64 {
    (TAU * freq * t).sin()
}

/// Exponential pitch sweep over `num_samples` samples.
///
/// Frequency moves linearly in log space from `start_freq` to `end_freq`;
/// phase is the running sum of instantaneous frequency, so the sweep has no
/// discontinuities.
pub fn pitch_sweep(
    num_samples: usize,
    start_freq: f64,
    end_freq: f64,
    sample_rate: f64,
) -> Vec<f64> {
    let divisor = if num_samples > 1 { num_samples - 1 } else { 1 } as f64;
    let mut acc = PhaseAccumulator::new(sample_rate);
    (0..num_samples)
        .map(|i| {
            let freq =
                SweepCurve::Exponential.interpolate(start_freq, end_freq, i as f64 / divisor);
            acc.advance(freq).sin()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_curve_exponential() {
        let curve = SweepCurve::Exponential;
        assert!((curve.interpolate(100.0, 400.0, 0.0) - 100.0).abs() < 0.01);
        // Geometric mean at 0.5
        assert!((curve.interpolate(100.0, 400.0, 0.5) - 200.0).abs() < 1e-9);
        assert!((curve.interpolate(100.0, 400.0, 1.0) - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_sweep_curve_linear_fallback() {
        let curve = SweepCurve::Exponential;
        assert!((curve.interpolate(0.0, 100.0, 0.5) - 50.0).abs() < 1e-9);
        assert!((SweepCurve::Linear.interpolate(100.0, 200.0, 0.5) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_accumulator() {
        let mut acc = PhaseAccumulator::new(4.0);
        let p = acc.advance(1.0);
        assert!((p - TAU / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pitch_sweep_bounded() {
        let out = pitch_sweep(4410, 880.0, 440.0, 44100.0);
        assert_eq!(out.len(), 4410);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_constant_sweep_matches_sine_frequency() {
        // A flat sweep at fs/4 cycles through four phases.
        let out = pitch_sweep(4, 1.0, 1.0, 4.0);
        assert!((out[0] - 1.0).abs() < 1e-9);
        assert!(out[1].abs() < 1e-9);
        assert!((out[2] + 1.0).abs() < 1e-9);
    }
}
