//! Gain, saturation and resampling.

/// Largest absolute sample value.
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max)
}

/// Scales the buffer so its peak sits at `target_db` dBFS.
///
/// Silent buffers are left untouched.
pub fn normalize(samples: &mut [f64], target_db: f64) {
    let target_peak = 10.0_f64.powf(target_db / 20.0);
    let current_peak = peak(samples);

    if current_peak > 0.0 {
        let gain = target_peak / current_peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Gentle tanh waveshaping: `tanh(x (1 + a)) / (1 + a / 2)`.
pub fn soft_saturate(samples: &mut [f64], amount: f64) {
    let drive = 1.0 + amount;
    let makeup = 1.0 + amount * 0.5;
    for sample in samples.iter_mut() {
        *sample = (*sample * drive).tanh() / makeup;
    }
}

/// Shifts pitch by resampling with linear interpolation.
///
/// Output length equals input length; reading past the end yields silence.
pub fn pitch_shift(samples: &[f64], semitones: f64) -> Vec<f64> {
    if semitones == 0.0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = 2.0_f64.powf(semitones / 12.0);
    let last = samples.len() - 1;
    (0..samples.len())
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            if idx > last {
                0.0
            } else if idx == last {
                samples[last]
            } else {
                let frac = pos - idx as f64;
                samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_to_minus_3db() {
        let mut samples = vec![0.1, -0.2, 0.05];
        normalize(&mut samples, -3.0);
        let target = 10.0_f64.powf(-3.0 / 20.0);
        assert!((peak(&samples) - target).abs() < 1e-12);
        assert!((samples[1] + target).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_silence() {
        let mut samples = vec![0.0; 8];
        normalize(&mut samples, -3.0);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_soft_saturate_bounded() {
        let mut samples = vec![-10.0, -1.0, 0.0, 1.0, 10.0];
        soft_saturate(&mut samples, 0.25);
        assert!(samples.iter().all(|s| s.abs() < 1.0));
        assert_eq!(samples[2], 0.0);
        assert!((samples[0] + samples[4]).abs() < 1e-12);
    }

    #[test]
    fn test_pitch_shift_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(pitch_shift(&samples, 0.0), samples);
    }

    #[test]
    fn test_pitch_shift_octave_up_skips_samples() {
        let samples: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let shifted = pitch_shift(&samples, 12.0);
        assert_eq!(shifted.len(), 8);
        assert!((shifted[1] - 2.0).abs() < 1e-9);
        assert!((shifted[3] - 6.0).abs() < 1e-9);
        assert_eq!(shifted[4], 0.0);
    }

    #[test]
    fn test_pitch_shift_down_interpolates() {
        let samples = vec![0.0, 1.0, 0.0, -1.0];
        let shifted = pitch_shift(&samples, -12.0);
        assert_eq!(shifted.len(), 4);
        assert!((shifted[1] - 0.5).abs() < 1e-9);
        assert!((shifted[2] - 1.0).abs() < 1e-9);
    }
}
