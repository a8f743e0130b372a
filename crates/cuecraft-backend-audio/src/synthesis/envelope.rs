//! Amplitude envelopes.

use std::f64::consts::PI;

/// Smooth attack/release envelope with no clicks.
///
/// The attack is a raised-cosine ramp over `attack_ms`; the last
/// `release_ms` are multiplied by `exp(-3 i / release_samples)`. A segment
/// is skipped when it is zero length or not shorter than the whole buffer.
pub fn smooth_envelope(
    length: usize,
    attack_ms: f64,
    release_ms: f64,
    sample_rate: f64,
) -> Vec<f64> {
    let attack = (attack_ms * sample_rate / 1000.0).max(0.0) as usize;
    let release = (release_ms * sample_rate / 1000.0).max(0.0) as usize;

    let mut env = vec![1.0; length];

    if attack > 0 && attack < length {
        for (i, v) in env.iter_mut().take(attack).enumerate() {
            *v = 0.5 * (1.0 - (PI * i as f64 / attack as f64).cos());
        }
    }

    if release > 0 && release < length {
        let start = length - release;
        for (i, v) in env[start..].iter_mut().enumerate() {
            *v *= (-3.0 * i as f64 / release as f64).exp();
        }
    }

    env
}

/// `exp(-rate * t)` for each time in `times`.
pub fn exp_decay(times: &[f64], rate: f64) -> Vec<f64> {
    times.iter().map(|&t| (-rate * t).exp()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_starts_silent() {
        let env = smooth_envelope(5000, 5.0, 20.0, 44100.0);
        assert_eq!(env[0], 0.0);
        assert!(env[500] > 0.99);
    }

    #[test]
    fn test_release_is_exponential() {
        let env = smooth_envelope(100, 0.0, 50.0, 1000.0);
        // 50 release samples start at index 50
        assert_eq!(env[49], 1.0);
        assert_eq!(env[50], 1.0);
        assert!((env[99] - (-3.0 * 49.0 / 50.0_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_segments_longer_than_buffer_are_skipped() {
        let env = smooth_envelope(10, 100.0, 100.0, 1000.0);
        assert!(env.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_exp_decay() {
        let d = exp_decay(&[0.0, 0.1], 10.0);
        assert_eq!(d[0], 1.0);
        assert!((d[1] - (-1.0_f64).exp()).abs() < 1e-12);
    }
}
