//! Noise-based textures.

use std::f64::consts::PI;

use rand_pcg::Pcg32;

use super::{harmonic_stack, mul};
use crate::synthesis::{filtered_noise, soft_saturate, swept_noise, TimeGrid};

pub(super) fn data_flow(g: &TimeGrid, rng: &mut Pcg32) -> Vec<f64> {
    let d = g.duration();
    let noise = filtered_noise(g.len(), 800.0, 0.3, g.sample_rate(), rng);
    let tone = g.sweep(200.0, 400.0);

    let bell: Vec<f64> = g
        .times()
        .iter()
        .map(|t| (-((t - d / 2.0).powi(2)) / (d / 4.0).powi(2)).exp())
        .collect();
    let env = mul(&g.envelope(30.0, 80.0), &bell);

    let mut out: Vec<f64> = (0..g.len())
        .map(|i| (noise[i] * 0.6 + tone[i] * 0.3) * env[i])
        .collect();
    soft_saturate(&mut out, 0.15);
    out
}

pub(super) fn transition_whoosh(g: &TimeGrid, rng: &mut Pcg32) -> Vec<f64> {
    let d = g.duration();
    let filtered = swept_noise(g.times(), g.sample_rate(), rng, |t| {
        400.0 + 800.0 * (PI * t / d).sin()
    });

    let arch: Vec<f64> = g.times().iter().map(|t| (PI * t / d).sin()).collect();
    let env = mul(&g.envelope(15.0, 50.0), &arch);
    mul(&filtered, &env)
}

pub(super) fn digital_stream(g: &TimeGrid, rng: &mut Pcg32) -> Vec<f64> {
    let noise = filtered_noise(g.len(), 600.0, 0.2, g.sample_rate(), rng);
    let tone = harmonic_stack(g, 400.0, &[(1.0, 0.2), (1.5, 0.1)]);
    let pulse = g.sine(8.0);
    let env = g.envelope(40.0, 80.0);

    let mut out: Vec<f64> = (0..g.len())
        .map(|i| (noise[i] * 0.4 + tone[i]) * (0.7 + 0.3 * pulse[i]) * env[i])
        .collect();
    soft_saturate(&mut out, 0.1);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn test_data_flow_peaks_mid_sound() {
        let g = TimeGrid::new(0.25, 44100.0);
        let out = data_flow(&g, &mut create_rng(2));
        let n = out.len();
        let edge = out[..n / 10].iter().map(|s| s.abs()).fold(0.0, f64::max);
        let mid = out[2 * n / 5..3 * n / 5].iter().map(|s| s.abs()).fold(0.0, f64::max);
        assert!(mid > edge);
    }

    #[test]
    fn test_whoosh_is_seeded() {
        let g = TimeGrid::new(0.2, 44100.0);
        let a = transition_whoosh(&g, &mut create_rng(4));
        let b = transition_whoosh(&g, &mut create_rng(4));
        assert_eq!(a, b);
    }
}
