//! Pitched generators: pops, sweeps, chimes and impacts.

use super::{harmonic_stack, layer2, mul};
use crate::synthesis::{soft_saturate, TimeGrid};

pub(super) fn ui_pop(g: &TimeGrid) -> Vec<f64> {
    let mut out = layer2(
        &g.sweep(880.0, 440.0),
        &g.sweep(1760.0, 880.0),
        0.15,
        &g.envelope(2.0, 60.0),
    );
    soft_saturate(&mut out, 0.2);
    out
}

pub(super) fn counter_sweep(g: &TimeGrid) -> Vec<f64> {
    let d = g.duration();
    // Loudness follows the rising pitch.
    let swell: Vec<f64> = g.times().iter().map(|t| 0.7 + 0.3 * t / d).collect();
    let env = mul(&g.envelope(10.0, 60.0), &swell);
    let mut out = layer2(&g.sweep(300.0, 900.0), &g.sweep(600.0, 1800.0), 0.1, &env);
    soft_saturate(&mut out, 0.2);
    out
}

pub(super) fn reveal_hit(g: &TimeGrid) -> Vec<f64> {
    let tone = harmonic_stack(g, 110.0, &[(1.0, 1.0), (2.0, 0.4), (3.0, 0.15)]);

    let env = mul(&g.envelope(8.0, 200.0), &g.decay(6.0));
    let mut out = layer2(&tone, &g.sweep(220.0, 110.0), 0.3, &env);
    soft_saturate(&mut out, 0.25);
    out
}

pub(super) fn warning_tone(g: &TimeGrid) -> Vec<f64> {
    // Minor second against the root for mild tension.
    let vibrato: Vec<f64> = g.sine(5.0).iter().map(|v| 1.0 + 0.01 * v).collect();
    let env = mul(&mul(&g.envelope(20.0, 100.0), &g.decay(4.0)), &vibrato);
    let mut out = layer2(&g.sine(130.0), &g.sine(138.0), 0.3, &env);
    soft_saturate(&mut out, 0.2);
    out
}

pub(super) fn success_tone(g: &TimeGrid) -> Vec<f64> {
    let n = g.len();
    let upper = g.sine(659.0);
    let delay = (0.015 * g.sample_rate()) as usize;
    let mut delayed = vec![0.0; n];
    if delay > 0 && delay < n {
        delayed[delay..].copy_from_slice(&upper[..n - delay]);
    }

    let env = mul(&g.envelope(5.0, 150.0), &g.decay(5.0));
    let mut out = layer2(&g.sine(523.0), &delayed, 0.7, &env);
    soft_saturate(&mut out, 0.2);
    out
}

pub(super) fn cache_click(g: &TimeGrid) -> Vec<f64> {
    let mut out = layer2(
        &g.sweep(1400.0, 800.0),
        &g.sweep(2800.0, 1600.0),
        0.1,
        &g.envelope(2.0, 35.0),
    );
    soft_saturate(&mut out, 0.15);
    out
}

pub(super) fn bar_grow(g: &TimeGrid) -> Vec<f64> {
    let mut out = layer2(
        &g.sweep(250.0, 500.0),
        &g.sweep(500.0, 1000.0),
        0.15,
        &g.envelope(15.0, 60.0),
    );
    soft_saturate(&mut out, 0.15);
    out
}

pub(super) fn impact_soft(g: &TimeGrid) -> Vec<f64> {
    let env = mul(&g.envelope(5.0, 80.0), &g.decay(20.0));
    layer2(&g.sine(150.0), &g.sine(300.0), 0.3, &env)
}

pub(super) fn impact_hard(g: &TimeGrid) -> Vec<f64> {
    let tone = harmonic_stack(g, 100.0, &[(1.0, 1.0), (2.0, 0.5), (4.0, 0.2)]);

    let env = mul(&g.envelope(5.0, 120.0), &g.decay(8.0));
    let mut out = layer2(&tone, &g.sweep(300.0, 150.0), 0.3, &env);
    soft_saturate(&mut out, 0.25);
    out
}
