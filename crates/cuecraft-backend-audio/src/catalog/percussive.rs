//! Short clicks, ticks and taps.

use super::{layer2, mul};
use crate::synthesis::{smooth_envelope, TimeGrid};

pub(super) fn text_tick(g: &TimeGrid) -> Vec<f64> {
    let tone = mul(&g.sine(1200.0), &g.decay(80.0));
    let body = mul(&g.sine(400.0), &g.decay(60.0));
    layer2(&tone, &body, 0.2, &g.envelope(1.0, 20.0))
}

pub(super) fn lock_click(g: &TimeGrid) -> Vec<f64> {
    // Two detuned tones beat against each other.
    let click = layer2(&g.sine(1000.0), &g.sine(1050.0), 0.7, &g.decay(50.0));
    let thump = mul(&g.sine(150.0), &g.decay(40.0));
    layer2(&click, &thump, 0.5, &g.envelope(1.0, 40.0))
}

pub(super) fn keyboard_type(g: &TimeGrid) -> Vec<f64> {
    let click = layer2(&g.sine(800.0), &g.sine(1200.0), 0.3, &g.decay(100.0));
    let thump = mul(&g.sine(200.0), &g.decay(80.0));
    layer2(&click, &thump, 0.3, &g.envelope(1.0, 25.0))
}

/// Three soft taps, each higher and quieter than the last.
pub(super) fn keyboard_rapid(g: &TimeGrid) -> Vec<f64> {
    const TAP_TIMES: [f64; 3] = [0.0, 0.03, 0.065];
    const TAP_SECONDS: f64 = 0.035;

    let sr = g.sample_rate();
    let n = g.len();
    let mut out = vec![0.0; n];

    for (i, &tap_time) in TAP_TIMES.iter().enumerate() {
        let start = (tap_time * sr) as usize;
        let tap_len = ((TAP_SECONDS * sr) as usize).min(n.saturating_sub(start));
        if tap_len == 0 {
            continue;
        }

        let tap_grid = TimeGrid::new(tap_len as f64 / sr, sr);
        let freq = 900.0 + i as f64 * 100.0;
        let tap = mul(&tap_grid.sine(freq), &tap_grid.decay(90.0));
        let env = smooth_envelope(tap.len(), 1.0, 20.0, sr);
        let gain = 0.8 - i as f64 * 0.15;

        for (j, (s, e)) in tap.iter().zip(&env).enumerate() {
            out[start + j] += s * e * gain;
        }
    }

    out
}

pub(super) fn progress_tick(g: &TimeGrid) -> Vec<f64> {
    let high = g.sine(1500.0);
    let higher = g.sine(2000.0);
    let decay = g.decay(80.0);
    let env = g.envelope(1.0, 25.0);
    (0..g.len())
        .map(|i| (0.7 * high[i] + 0.2 * higher[i]) * decay[i] * env[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_rapid_has_three_onsets() {
        let g = TimeGrid::new(0.12, 44100.0);
        let out = keyboard_rapid(&g);
        // Silence after the last tap ends (0.065 + 0.035 = 0.1 s).
        let tail_start = (0.101 * 44100.0) as usize;
        assert!(out[tail_start..].iter().all(|&s| s == 0.0));
        assert!(out[(0.04 * 44100.0) as usize..(0.06 * 44100.0) as usize]
            .iter()
            .any(|&s| s != 0.0));
    }

    #[test]
    fn test_keyboard_rapid_truncates_last_tap() {
        let g = TimeGrid::new(0.08, 44100.0);
        let out = keyboard_rapid(&g);
        assert_eq!(out.len(), g.len());
    }
}
