//! Spectrally shaped noise.

use std::f64::consts::PI;

use rand_pcg::Pcg32;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::rng::gaussian;

/// Segment length for the time-varying filter in [`swept_noise`].
const SEGMENT_SIZE: usize = 256;
/// Hop between segments (50% overlap).
const SEGMENT_HOP: usize = SEGMENT_SIZE / 2;

/// Low-passed Gaussian noise with a resonance bump at the cutoff.
///
/// The spectrum is shaped by `1 / (1 + (f/c)^4)` and multiplied by
/// `1 + resonance * exp(-((f - c)^2) / (0.1 c)^2)`.
pub fn filtered_noise(
    length: usize,
    cutoff: f64,
    resonance: f64,
    sample_rate: f64,
    rng: &mut Pcg32,
) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }

    let mut spectrum: Vec<Complex<f64>> = (0..length)
        .map(|_| Complex::new(gaussian(rng) * 0.5, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(length).process(&mut spectrum);

    let width = cutoff * 0.1;
    for (k, bin) in spectrum.iter_mut().enumerate() {
        let f = bin_frequency(k, length, sample_rate);
        let rolloff = 1.0 / (1.0 + (f / cutoff).powi(4));
        let bump = 1.0 + resonance * (-((f - cutoff).powi(2)) / (width * width)).exp();
        *bin = *bin * (rolloff * bump);
    }

    planner.plan_fft_inverse(length).process(&mut spectrum);
    let scale = 1.0 / length as f64;
    spectrum.iter().map(|c| c.re * scale).collect()
}

/// Noise whose low-pass cutoff follows `cutoff_at(t)` over time.
///
/// The signal is filtered in Hann-windowed 256-sample segments with a 128
/// sample hop, each using the cutoff at its centre and a gentle
/// `1 / (1 + (f/c)^2)` rolloff. Segments that would run past the end are
/// not rendered, so the tail is silent.
pub fn swept_noise<F>(times: &[f64], sample_rate: f64, rng: &mut Pcg32, cutoff_at: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let n = times.len();
    let noise: Vec<f64> = (0..n).map(|_| gaussian(rng) * 0.3).collect();
    let mut output = vec![0.0; n];

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(SEGMENT_SIZE);
    let ifft = planner.plan_fft_inverse(SEGMENT_SIZE);

    let mut start = 0;
    while start + SEGMENT_SIZE < n {
        let cutoff = cutoff_at(times[start + SEGMENT_SIZE / 2]);

        let mut segment: Vec<Complex<f64>> = noise[start..start + SEGMENT_SIZE]
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        fft.process(&mut segment);
        for (k, bin) in segment.iter_mut().enumerate() {
            let f = bin_frequency(k, SEGMENT_SIZE, sample_rate);
            *bin = *bin * (1.0 / (1.0 + (f / cutoff).powi(2)));
        }
        ifft.process(&mut segment);

        for (i, c) in segment.iter().enumerate() {
            output[start + i] += c.re / SEGMENT_SIZE as f64 * hann(i, SEGMENT_SIZE);
        }
        start += SEGMENT_HOP;
    }

    output
}

/// Absolute frequency of FFT bin `k` (negative bins mirrored).
fn bin_frequency(k: usize, size: usize, sample_rate: f64) -> f64 {
    let k = if k <= size / 2 { k } else { size - k };
    k as f64 * sample_rate / size as f64
}

/// Symmetric Hann window value.
#[inline]
fn hann(i: usize, size: usize) -> f64 {
    0.5 - 0.5 * (2.0 * PI * i as f64 / (size - 1) as f64).cos()
}
