//! The fixed catalog of named sound generators.
//!
//! Each generator is a short deterministic function of a duration that
//! layers one or two primitives under a smooth envelope. Rendering through
//! [`SoundGenerator::render`] always peak-normalizes to -3 dBFS.

mod percussive;
mod texture;
mod tonal;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{AudioError, AudioResult};
use crate::rng::create_rng;
use crate::synthesis::{normalize, TimeGrid};

/// Peak level of every rendered sound, in dBFS.
pub const TARGET_PEAK_DB: f64 = -3.0;

/// Longest sound the catalog will render.
pub const MAX_DURATION_SECONDS: f64 = 10.0;

/// A named catalog generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundGenerator {
    UiPop,
    TextTick,
    LockClick,
    DataFlow,
    CounterSweep,
    RevealHit,
    WarningTone,
    SuccessTone,
    TransitionWhoosh,
    CacheClick,
    KeyboardType,
    KeyboardRapid,
    BarGrow,
    ProgressTick,
    DigitalStream,
    ImpactSoft,
    ImpactHard,
}

/// Manifest entry for one generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub default_duration: f64,
}

impl SoundGenerator {
    /// Returns all generators in manifest order.
    pub fn all() -> &'static [SoundGenerator] {
        &[
            SoundGenerator::UiPop,
            SoundGenerator::TextTick,
            SoundGenerator::LockClick,
            SoundGenerator::DataFlow,
            SoundGenerator::CounterSweep,
            SoundGenerator::RevealHit,
            SoundGenerator::WarningTone,
            SoundGenerator::SuccessTone,
            SoundGenerator::TransitionWhoosh,
            SoundGenerator::CacheClick,
            SoundGenerator::KeyboardType,
            SoundGenerator::KeyboardRapid,
            SoundGenerator::BarGrow,
            SoundGenerator::ProgressTick,
            SoundGenerator::DigitalStream,
            SoundGenerator::ImpactSoft,
            SoundGenerator::ImpactHard,
        ]
    }

    /// Catalog name, also the library file stem.
    pub fn name(&self) -> &'static str {
        match self {
            SoundGenerator::UiPop => "ui_pop",
            SoundGenerator::TextTick => "text_tick",
            SoundGenerator::LockClick => "lock_click",
            SoundGenerator::DataFlow => "data_flow",
            SoundGenerator::CounterSweep => "counter_sweep",
            SoundGenerator::RevealHit => "reveal_hit",
            SoundGenerator::WarningTone => "warning_tone",
            SoundGenerator::SuccessTone => "success_tone",
            SoundGenerator::TransitionWhoosh => "transition_whoosh",
            SoundGenerator::CacheClick => "cache_click",
            SoundGenerator::KeyboardType => "keyboard_type",
            SoundGenerator::KeyboardRapid => "keyboard_rapid",
            SoundGenerator::BarGrow => "bar_grow",
            SoundGenerator::ProgressTick => "progress_tick",
            SoundGenerator::DigitalStream => "digital_stream",
            SoundGenerator::ImpactSoft => "impact_soft",
            SoundGenerator::ImpactHard => "impact_hard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SoundGenerator::UiPop => "Soft pop for elements appearing",
            SoundGenerator::TextTick => "Subtle tick for text appearing",
            SoundGenerator::LockClick => "Clean click for things locking into place",
            SoundGenerator::DataFlow => "Gentle woosh for data movement",
            SoundGenerator::CounterSweep => "Rising tone for counters",
            SoundGenerator::RevealHit => "Soft impact for reveals",
            SoundGenerator::WarningTone => "Subtle tension tone for problems",
            SoundGenerator::SuccessTone => "Pleasant chime for success",
            SoundGenerator::TransitionWhoosh => "Gentle sweep for transitions",
            SoundGenerator::CacheClick => "Clean blip for cache operations",
            SoundGenerator::KeyboardType => "Soft key tap for typing",
            SoundGenerator::KeyboardRapid => "Quick typing burst",
            SoundGenerator::BarGrow => "Gentle rise for chart growth",
            SoundGenerator::ProgressTick => "Tiny tick for progress",
            SoundGenerator::DigitalStream => "Soft texture for streaming",
            SoundGenerator::ImpactSoft => "Gentle thump for subtle reveals",
            SoundGenerator::ImpactHard => "Firmer impact for emphasis",
        }
    }

    /// Duration in seconds used when rendering the library.
    pub fn default_duration(&self) -> f64 {
        match self {
            SoundGenerator::UiPop => 0.08,
            SoundGenerator::TextTick => 0.03,
            SoundGenerator::LockClick => 0.06,
            SoundGenerator::DataFlow => 0.25,
            SoundGenerator::CounterSweep => 0.2,
            SoundGenerator::RevealHit => 0.3,
            SoundGenerator::WarningTone => 0.25,
            SoundGenerator::SuccessTone => 0.25,
            SoundGenerator::TransitionWhoosh => 0.2,
            SoundGenerator::CacheClick => 0.05,
            SoundGenerator::KeyboardType => 0.04,
            SoundGenerator::KeyboardRapid => 0.12,
            SoundGenerator::BarGrow => 0.2,
            SoundGenerator::ProgressTick => 0.04,
            SoundGenerator::DigitalStream => 0.3,
            SoundGenerator::ImpactSoft => 0.12,
            SoundGenerator::ImpactHard => 0.18,
        }
    }

    pub fn info(&self) -> SoundInfo {
        SoundInfo {
            name: self.name(),
            description: self.description(),
            default_duration: self.default_duration(),
        }
    }

    /// Generates raw (unnormalized) samples.
    ///
    /// Noise-based generators draw from `rng`; the rest ignore it.
    pub fn synthesize(&self, duration: f64, sample_rate: u32, rng: &mut Pcg32) -> Vec<f64> {
        let grid = TimeGrid::new(duration, sample_rate as f64);
        match self {
            SoundGenerator::UiPop => tonal::ui_pop(&grid),
            SoundGenerator::TextTick => percussive::text_tick(&grid),
            SoundGenerator::LockClick => percussive::lock_click(&grid),
            SoundGenerator::DataFlow => texture::data_flow(&grid, rng),
            SoundGenerator::CounterSweep => tonal::counter_sweep(&grid),
            SoundGenerator::RevealHit => tonal::reveal_hit(&grid),
            SoundGenerator::WarningTone => tonal::warning_tone(&grid),
            SoundGenerator::SuccessTone => tonal::success_tone(&grid),
            SoundGenerator::TransitionWhoosh => texture::transition_whoosh(&grid, rng),
            SoundGenerator::CacheClick => tonal::cache_click(&grid),
            SoundGenerator::KeyboardType => percussive::keyboard_type(&grid),
            SoundGenerator::KeyboardRapid => percussive::keyboard_rapid(&grid),
            SoundGenerator::BarGrow => tonal::bar_grow(&grid),
            SoundGenerator::ProgressTick => percussive::progress_tick(&grid),
            SoundGenerator::DigitalStream => texture::digital_stream(&grid, rng),
            SoundGenerator::ImpactSoft => tonal::impact_soft(&grid),
            SoundGenerator::ImpactHard => tonal::impact_hard(&grid),
        }
    }

    /// Renders at `duration`, seeded by `seed`, normalized to -3 dBFS.
    pub fn render(&self, duration: f64, sample_rate: u32, seed: u32) -> AudioResult<Vec<f64>> {
        validate_render_params(duration, sample_rate)?;
        let mut rng = create_rng(seed);
        let mut samples = self.synthesize(duration, sample_rate, &mut rng);
        if samples.is_empty() {
            return Err(AudioError::InvalidDuration { duration });
        }
        normalize(&mut samples, TARGET_PEAK_DB);
        Ok(samples)
    }
}

impl std::fmt::Display for SoundGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SoundGenerator {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundGenerator::all()
            .iter()
            .copied()
            .find(|g| g.name() == s)
            .ok_or_else(|| AudioError::UnknownGenerator { name: s.to_string() })
    }
}

/// Manifest of every generator, in catalog order.
pub fn manifest() -> Vec<SoundInfo> {
    SoundGenerator::all().iter().map(|g| g.info()).collect()
}

/// Checks a duration and sample rate are renderable.
pub fn validate_render_params(duration: f64, sample_rate: u32) -> AudioResult<()> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { rate: sample_rate });
    }
    if !duration.is_finite() || duration <= 0.0 || duration > MAX_DURATION_SECONDS {
        return Err(AudioError::InvalidDuration { duration });
    }
    Ok(())
}

/// One tonal layer: sines at `fundamental * ratio`, each scaled by its weight.
pub(crate) fn harmonic_stack(g: &TimeGrid, fundamental: f64, partials: &[(f64, f64)]) -> Vec<f64> {
    let mut out = vec![0.0; g.len()];
    for &(ratio, weight) in partials {
        for (acc, v) in out.iter_mut().zip(g.sine(fundamental * ratio)) {
            *acc += weight * v;
        }
    }
    out
}

/// Element-wise `(a + gain * b) * env`. At most two layers per sound.
pub(crate) fn layer2(a: &[f64], b: &[f64], gain: f64, env: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .zip(env)
        .map(|((x, y), e)| (x + gain * y) * e)
        .collect()
}

/// Element-wise product.
pub(crate) fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x * y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::peak;

    #[test]
    fn test_catalog_has_seventeen_unique_names() {
        let names: std::collections::HashSet<_> =
            SoundGenerator::all().iter().map(|g| g.name()).collect();
        assert_eq!(names.len(), 17);
        assert_eq!(manifest().len(), 17);
    }

    #[test]
    fn test_name_roundtrip() {
        for g in SoundGenerator::all() {
            assert_eq!(g.name().parse::<SoundGenerator>().unwrap(), *g);
        }
        let err = "air_horn".parse::<SoundGenerator>().unwrap_err();
        assert!(matches!(err, AudioError::UnknownGenerator { .. }));
    }

    #[test]
    fn test_every_generator_renders_at_minus_3db() {
        let target = 10.0_f64.powf(TARGET_PEAK_DB / 20.0);
        for g in SoundGenerator::all() {
            let samples = g.render(g.default_duration(), 44100, 7).unwrap();
            let expected_len = (g.default_duration() * 44100.0) as usize;
            assert_eq!(samples.len(), expected_len, "{}", g);
            assert!((peak(&samples) - target).abs() < 1e-9, "{} peak", g);
            assert!(samples.iter().all(|s| s.is_finite()), "{} finite", g);
        }
    }

    #[test]
    fn test_sounds_start_without_click() {
        for g in SoundGenerator::all() {
            let samples = g.render(g.default_duration(), 44100, 1).unwrap();
            assert!(samples[0].abs() < 1e-3, "{} starts at {}", g, samples[0]);
        }
    }

    #[test]
    fn test_harmonic_stack_weights_partials() {
        let g = TimeGrid::new(0.01, 44100.0);
        let stack = harmonic_stack(&g, 100.0, &[(1.0, 1.0), (2.0, 0.5)]);
        let f1 = g.sine(100.0);
        let f2 = g.sine(200.0);
        assert_eq!(stack.len(), g.len());
        for i in 0..g.len() {
            assert!((stack[i] - (f1[i] + 0.5 * f2[i])).abs() < 1e-12);
        }
        assert!(harmonic_stack(&g, 100.0, &[]).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = SoundGenerator::DataFlow.render(0.25, 44100, 11).unwrap();
        let b = SoundGenerator::DataFlow.render(0.25, 44100, 11).unwrap();
        assert_eq!(a, b);
        let c = SoundGenerator::DataFlow.render(0.25, 44100, 12).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_render_rejects_bad_params() {
        let g = SoundGenerator::UiPop;
        assert!(matches!(
            g.render(0.0, 44100, 0),
            Err(AudioError::InvalidDuration { .. })
        ));
        assert!(matches!(
            g.render(f64::NAN, 44100, 0),
            Err(AudioError::InvalidDuration { .. })
        ));
        assert!(matches!(
            g.render(0.1, 0, 0),
            Err(AudioError::InvalidSampleRate { .. })
        ));
        // Shorter than one sample.
        assert!(g.render(1e-6, 44100, 0).is_err());
    }
}
