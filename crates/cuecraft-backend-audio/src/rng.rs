//! Deterministic RNG using PCG32 with BLAKE3 seed derivation.
//!
//! All randomness in the audio backend flows through this module so that
//! rendering the same cue twice yields byte-identical audio.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Derives a seed from an arbitrary string key.
///
/// The seed is the first four bytes (little-endian) of the key's BLAKE3 hash.
/// Cue variation seeds use keys of the form `"{scene_id}_{kind}_{index}_{frame}"`
/// and library sounds use their catalog name.
pub fn derive_variation_seed(key: &str) -> u32 {
    let hash = blake3::hash(key.as_bytes());
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Derives a seed for a named component from a base seed.
pub fn derive_component_seed(base_seed: u32, key: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Draws a standard normal sample (Box-Muller).
pub fn gaussian(rng: &mut Pcg32) -> f64 {
    // Shift into (0, 1] so ln never sees zero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
