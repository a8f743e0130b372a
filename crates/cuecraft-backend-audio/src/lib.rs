//! cuecraft Audio Backend
//!
//! Deterministic procedural synthesis of short UI sound effects.
//!
//! # Overview
//!
//! - [`synthesis`] - signal primitives: sine and exponential sweep oscillators,
//!   click-free envelopes, FFT-shaped noise, saturation and normalization
//! - [`catalog`] - the fixed set of 17 named generators built from them
//! - [`custom`] - per-cue rendering with pitch offset and seeded variation
//! - [`library`] - the on-disk library of default renders
//! - [`wav`] - mono 16-bit PCM WAV writer
//!
//! # Determinism
//!
//! All randomness goes through PCG32 generators seeded from BLAKE3 hashes
//! (see [`rng`]). Rendering the same request twice produces byte-identical
//! WAV data; [`wav::WavResult::pcm_hash`] identifies the audio content.
//!
//! # Example
//!
//! ```no_run
//! use cuecraft_backend_audio::catalog::SoundGenerator;
//! use cuecraft_backend_audio::custom::{render_custom, CustomSoundRequest};
//!
//! let request = CustomSoundRequest {
//!     generator: SoundGenerator::RevealHit,
//!     duration: 0.45,
//!     intensity: 0.9,
//!     pitch_semitones: 2.0,
//!     seed: 1234,
//! };
//! let wav = render_custom(&request, 44100)?;
//! std::fs::write("intro_reveal_0.wav", &wav.wav_data)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod custom;
pub mod error;
pub mod library;
pub mod rng;
pub mod synthesis;
pub mod wav;

pub use catalog::{manifest, SoundGenerator, SoundInfo};
pub use custom::{render_custom, CustomSoundRequest};
pub use error::{AudioError, AudioResult};
pub use library::SoundLibrary;
pub use wav::WavResult;
