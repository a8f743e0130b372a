//! Deterministic WAV file writer.
//!
//! Writes single-channel 16-bit PCM WAV files with no timestamps or variable
//! metadata, so identical samples always produce identical bytes. The BLAKE3
//! hash of the PCM payload identifies a rendered sound.

mod format;
mod result;
mod writer;


pub use format::WavFormat;
pub use result::WavResult;
pub use writer::{pcm_hash, samples_to_pcm16, write_wav, write_wav_to_vec};
