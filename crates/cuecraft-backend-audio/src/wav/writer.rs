//! Low-level WAV serialization.

use std::io::{self, Write};

use super::format::WavFormat;

/// Size of the RIFF + fmt + data chunk headers.
const HEADER_LEN: usize = 44;

/// Writes a complete WAV file to a writer.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    writer.write_all(&header(format, pcm_data.len() as u32))?;
    writer.write_all(pcm_data)?;
    Ok(())
}

/// Writes a WAV file to a byte vector.
pub fn write_wav_to_vec(format: &WavFormat, pcm_data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + pcm_data.len());
    buffer.extend_from_slice(&header(format, pcm_data.len() as u32));
    buffer.extend_from_slice(pcm_data);
    buffer
}

fn header(format: &WavFormat, data_size: u32) -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];
    // RIFF size excludes the first 8 bytes.
    let file_size = 36 + data_size;

    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&file_size.to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");

    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&format.channels.to_le_bytes());
    h[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    h[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    h[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_size.to_le_bytes());
    h
}

/// Converts f64 samples to little-endian 16-bit PCM bytes.
///
/// Samples outside `[-1.0, 1.0]` are clipped.
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clipped = if sample.is_nan() {
            0.0
        } else {
            sample.clamp(-1.0, 1.0)
        };
        let value = (clipped * 32767.0).round() as i16;
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    pcm
}

/// BLAKE3 hex digest of a PCM payload.
pub fn pcm_hash(pcm: &[u8]) -> String {
    blake3::hash(pcm).to_hex().to_string()
}
