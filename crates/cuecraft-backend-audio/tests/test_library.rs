//! Sound library integration tests: files on disk read back with hound.

use cuecraft_backend_audio::catalog::{SoundGenerator, TARGET_PEAK_DB};
use cuecraft_backend_audio::SoundLibrary;
use pretty_assertions::assert_eq;

#[test]
fn test_generate_all_writes_readable_mono_16bit() {
    let dir = tempfile::tempdir().unwrap();
    let lib = SoundLibrary::new(dir.path());

    let written = lib.generate_all().unwrap();
    assert_eq!(written.len(), 17);
    assert!(lib.missing_sounds().is_empty());

    for generator in SoundGenerator::all() {
        let path = lib.sound_path(generator.name());
        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let expected = (generator.default_duration() * 44100.0) as u32;
        assert_eq!(reader.duration(), expected, "{}", generator);
    }
}

#[test]
fn test_library_peak_is_minus_3_dbfs() {
    let dir = tempfile::tempdir().unwrap();
    let lib = SoundLibrary::new(dir.path());
    lib.generate(SoundGenerator::SuccessTone).unwrap();

    let mut reader = hound::WavReader::open(lib.sound_path("success_tone")).unwrap();
    let peak = reader
        .samples::<i16>()
        .map(|s| (s.unwrap() as i32).abs())
        .max()
        .unwrap();
    let expected = (10.0_f64.powf(TARGET_PEAK_DB / 20.0) * 32767.0).round() as i32;
    assert!((peak - expected).abs() <= 1, "peak {} expected {}", peak, expected);
}

#[test]
fn test_library_renders_are_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let wav_a = SoundLibrary::new(a.path())
        .generate(SoundGenerator::DigitalStream)
        .unwrap();
    let wav_b = SoundLibrary::new(b.path())
        .generate(SoundGenerator::DigitalStream)
        .unwrap();
    assert_eq!(wav_a.pcm_hash, wav_b.pcm_hash);

    let bytes_a = std::fs::read(a.path().join("digital_stream.wav")).unwrap();
    let bytes_b = std::fs::read(b.path().join("digital_stream.wav")).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn test_ensure_only_writes_missing() {
    let dir = tempfile::tempdir().unwrap();
    let lib = SoundLibrary::new(dir.path());
    lib.generate(SoundGenerator::UiPop).unwrap();

    let written = lib.ensure(&["ui_pop", "reveal_hit", "reveal_hit"]).unwrap();
    assert_eq!(written, vec!["reveal_hit"]);
    assert!(lib.sound_exists("reveal_hit"));
    assert_eq!(lib.missing_sounds().len(), 15);
}

#[test]
fn test_ensure_rejects_unknown_sound() {
    let dir = tempfile::tempdir().unwrap();
    let lib = SoundLibrary::new(dir.path());
    assert!(lib.ensure(&["foghorn"]).is_err());
}
