//! Per-word narration timing.

use serde::{Deserialize, Serialize};

/// Frame rate used by the frame helpers that take no explicit rate.
pub const REFERENCE_FPS: u32 = 30;

/// Timing of one spoken word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    /// The word as spoken, possibly with punctuation attached.
    pub word: String,
    /// Start of the word in seconds.
    #[serde(alias = "start")]
    pub start_seconds: f64,
    /// End of the word in seconds.
    #[serde(alias = "end")]
    pub end_seconds: f64,
    /// Aligner confidence.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl WordTimestamp {
    /// Creates a timestamp with full confidence.
    pub fn new(word: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            word: word.into(),
            start_seconds,
            end_seconds,
            confidence: 1.0,
        }
    }

    /// Start frame at [`REFERENCE_FPS`].
    pub fn start_frame(&self) -> u32 {
        self.start_frame_at(REFERENCE_FPS)
    }

    /// End frame at [`REFERENCE_FPS`].
    pub fn end_frame(&self) -> u32 {
        self.end_frame_at(REFERENCE_FPS)
    }

    /// Start frame at `fps`, truncated toward zero.
    pub fn start_frame_at(&self, fps: u32) -> u32 {
        seconds_to_frame(self.start_seconds, fps)
    }

    /// End frame at `fps`, truncated toward zero.
    pub fn end_frame_at(&self, fps: u32) -> u32 {
        seconds_to_frame(self.end_seconds, fps)
    }

    /// Spoken duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

fn seconds_to_frame(seconds: f64, fps: u32) -> u32 {
    let frame = seconds * fps as f64;
    if frame.is_nan() || frame <= 0.0 {
        0
    } else {
        frame as u32
    }
}
