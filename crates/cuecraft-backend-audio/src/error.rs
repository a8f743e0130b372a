//! Error types for the audio backend.

use cuecraft_spec::StageError;
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while rendering or writing sounds.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Invalid duration.
    #[error("invalid duration: {duration} seconds")]
    InvalidDuration {
        /// The invalid duration.
        duration: f64,
    },

    /// No catalog generator with this name.
    #[error("unknown sound generator: {name}")]
    UnknownGenerator {
        /// The requested name.
        name: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl StageError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidSampleRate { .. } => "AUDIO_001",
            AudioError::InvalidDuration { .. } => "AUDIO_002",
            AudioError::UnknownGenerator { .. } => "AUDIO_003",
            AudioError::InvalidParameter { .. } => "AUDIO_004",
            AudioError::Io(_) => "AUDIO_005",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }
}
