//! Error types shared across pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

/// Common interface for stage-specific errors.
///
/// Every stage crate (audio backend, analysis, storyboard) implements this
/// for its error enum so the orchestrator can record failures uniformly
/// without depending on each stage's concrete error type.
///
/// # Example
///
/// ```
/// use cuecraft_spec::error::StageError;
///
/// fn describe<E: StageError>(err: &E) -> String {
///     format!("[{}] {}", err.code(), err.message())
/// }
/// ```
pub trait StageError: std::error::Error {
    /// Stable error code such as `"AUDIO_001"` or `"STORYBOARD_002"`.
    fn code(&self) -> &'static str;

    /// Human-readable message, usually the `Display` text.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Stage category: `"audio"`, `"analysis"`, `"storyboard"`, `"config"`.
    fn category(&self) -> &'static str;
}

/// A type-erased stage error with its code and category captured.
#[derive(Debug)]
pub struct PipelineError {
    /// The error code (e.g. "AUDIO_007").
    pub code: &'static str,
    /// The human-readable error message.
    pub message: String,
    /// The error category (e.g. "audio").
    pub category: &'static str,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PipelineError {
    /// Captures any `StageError` implementor.
    pub fn from_stage<E: StageError + Send + Sync + 'static>(err: E) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            category: err.category(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates an error without an underlying stage error.
    pub fn new(code: &'static str, message: impl Into<String>, category: &'static str) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            source: None,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Errors raised while loading or validating a [`crate::PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the config schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value the pipeline cannot run with.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-field error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl StageError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CONFIG_001",
            ConfigError::Parse { .. } => "CONFIG_002",
            ConfigError::Invalid { .. } => "CONFIG_003",
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}
