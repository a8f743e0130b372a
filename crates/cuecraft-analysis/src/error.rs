//! Error types for moment analysis.

use std::path::PathBuf;

use cuecraft_spec::StageError;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised while analyzing a scene.
///
/// Missing inputs are not errors; they come back as notes on the result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A scene file exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The semantic command could not be started or talked to.
    #[error("semantic command failed: {message}")]
    Command {
        /// What went wrong.
        message: String,
    },

    /// The semantic command ran past its deadline.
    #[error("semantic command timed out after {timeout_secs} seconds")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_secs: u64,
    },

    /// The semantic reply did not contain a usable moment list.
    #[error("malformed semantic response: {message}")]
    MalformedResponse {
        /// What was wrong with it.
        message: String,
    },
}

impl AnalysisError {
    /// Creates a command error.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

impl StageError for AnalysisError {
    fn code(&self) -> &'static str {
        match self {
            AnalysisError::Read { .. } => "ANALYSIS_001",
            AnalysisError::Command { .. } => "ANALYSIS_002",
            AnalysisError::Timeout { .. } => "ANALYSIS_003",
            AnalysisError::MalformedResponse { .. } => "ANALYSIS_004",
        }
    }

    fn category(&self) -> &'static str {
        "analysis"
    }
}
