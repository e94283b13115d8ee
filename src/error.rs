//! Error types for the stacking pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading, stacking, joining or filtering.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed content in a single input file.
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// A gene feature without a recoverable name.
    #[error("Gene extraction error: {0}")]
    Extraction(String),

    /// A required input path is missing, empty or unreadable.
    #[error("Invalid pipeline input {}: {reason}", path.display())]
    PipelineInput { path: PathBuf, reason: String },

    /// Stacked samples and run metadata do not line up.
    #[error("Join error: {0}")]
    Join(String),

    /// Failed to parse a filter expression.
    #[error("Filter parse error: {0}")]
    FilterParse(String),

    /// Error during filter evaluation.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Type mismatch during comparison.
    #[error("Type mismatch: cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a [`Error::Parse`] at `line` of `file`.
    pub fn parse(file: &str, line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::PipelineInput`].
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::PipelineInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
