//! Error types for the relaxation report pipeline
//!
//! Every error is fatal to the current run: there is no partial-result mode.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Report pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Source file missing, corrupt, or lacking a requested column
    #[error("Load error ({dataset}): {message}")]
    Load {
        /// Dataset being read (e.g. `trials`, `states`)
        dataset: String,
        /// What went wrong
        message: String,
    },

    /// Join key absent, unresolved, or ambiguous
    #[error("Join error: {0}")]
    Join(String),

    /// Minimum distance requested over an empty or non-finite distance sequence
    #[error("Empty or non-finite distance sequence in row {row}: minimum distance to learned states is undefined")]
    EmptySequence {
        /// Row position in the table handed to the stability filter
        row: usize,
    },

    /// Invalid configuration value or column request
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow compute error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Build a [`Error::Load`] for the named dataset
    pub(crate) fn load(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            dataset: dataset.into(),
            message: message.into(),
        }
    }
}
