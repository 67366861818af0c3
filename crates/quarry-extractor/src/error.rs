//! Error types for the Extractor

use thiserror::Error;

/// Errors that can cross the extraction session boundary
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Document could not be read; fatal to the session
    #[error("Document source error: {0}")]
    Source(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM response did not contain a usable concept
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Session state could not be checkpointed
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::InvalidFormat(e.to_string())
    }
}

/// Errors from updating the session state.
///
/// Loading never fails; see [`ProgressTracker::load`](crate::ProgressTracker::load).
#[derive(Error, Debug)]
pub enum ProgressError {
    /// State file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller tried to move the checkpoint backwards
    #[error("Checkpoint cannot move backwards: at page {current}, requested {requested}")]
    PageRegression {
        /// Current last processed page
        current: u32,
        /// Requested last processed page
        requested: u32,
    },
}

/// Errors opening or reading a document
#[derive(Error, Debug)]
pub enum SourceError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF text extraction failed
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}
