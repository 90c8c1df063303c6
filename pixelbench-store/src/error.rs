//! Error types for the document store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing project files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Envelope or entity-graph failure from the document layer.
    #[error(transparent)]
    Doc(#[from] pixelbench_doc::DocError),

    /// No saved document under the requested name.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A document name that cannot become a file name.
    #[error("invalid document name: {0}")]
    InvalidName(String),
}
