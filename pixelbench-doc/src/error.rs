//! Error types for document loading and saving.

use pixelbench_model::{LoadError, ModelError};
use thiserror::Error;

/// Result type for document operations.
pub type DocResult<T> = Result<T, DocError>;

/// Errors raised by envelope handling and version migration.
#[derive(Debug, Error)]
pub enum DocError {
    /// The envelope declares a version newer than this build understands,
    /// or older than any known format. Never a best-guess load.
    #[error("unsupported document version {version} (current is {current})")]
    UnsupportedVersion { version: u64, current: u64 },

    /// The envelope is missing a required part or has the wrong shape.
    #[error("malformed document envelope: {reason}")]
    Malformed { reason: String },

    /// A structural failure while restoring the root entity graph.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A model-level failure while saving.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl DocError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
