//! Backup/restore error taxonomy.

use thiserror::Error;

use crate::storage::{error::StorageError, keys::LogicalKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure of an export or import step.
pub enum BackupError {
    /// The backup text is not a backup document; nothing was written.
    #[error("invalid backup format: {0}")]
    InvalidFormat(String),
    /// The runtime cannot perform this transfer.
    #[error("{0}")]
    Unsupported(String),
    /// The destination could not be written.
    #[error("failed to save backup: {0}")]
    Sink(String),
    /// The backup file could not be read.
    #[error("failed to read backup: {0}")]
    Source(String),
    /// The document could not be rendered as JSON.
    #[error("failed to serialize backup: {0}")]
    Serialize(String),
    /// A storage read needed to snapshot current state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Writing a restored key failed; earlier writes were rolled back.
    #[error("failed to restore `{key}`: {message} (rolled back {rolled_back} key(s))")]
    RestoreFailed {
        /// Key whose write failed.
        key: LogicalKey,
        /// Storage diagnostic.
        message: String,
        /// Number of already-written keys restored to their previous value.
        rolled_back: usize,
    },
}

impl BackupError {
    /// Whether this error must abort an import before any write.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}
