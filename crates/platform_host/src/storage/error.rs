//! Backend error taxonomy for key/value storage.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure reported by a [`crate::KvStore`] backend.
pub enum StorageError {
    /// Stored text exists but is not valid JSON (or not the requested type).
    #[error("stored value for `{key}` is not valid JSON: {message}")]
    Parse {
        /// Storage key that failed to parse.
        key: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The privileged host bridge is absent or the call did not reach the host.
    #[error("host bridge unavailable: {0}")]
    BridgeUnavailable(String),
    /// The backend reached its resource but the read or write failed.
    #[error("storage I/O failed for `{key}`: {message}")]
    Io {
        /// Storage key being accessed.
        key: String,
        /// Backend diagnostic.
        message: String,
    },
    /// The key cannot be mapped to a physical resource.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    /// The value could not be converted to JSON.
    #[error("failed to serialize value: {0}")]
    Serialize(String),
    /// The backend itself is not usable in this runtime.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Returns `true` for failures that another backend might not share.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BridgeUnavailable(_) | Self::Io { .. })
    }
}
