//! Host-side store errors and their IPC payload form.

use std::path::PathBuf;

use platform_host::{HostErrorKind, HostErrorPayload};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure of a host-side store or backup file operation.
pub enum HostStoreError {
    /// The key cannot be mapped to a file inside the store root.
    #[error("{message}")]
    InvalidKey {
        /// Rejected key.
        key: String,
        /// Validation message.
        message: String,
    },
    /// The file exists but is not valid JSON.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// Storage key.
        key: String,
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// Reading a file failed.
    #[error("failed to read {}: {message}", path.display())]
    Read {
        /// Storage key, empty for backup files.
        key: String,
        /// File that could not be read.
        path: PathBuf,
        /// OS diagnostic.
        message: String,
    },
    /// Writing a file failed.
    #[error("failed to write {}: {message}", path.display())]
    Write {
        /// Storage key, empty for backup files.
        key: String,
        /// Destination file.
        path: PathBuf,
        /// OS diagnostic.
        message: String,
    },
    /// The value could not be rendered as JSON.
    #[error("failed to serialize `{key}`: {message}")]
    Serialize {
        /// Storage key.
        key: String,
        /// Serializer diagnostic.
        message: String,
    },
    /// The store root could not be created.
    #[error("failed to create store dir {}: {message}", path.display())]
    CreateRoot {
        /// Store root.
        path: PathBuf,
        /// OS diagnostic.
        message: String,
    },
}

impl HostStoreError {
    /// Storage key the failure relates to, empty when none applies.
    pub fn key(&self) -> &str {
        match self {
            Self::InvalidKey { key, .. }
            | Self::Parse { key, .. }
            | Self::Read { key, .. }
            | Self::Write { key, .. }
            | Self::Serialize { key, .. } => key,
            Self::CreateRoot { .. } => "",
        }
    }

    /// Failure category sent across the bridge.
    pub fn kind(&self) -> HostErrorKind {
        match self {
            Self::InvalidKey { .. } => HostErrorKind::InvalidKey,
            Self::Parse { .. } => HostErrorKind::Parse,
            Self::Read { .. }
            | Self::Write { .. }
            | Self::Serialize { .. }
            | Self::CreateRoot { .. } => HostErrorKind::Io,
        }
    }

    /// Serializable form returned from IPC commands.
    pub fn to_payload(&self) -> HostErrorPayload {
        HostErrorPayload {
            kind: self.kind(),
            key: self.key().to_string(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use platform_host::StorageError;

    use super::*;

    #[test]
    fn payload_kinds_follow_error_category() {
        let parse = HostStoreError::Parse {
            key: "edugen_settings".into(),
            path: PathBuf::from("/data/settings.json"),
            message: "EOF while parsing".into(),
        };
        let payload = parse.to_payload();
        assert_eq!(payload.kind, HostErrorKind::Parse);
        assert_eq!(payload.key, "edugen_settings");
        assert_eq!(
            payload.message,
            "failed to parse /data/settings.json: EOF while parsing"
        );

        let write = HostStoreError::Write {
            key: "edugen_vocab_bank".into(),
            path: PathBuf::from("/data/vocab.json"),
            message: "read-only file system".into(),
        };
        let storage: StorageError = write.to_payload().into();
        assert!(storage.is_transient());
    }
}
