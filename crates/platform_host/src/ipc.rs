//! Wire types shared by the UI process and the desktop host process.
//!
//! Payloads cross the bridge as JSON, so field names here are part of the IPC contract.

use serde::{Deserialize, Serialize};

use crate::storage::error::StorageError;

/// Command reading the value stored for a key.
pub const KV_READ_COMMAND: &str = "kv_read";
/// Command replacing the value stored for a key.
pub const KV_WRITE_COMMAND: &str = "kv_write";
/// Command showing a save dialog and writing backup text to the chosen file.
pub const BACKUP_EXPORT_COMMAND: &str = "backup_export_file";
/// Command showing an open dialog and returning the chosen file's text.
pub const BACKUP_IMPORT_COMMAND: &str = "backup_import_file";

/// Category of a host-side storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostErrorKind {
    /// The file exists but does not contain valid JSON.
    Parse,
    /// Filesystem read or write failure.
    Io,
    /// The key cannot be mapped to a file.
    InvalidKey,
}

/// Error payload returned by host storage commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostErrorPayload {
    /// Failure category.
    pub kind: HostErrorKind,
    /// Storage key the command was called with.
    pub key: String,
    /// Human-readable diagnostic.
    pub message: String,
}

impl From<HostErrorPayload> for StorageError {
    fn from(payload: HostErrorPayload) -> Self {
        match payload.kind {
            HostErrorKind::Parse => StorageError::Parse {
                key: payload.key,
                message: payload.message,
            },
            HostErrorKind::Io => StorageError::Io {
                key: payload.key,
                message: payload.message,
            },
            HostErrorKind::InvalidKey => StorageError::InvalidKey(payload.message),
        }
    }
}

/// Reply to [`KV_WRITE_COMMAND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvWriteReply {
    /// Whether the value reached disk.
    pub success: bool,
    /// Failure details when `success` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<HostErrorPayload>,
}

impl KvWriteReply {
    /// Successful write.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed write.
    pub fn failed(error: HostErrorPayload) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }

    /// Converts the reply into a storage result for `key`.
    ///
    /// # Errors
    ///
    /// Returns the reported failure, or an I/O error when the host gave no details.
    pub fn into_result(self, key: &str) -> Result<(), StorageError> {
        match (self.success, self.error) {
            (true, _) => Ok(()),
            (false, Some(error)) => Err(error.into()),
            (false, None) => Err(StorageError::Io {
                key: key.to_string(),
                message: "host reported an unspecified write failure".to_string(),
            }),
        }
    }
}

/// Arguments of [`BACKUP_EXPORT_COMMAND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFileRequest {
    /// Backup document text.
    pub content: String,
    /// Suggested file name for the save dialog.
    pub filename: String,
}

/// Reply to [`BACKUP_EXPORT_COMMAND`].
///
/// `success == false` without an `error` means the user dismissed the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFileReply {
    /// Whether the file was written.
    pub success: bool,
    /// Chosen destination path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Write failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to [`BACKUP_IMPORT_COMMAND`].
///
/// `success == false` without an `error` means the user dismissed the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFileReply {
    /// Whether a file was read.
    pub success: bool,
    /// File text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Read failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
