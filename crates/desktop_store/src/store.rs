//! Per-key JSON file store rooted at the host's application data directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use platform_host::{file_name_for_key, validate_key, LogicalKey};
use serde_json::Value;
use tempfile::Builder;
use tracing::debug;

use crate::error::HostStoreError;

#[derive(Debug, Clone)]
/// Key/value storage with one pretty-printed JSON file per key.
pub struct ScopedKvFileStore {
    root: PathBuf,
}

impl ScopedKvFileStore {
    /// Creates a store rooted at `root`, creating the directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`HostStoreError::CreateRoot`] when the directory cannot be created.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, HostStoreError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|err| HostStoreError::CreateRoot {
            path: root.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HostStoreError::InvalidKey`] for keys that cannot name a file inside the root, and
    /// for unmapped keys whose `<key>.json` is the file of a table-mapped key.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, HostStoreError> {
        validate_key(key).map_err(|message| HostStoreError::InvalidKey {
            key: key.to_string(),
            message,
        })?;
        if LogicalKey::from_storage_key(key).is_none() {
            let file_name = file_name_for_key(key);
            if let Some(owner) = LogicalKey::ALL
                .into_iter()
                .find(|logical| logical.file_name() == file_name)
            {
                return Err(HostStoreError::InvalidKey {
                    key: key.to_string(),
                    message: format!("Storage key `{key}` collides with the file of `{owner}`"),
                });
            }
        }
        Ok(self.root.join(file_name_for_key(key)))
    }

    /// Reads the value stored for `key`.
    ///
    /// A missing or blank file is reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys, unreadable files, or files that are not valid JSON.
    pub fn read(&self, key: &str) -> Result<Option<Value>, HostStoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(HostStoreError::Read {
                    key: key.to_string(),
                    path,
                    message: err.to_string(),
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        // Invalid UTF-8 is corrupt content, not an I/O failure.
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| HostStoreError::Parse {
                key: key.to_string(),
                path,
                message: err.to_string(),
            })
    }

    /// Replaces the value stored for `key`.
    ///
    /// The file is written to a temporary sibling first and renamed into place, so readers see
    /// either the previous or the new content.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or when the file cannot be written.
    pub fn write(&self, key: &str, value: &Value) -> Result<(), HostStoreError> {
        let path = self.path_for(key)?;
        let serialized =
            serde_json::to_string_pretty(value).map_err(|err| HostStoreError::Serialize {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        atomic_write(&path, serialized.as_bytes(), None).map_err(|err| HostStoreError::Write {
            key: key.to_string(),
            path: path.clone(),
            message: err.to_string(),
        })?;
        debug!(key, path = %path.display(), bytes = serialized.len(), "stored value");
        Ok(())
    }

    /// Storage keys that currently have a file in the root, sorted.
    ///
    /// Table-mapped files are reported by their storage key, other `.json` files by their stem.
    ///
    /// # Errors
    ///
    /// Returns [`HostStoreError::Read`] when the root cannot be listed.
    pub fn keys_on_disk(&self) -> Result<Vec<String>, HostStoreError> {
        let entries = fs::read_dir(&self.root).map_err(|err| HostStoreError::Read {
            key: String::new(),
            path: self.root.clone(),
            message: err.to_string(),
        })?;
        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let key = LogicalKey::ALL
                .into_iter()
                .find(|key| key.file_name() == file_name)
                .map(|key| key.as_str().to_string())
                .or_else(|| file_name.strip_suffix(".json").map(str::to_string));
            keys.extend(key);
        }
        keys.sort();
        Ok(keys)
    }
}

/// Writes `bytes` to `path` through a temporary file in the same directory.
///
/// The temporary file is created with `permissions` when given, otherwise owner-only.
pub(crate) fn atomic_write(
    path: &Path,
    bytes: &[u8],
    permissions: Option<fs::Permissions>,
) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut builder = Builder::new();
    if let Some(permissions) = permissions {
        builder.permissions(permissions);
    }
    let mut tmp = builder.tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
