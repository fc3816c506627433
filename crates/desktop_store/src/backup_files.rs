//! Backup file reads and writes at user-chosen paths.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::{error::HostStoreError, store::atomic_write};

/// Writes backup text to `path`, replacing any existing file.
///
/// The parent directory must already exist. A replaced file keeps its permissions; a new file
/// gets the permissions an ordinary file created by the user would get.
///
/// # Errors
///
/// Returns [`HostStoreError::Write`] when the file cannot be written.
pub fn write_backup_file(path: &Path, contents: &str) -> Result<(), HostStoreError> {
    atomic_write(path, contents.as_bytes(), user_file_permissions(path)).map_err(|err| {
        HostStoreError::Write {
            key: String::new(),
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    info!(path = %path.display(), bytes = contents.len(), "wrote backup file");
    Ok(())
}

fn user_file_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_file_permissions(),
    }
}

#[cfg(unix)]
fn default_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    // The process umask still applies at creation.
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn default_file_permissions() -> Option<fs::Permissions> {
    None
}

/// Reads backup text from `path`.
///
/// # Errors
///
/// Returns [`HostStoreError::Read`] when the file cannot be read as UTF-8 text.
pub fn read_backup_file(path: &Path) -> Result<String, HostStoreError> {
    fs::read_to_string(path).map_err(|err| HostStoreError::Read {
        key: String::new(),
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
