//! Shared transport interop for the host bridge.
//!
//! This module routes calls to target-specific implementations while preserving a uniform API
//! for the bridge domain modules. On `wasm32` the calls go through the Tauri `invoke` global;
//! elsewhere the bridge is always absent.

use platform_host::{ExportFileReply, ExportFileRequest, ImportFileReply, KvWriteReply, StorageError};
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub fn bridge_available() -> bool {
    imp::bridge_available()
}

pub async fn kv_read(key: &str) -> Result<Option<Value>, StorageError> {
    imp::kv_read(key).await
}

pub async fn kv_write(key: &str, value: &Value) -> Result<KvWriteReply, StorageError> {
    imp::kv_write(key, value).await
}

pub async fn backup_export_file(request: &ExportFileRequest) -> Result<ExportFileReply, String> {
    imp::backup_export_file(request).await
}

pub async fn backup_import_file() -> Result<ImportFileReply, String> {
    imp::backup_import_file().await
}
