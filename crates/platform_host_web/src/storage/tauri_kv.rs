//! Tauri command-backed key/value store.
//!
//! This store uses the bridge interop layer, which routes reads and writes to the desktop host's
//! per-key files when running inside the Tauri webview.

use platform_host::{KvStore, KvStoreFuture, StorageError};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
/// Desktop key/value store backed by the host bridge.
pub struct TauriKvStore;

impl KvStore for TauriKvStore {
    fn backend_name(&self) -> &'static str {
        "tauri-file-store"
    }

    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        Box::pin(async move { crate::bridge::kv_read(key).await })
    }

    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        Box::pin(async move { crate::bridge::kv_write(key, value).await })
    }
}
