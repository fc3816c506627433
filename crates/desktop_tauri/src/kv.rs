//! Typed Tauri command handlers for the per-key file store.

use desktop_store::ScopedKvFileStore;
use platform_host::{HostErrorPayload, KvWriteReply};
use serde_json::Value;
use tauri::State;
use tracing::{error, warn};

/// Reads the stored value for `key`; `null` when no file exists.
#[tauri::command]
pub fn kv_read(
    store: State<'_, ScopedKvFileStore>,
    key: String,
) -> Result<Option<Value>, HostErrorPayload> {
    store.read(&key).map_err(|err| {
        warn!(key = %key, error = %err, "kv read failed");
        err.to_payload()
    })
}

/// Replaces the stored value for `key`.
#[tauri::command]
pub fn kv_write(store: State<'_, ScopedKvFileStore>, key: String, value: Value) -> KvWriteReply {
    match store.write(&key, &value) {
        Ok(()) => KvWriteReply::ok(),
        Err(err) => {
            error!(key = %key, error = %err, "kv write failed");
            KvWriteReply::failed(err.to_payload())
        }
    }
}
