use super::*;

const NO_BRIDGE: &str = "the desktop host bridge is only available in a wasm32 webview";

pub fn bridge_available() -> bool {
    false
}

pub async fn kv_read(_key: &str) -> Result<Option<Value>, StorageError> {
    Err(StorageError::BridgeUnavailable(NO_BRIDGE.to_string()))
}

pub async fn kv_write(_key: &str, _value: &Value) -> Result<KvWriteReply, StorageError> {
    Err(StorageError::BridgeUnavailable(NO_BRIDGE.to_string()))
}

pub async fn backup_export_file(_request: &ExportFileRequest) -> Result<ExportFileReply, String> {
    Err(NO_BRIDGE.to_string())
}

pub async fn backup_import_file() -> Result<ImportFileReply, String> {
    Err(NO_BRIDGE.to_string())
}
