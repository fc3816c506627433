use platform_host::StorageError;
use serde_json::Value;
use tracing::debug;

pub(crate) async fn kv_read(key: &str) -> Result<Option<Value>, StorageError> {
    super::interop::kv_read(key).await
}

pub(crate) async fn kv_write(key: &str, value: &Value) -> Result<(), StorageError> {
    let reply = super::interop::kv_write(key, value).await?;
    debug!(key, success = reply.success, "host write acknowledged");
    reply.into_result(key)
}
