use super::*;
use js_sys::Promise;
use platform_host::{
    HostErrorPayload, BACKUP_EXPORT_COMMAND, BACKUP_IMPORT_COMMAND, KV_READ_COMMAND,
    KV_WRITE_COMMAND,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(inline_js = r#"
function tauriInvoke() {
  const tauri = globalThis.__TAURI__;
  if (tauri && tauri.core && typeof tauri.core.invoke === 'function') {
    return tauri.core.invoke;
  }
  const internals = globalThis.__TAURI_INTERNALS__;
  if (internals && typeof internals.invoke === 'function') {
    return internals.invoke;
  }
  return null;
}

export function jsBridgeAvailable() {
  return tauriInvoke() !== null;
}

export function jsInvoke(command, args) {
  const invoke = tauriInvoke();
  if (invoke === null) {
    return Promise.reject(new Error('Tauri bridge is not available'));
  }
  return invoke(command, args);
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsBridgeAvailable)]
    fn js_bridge_available() -> bool;
    #[wasm_bindgen(js_name = jsInvoke)]
    fn js_invoke(command: &str, args: JsValue) -> Promise;
}

#[derive(Serialize)]
struct KeyArgs<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct WriteArgs<'a> {
    key: &'a str,
    value: &'a Value,
}

#[derive(Serialize)]
struct NoArgs {}

fn js_error_to_string(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

fn to_js_args<T: Serialize>(args: &T) -> Result<JsValue, String> {
    args.serialize(&Serializer::json_compatible())
        .map_err(|err| err.to_string())
}

async fn invoke_raw<A: Serialize>(command: &str, args: &A) -> Result<JsValue, JsValue> {
    let args = to_js_args(args).map_err(|err| JsValue::from_str(&err))?;
    JsFuture::from(js_invoke(command, args)).await
}

fn storage_rejection(err: JsValue) -> StorageError {
    match from_value::<HostErrorPayload>(err.clone()) {
        Ok(payload) => payload.into(),
        Err(_) => StorageError::BridgeUnavailable(js_error_to_string(&err)),
    }
}

async fn invoke_json<A: Serialize, T: DeserializeOwned>(
    command: &str,
    args: &A,
) -> Result<T, String> {
    let value = invoke_raw(command, args)
        .await
        .map_err(|err| js_error_to_string(&err))?;
    from_value(value).map_err(|err| err.to_string())
}

pub fn bridge_available() -> bool {
    js_bridge_available()
}

pub async fn kv_read(key: &str) -> Result<Option<Value>, StorageError> {
    let value = invoke_raw(KV_READ_COMMAND, &KeyArgs { key })
        .await
        .map_err(storage_rejection)?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    from_value(value).map(Some).map_err(|err| StorageError::Parse {
        key: key.to_string(),
        message: err.to_string(),
    })
}

pub async fn kv_write(key: &str, value: &Value) -> Result<KvWriteReply, StorageError> {
    let reply = invoke_raw(KV_WRITE_COMMAND, &WriteArgs { key, value })
        .await
        .map_err(storage_rejection)?;
    from_value(reply).map_err(|err| StorageError::BridgeUnavailable(err.to_string()))
}

pub async fn backup_export_file(request: &ExportFileRequest) -> Result<ExportFileReply, String> {
    invoke_json(BACKUP_EXPORT_COMMAND, request).await
}

pub async fn backup_import_file() -> Result<ImportFileReply, String> {
    invoke_json(BACKUP_IMPORT_COMMAND, &NoArgs {}).await
}
