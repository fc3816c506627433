//! Browser local-storage key/value store.
//!
//! Every key maps to one string slot holding the value's JSON text. Slot access is synchronous
//! at the browser API boundary and wrapped in [`platform_host::KvStore`] for the adapter.
//! Non-wasm builds emulate the slots with a per-thread map so behavior stays testable.

use platform_host::{KvStore, KvStoreFuture, LogicalKey, StorageError};
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static EMULATED_SLOTS: std::cell::RefCell<std::collections::HashMap<String, String>> =
        std::cell::RefCell::new(std::collections::HashMap::new());
}

#[derive(Debug, Clone, Copy, Default)]
/// Key/value store backed by `window.localStorage`.
pub struct WebKvStore;

impl WebKvStore {
    /// Whether the browser storage area can be reached.
    pub fn is_available() -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage().is_ok()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            true
        }
    }

    /// Loads the raw slot text for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when local storage cannot be reached.
    pub fn load_raw(self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|e| StorageError::Unavailable(format!("localStorage get_item failed: {e:?}")))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(EMULATED_SLOTS.with(|slots| slots.borrow().get(key).cloned()))
        }
    }

    /// Replaces the raw slot text for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when local storage cannot be reached, or
    /// [`StorageError::Io`] when the browser rejects the write (for example, quota exceeded).
    pub fn save_raw(self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(key, raw_json)
                .map_err(|e| StorageError::Io {
                    key: key.to_string(),
                    message: format!("localStorage set_item failed: {e:?}"),
                })
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            EMULATED_SLOTS.with(|slots| {
                slots
                    .borrow_mut()
                    .insert(key.to_string(), raw_json.to_string())
            });
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| StorageError::Unavailable("localStorage unavailable".to_string()))
}

/// Decodes slot text, accepting the plain-text credential older builds wrote unquoted.
fn decode_slot(key: &str, raw: &str) -> Result<Value, StorageError> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) if LogicalKey::from_storage_key(key).is_some_and(LogicalKey::is_sensitive) => {
            Ok(Value::String(raw.to_string()))
        }
        Err(err) => Err(StorageError::Parse {
            key: key.to_string(),
            message: err.to_string(),
        }),
    }
}

impl KvStore for WebKvStore {
    fn backend_name(&self) -> &'static str {
        "local-storage"
    }

    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        let store = *self;
        Box::pin(async move {
            store
                .load_raw(key)?
                .map(|raw| decode_slot(key, &raw))
                .transpose()
        })
    }

    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        let store = *self;
        Box::pin(async move {
            let raw = serde_json::to_string(value)
                .map_err(|err| StorageError::Serialize(err.to_string()))?;
            store.save_raw(key, &raw)
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn values_are_stored_as_json_text() {
        let store = WebKvStore;
        block_on(store.write_value("edugen_settings", &json!({"schoolName": "X"})))
            .expect("write");
        assert_eq!(
            store.load_raw("edugen_settings").expect("raw"),
            Some(r#"{"schoolName":"X"}"#.to_string())
        );
        assert_eq!(
            block_on(store.read_value("edugen_settings")).expect("read"),
            Some(json!({"schoolName": "X"}))
        );
        assert_eq!(block_on(store.read_value("never_written")).expect("read"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn corrupt_slot_reports_parse_error() {
        let store = WebKvStore;
        store.save_raw("edugen_vocab_bank", "[{\"word\":").expect("raw write");
        assert!(matches!(
            block_on(store.read_value("edugen_vocab_bank")).expect_err("corrupt"),
            StorageError::Parse { ref key, .. } if key == "edugen_vocab_bank"
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn legacy_plain_text_credential_reads_as_string() {
        let store = WebKvStore;
        store.save_raw("edugen_api_key", "AIzaSy-legacy").expect("raw write");
        assert_eq!(
            block_on(store.read_value("edugen_api_key")).expect("read"),
            Some(json!("AIzaSy-legacy"))
        );

        block_on(store.write_value("edugen_api_key", &json!("fresh"))).expect("write");
        assert_eq!(
            store.load_raw("edugen_api_key").expect("raw"),
            Some("\"fresh\"".to_string())
        );
    }
}
