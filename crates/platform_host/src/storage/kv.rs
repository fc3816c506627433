//! Key/value backend contract and reference backends.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::error::StorageError;

/// Object-safe boxed future used by [`KvStore`] async methods.
pub type KvStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Backend storing one JSON value per key.
///
/// Implementations report every failure explicitly; the fallback-to-default policy lives in
/// [`crate::StorageAdapter`].
pub trait KvStore {
    /// Short backend name used in logs and diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Reads the JSON value stored under `key`, or `None` when nothing was stored.
    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>>;

    /// Replaces the value stored under `key`.
    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory key/value store.
pub struct MemoryKvStore {
    inner: Rc<RefCell<HashMap<String, Value>>>,
}

impl MemoryKvStore {
    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl KvStore for MemoryKvStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        Box::pin(async move { Ok(self.inner.borrow().get(key).cloned()) })
    }

    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(key.to_string(), value.clone());
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Store standing in for a host bridge that is not present.
pub struct UnavailableKvStore;

impl KvStore for UnavailableKvStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    fn read_value<'a>(
        &'a self,
        _key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        Box::pin(async {
            Err(StorageError::BridgeUnavailable(
                "no host bridge in this runtime".to_string(),
            ))
        })
    }

    fn write_value<'a>(
        &'a self,
        _key: &'a str,
        _value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        Box::pin(async {
            Err(StorageError::BridgeUnavailable(
                "no host bridge in this runtime".to_string(),
            ))
        })
    }
}

impl<S: KvStore + ?Sized> KvStore for Rc<S> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        (**self).read_value(key)
    }

    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        (**self).write_value(key, value)
    }
}

/// Loads and deserializes a typed value through a [`KvStore`] implementation.
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON does not match `T`.
pub async fn load_value_with<S: KvStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.read_value(key).await? else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let value = serde_json::from_value(raw).map_err(|err| StorageError::Parse {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    Ok(Some(value))
}

/// Serializes and saves a typed value through a [`KvStore`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_value_with<S: KvStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_value(value).map_err(|err| StorageError::Serialize(err.to_string()))?;
    store.write_value(key, &raw).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        school_name: String,
    }

    #[test]
    fn memory_store_round_trip_and_overwrite() {
        let store = MemoryKvStore::default();
        let store_obj: &dyn KvStore = &store;

        assert_eq!(block_on(store_obj.read_value("k")).expect("read"), None);
        block_on(store_obj.write_value("k", &json!([1, 2]))).expect("write");
        block_on(store_obj.write_value("k", &json!({"v": 2}))).expect("overwrite");
        assert_eq!(
            block_on(store_obj.read_value("k")).expect("read"),
            Some(json!({"v": 2}))
        );
        assert_eq!(store.keys(), vec!["k".to_string()]);
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryKvStore::default();
        let clone = store.clone();
        block_on(store.write_value("shared", &json!(true))).expect("write");
        assert_eq!(
            block_on(clone.read_value("shared")).expect("read"),
            Some(json!(true))
        );
    }

    #[test]
    fn typed_helpers_round_trip() {
        let store = MemoryKvStore::default();
        block_on(save_value_with(
            &store,
            "settings",
            &Settings {
                school_name: "X".to_string(),
            },
        ))
        .expect("save typed");

        let loaded: Option<Settings> = block_on(load_value_with(&store, "settings")).expect("load");
        assert_eq!(
            loaded,
            Some(Settings {
                school_name: "X".to_string()
            })
        );
    }

    #[test]
    fn typed_load_treats_null_as_absent_and_reports_type_mismatch() {
        let store = MemoryKvStore::default();
        block_on(store.write_value("settings", &Value::Null)).expect("write null");
        let loaded: Option<Settings> = block_on(load_value_with(&store, "settings")).expect("load");
        assert_eq!(loaded, None);

        block_on(store.write_value("settings", &json!([1]))).expect("write array");
        let err = block_on(load_value_with::<_, Settings>(&store, "settings"))
            .expect_err("array is not settings");
        assert!(matches!(err, StorageError::Parse { ref key, .. } if key == "settings"));
    }

    #[test]
    fn unavailable_store_reports_bridge_unavailable() {
        let store = UnavailableKvStore;
        let err = block_on(store.read_value("k")).expect_err("read fails");
        assert!(err.is_transient());
        let err = block_on(store.write_value("k", &json!(1))).expect_err("write fails");
        assert!(matches!(err, StorageError::BridgeUnavailable(_)));
    }
}
