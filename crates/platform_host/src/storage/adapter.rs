//! Uniform async get/set/remove over an injected primary backend and an optional fallback.
//!
//! The adapter is the only place where backend failures turn into default values. Backends
//! always report errors; the adapter decides, according to its [`FailoverPolicy`], whether to
//! retry on the fallback backend, and records every absorbed failure in [`StorageHealth`] so the
//! UI can show a degraded-storage state instead of failing invisibly.

use std::{cell::RefCell, fmt, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use super::{error::StorageError, kv::KvStore};

/// What the adapter does when the primary backend reports a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailoverPolicy {
    /// Retry the operation on the fallback backend. Data written to one backend is not visible
    /// through the other.
    #[default]
    FallbackToSecondary,
    /// Never switch backends; the failure is absorbed (lenient API) or returned (strict API).
    FailLoudly,
}

/// Snapshot of absorbed storage failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageHealth {
    /// Set once any non-parse failure has been absorbed.
    pub degraded: bool,
    /// Number of operations that were redirected to the fallback backend.
    pub failovers: u32,
    /// Most recent failure message.
    pub last_error: Option<String>,
}

/// Storage adapter routing every call to the backend chosen at startup.
#[derive(Clone)]
pub struct StorageAdapter {
    primary: Rc<dyn KvStore>,
    fallback: Option<Rc<dyn KvStore>>,
    policy: FailoverPolicy,
    health: Rc<RefCell<StorageHealth>>,
}

impl fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("primary", &self.primary.backend_name())
            .field("fallback", &self.fallback_backend_name())
            .field("policy", &self.policy)
            .field("health", &*self.health.borrow())
            .finish()
    }
}

impl StorageAdapter {
    /// Creates an adapter with a single backend.
    pub fn new(primary: impl KvStore + 'static) -> Self {
        Self {
            primary: Rc::new(primary),
            fallback: None,
            policy: FailoverPolicy::default(),
            health: Rc::new(RefCell::new(StorageHealth::default())),
        }
    }

    /// Sets the backend used when the primary reports a transient failure.
    pub fn with_fallback(mut self, fallback: impl KvStore + 'static) -> Self {
        self.fallback = Some(Rc::new(fallback));
        self
    }

    /// Sets the failover policy.
    pub fn with_policy(mut self, policy: FailoverPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active failover policy.
    pub fn policy(&self) -> FailoverPolicy {
        self.policy
    }

    /// Name of the primary backend.
    pub fn primary_backend_name(&self) -> &'static str {
        self.primary.backend_name()
    }

    /// Name of the fallback backend, if one is configured.
    pub fn fallback_backend_name(&self) -> Option<&'static str> {
        self.fallback.as_ref().map(|store| store.backend_name())
    }

    /// Returns a copy of the current health snapshot.
    pub fn health(&self) -> StorageHealth {
        self.health.borrow().clone()
    }

    /// Reads the stored value for `key`, returning `default` when it is absent, `null`,
    /// unreadable, or not a `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.read_or_absorb(key).await else {
            return default;
        };
        match serde_json::from_value(raw) {
            Ok(value) => value,
            Err(err) => {
                let err = StorageError::Parse {
                    key: key.to_string(),
                    message: err.to_string(),
                };
                warn!(key, error = %err, "stored value has unexpected shape; using default");
                self.record_failure(&err);
                default
            }
        }
    }

    /// Reads the raw JSON value for `key`, returning `default` on absence or failure.
    pub async fn get_value(&self, key: &str, default: Value) -> Value {
        self.read_or_absorb(key).await.unwrap_or(default)
    }

    /// Persists `value` under `key`, replacing any prior value.
    ///
    /// Failures are logged and recorded in [`StorageAdapter::health`], never returned.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_value(value) {
            Ok(raw) => raw,
            Err(err) => {
                let err = StorageError::Serialize(err.to_string());
                error!(key, error = %err, "dropping write");
                self.record_failure(&err);
                return;
            }
        };
        if let Err(err) = self.try_set(key, &raw).await {
            error!(key, error = %err, "write failed and was dropped");
            self.record_failure(&err);
        }
    }

    /// Clears `key` by writing a `null` placeholder.
    pub async fn remove(&self, key: &str) {
        self.set(key, &Value::Null).await;
    }

    /// Reads the raw JSON value for `key`, reporting failures to the caller.
    ///
    /// A stored `null` is reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the read fails on every backend the policy allows.
    pub async fn try_get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let result = match self.primary.read_value(key).await {
            Err(err) if err.is_transient() => match self.failover_target(&err, "read", key) {
                Some(fallback) => fallback.read_value(key).await,
                None => Err(err),
            },
            other => other,
        };
        result.map(|value| value.filter(|value| !value.is_null()))
    }

    /// Writes the raw JSON value for `key`, reporting failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the write fails on every backend the policy allows.
    pub async fn try_set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        match self.primary.write_value(key, value).await {
            Err(err) if err.is_transient() => match self.failover_target(&err, "write", key) {
                Some(fallback) => fallback.write_value(key, value).await,
                None => Err(err),
            },
            other => other,
        }
    }

    async fn read_or_absorb(&self, key: &str) -> Option<Value> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "read failed; using default");
                self.record_failure(&err);
                None
            }
        }
    }

    fn failover_target(
        &self,
        err: &StorageError,
        operation: &'static str,
        key: &str,
    ) -> Option<&Rc<dyn KvStore>> {
        self.record_failure(err);
        let fallback = match (self.policy, self.fallback.as_ref()) {
            (FailoverPolicy::FallbackToSecondary, Some(fallback)) => fallback,
            _ => return None,
        };
        warn!(
            key,
            operation,
            from = self.primary.backend_name(),
            to = fallback.backend_name(),
            error = %err,
            "primary storage backend failed; failing over"
        );
        self.health.borrow_mut().failovers += 1;
        Some(fallback)
    }

    fn record_failure(&self, err: &StorageError) {
        let mut health = self.health.borrow_mut();
        if !matches!(err, StorageError::Parse { .. }) {
            health.degraded = true;
        }
        health.last_error = Some(err.to_string());
    }
}
