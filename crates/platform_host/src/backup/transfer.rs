//! Backup export/import over the [`StorageAdapter`].
//!
//! Export reads every logical key through the adapter and hands the rendered document to a
//! [`BackupSink`]. Import reads text from a [`BackupSource`], validates it completely, snapshots
//! the current values, and only then writes each key; a failed write rolls the already-written
//! keys back to their snapshot.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde_json::Value;
use tracing::{error, info, warn};

use super::{
    document::{
        backup_file_name, parse_backup, render_backup, BackupData, BackupDocument, BackupMeta,
        BACKUP_FILE_STEM, BACKUP_FORMAT_VERSION, BACKUP_PLATFORM,
    },
    error::BackupError,
};
use crate::{
    storage::{adapter::StorageAdapter, error::StorageError, keys::LogicalKey},
    time::unix_time_ms_now,
};

/// Object-safe boxed future used by backup sink/source methods.
pub type BackupFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// What a sink did with an exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkReceipt {
    /// The document was written; `path` is known when a native dialog chose it.
    Saved {
        /// Destination path.
        path: Option<String>,
    },
    /// The user dismissed the destination picker.
    Cancelled,
}

/// What a source produced for an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReceipt {
    /// Backup text read from the chosen file.
    Opened(String),
    /// The user dismissed the file picker.
    Cancelled,
}

/// Destination for exported backup text.
pub trait BackupSink {
    /// Writes `contents`, suggesting `file_name` to the user.
    fn save_backup<'a>(
        &'a self,
        file_name: &'a str,
        contents: &'a str,
    ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>>;
}

/// Origin of backup text to import.
pub trait BackupSource {
    /// Lets the user pick a backup and returns its text.
    fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory sink recording every saved backup as `(file_name, contents)`.
pub struct MemoryBackupSink {
    saved: Rc<RefCell<Vec<(String, String)>>>,
}

impl MemoryBackupSink {
    /// Saved backups in save order.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.borrow().clone()
    }

    /// Contents of the most recent save.
    pub fn last_contents(&self) -> Option<String> {
        self.saved.borrow().last().map(|(_, contents)| contents.clone())
    }
}

impl BackupSink for MemoryBackupSink {
    fn save_backup<'a>(
        &'a self,
        file_name: &'a str,
        contents: &'a str,
    ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>> {
        Box::pin(async move {
            self.saved
                .borrow_mut()
                .push((file_name.to_string(), contents.to_string()));
            Ok(SinkReceipt::Saved {
                path: Some(file_name.to_string()),
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Source returning fixed text, or a cancellation when empty.
pub struct MemoryBackupSource {
    contents: Option<String>,
}

impl MemoryBackupSource {
    /// Source yielding `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }

    /// Source behaving like a dismissed file picker.
    pub fn cancelled() -> Self {
        Self { contents: None }
    }
}

impl BackupSource for MemoryBackupSource {
    fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>> {
        Box::pin(async move {
            Ok(match &self.contents {
                Some(contents) => SourceReceipt::Opened(contents.clone()),
                None => SourceReceipt::Cancelled,
            })
        })
    }
}

/// Metadata written into exported backups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// Format version string.
    pub format_version: String,
    /// Platform tag.
    pub platform: String,
    /// Suggested file name prefix.
    pub file_stem: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            format_version: BACKUP_FORMAT_VERSION.to_string(),
            platform: BACKUP_PLATFORM.to_string(),
            file_stem: BACKUP_FILE_STEM.to_string(),
        }
    }
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The backup was written.
    Saved {
        /// Destination path, when known.
        path: Option<String>,
    },
    /// The user dismissed the destination picker.
    Cancelled,
    /// The export failed; `message` is meant for the user.
    Failed {
        /// User-facing failure message.
        message: String,
    },
}

impl ExportOutcome {
    /// Whether the backup was written.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Result of an import that passed format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every staged key was written, in this order.
    Restored {
        /// Keys overwritten by the import.
        keys: Vec<LogicalKey>,
    },
    /// The user dismissed the file picker.
    Cancelled,
    /// The import did not complete; `message` is meant for the user.
    Failed {
        /// User-facing failure message.
        message: String,
    },
}

impl ImportOutcome {
    /// Whether the import succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }

    /// Whether in-memory application state must be reloaded from storage.
    pub fn requires_reload(&self) -> bool {
        self.is_success()
    }
}

/// Whole-state export/import service.
#[derive(Debug, Clone)]
pub struct BackupService {
    storage: StorageAdapter,
    config: BackupConfig,
}

impl BackupService {
    /// Creates a backup service over `storage`.
    pub fn new(storage: StorageAdapter, config: BackupConfig) -> Self {
        Self { storage, config }
    }

    /// Storage adapter used for reads and writes.
    pub fn storage(&self) -> &StorageAdapter {
        &self.storage
    }

    /// Reads every logical key into a new document.
    ///
    /// The credential is left out when `include_sensitive` is `false`.
    pub async fn collect_document(&self, include_sensitive: bool) -> BackupDocument {
        let mut data = BackupData::default();
        for key in LogicalKey::ALL {
            if key.is_sensitive() && !include_sensitive {
                continue;
            }
            let value = self
                .storage
                .get_value(key.as_str(), key.default_value())
                .await;
            data.set(key, Some(value));
        }
        BackupDocument {
            meta: BackupMeta {
                version: self.config.format_version.clone(),
                timestamp: unix_time_ms_now(),
                platform: self.config.platform.clone(),
            },
            data,
        }
    }

    /// Collects, renders, and saves a backup through `sink`.
    pub async fn export_to<S: BackupSink + ?Sized>(
        &self,
        sink: &S,
        include_sensitive: bool,
    ) -> ExportOutcome {
        let document = self.collect_document(include_sensitive).await;
        let contents = match render_backup(&document) {
            Ok(contents) => contents,
            Err(err) => {
                error!(error = %err, "backup export failed");
                return ExportOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };
        let file_name = backup_file_name(&self.config.file_stem, document.meta.timestamp);
        match sink.save_backup(&file_name, &contents).await {
            Ok(SinkReceipt::Saved { path }) => {
                info!(file_name = %file_name, include_sensitive, "backup exported");
                ExportOutcome::Saved { path }
            }
            Ok(SinkReceipt::Cancelled) => ExportOutcome::Cancelled,
            Err(err) => {
                error!(error = %err, "backup export failed");
                ExportOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Reads a backup from `source` and restores it.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFormat`] when the text is not a valid backup document; no
    /// key has been written in that case. Every other failure is reported as
    /// [`ImportOutcome::Failed`].
    pub async fn import_from<S: BackupSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<ImportOutcome, BackupError> {
        let text = match source.open_backup().await {
            Ok(SourceReceipt::Opened(text)) => text,
            Ok(SourceReceipt::Cancelled) => return Ok(ImportOutcome::Cancelled),
            Err(err) => {
                warn!(error = %err, "backup import unavailable");
                return Ok(ImportOutcome::Failed {
                    message: err.to_string(),
                });
            }
        };
        let document = parse_backup(&text)?;
        match self.restore_document(&document).await {
            Ok(keys) => Ok(ImportOutcome::Restored { keys }),
            Err(err) if err.is_format_error() => Err(err),
            Err(err) => Ok(ImportOutcome::Failed {
                message: err.to_string(),
            }),
        }
    }

    /// Writes every staged value of `document`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFormat`] when a value has the wrong shape (nothing is
    /// written), [`BackupError::Storage`] when the pre-import snapshot cannot be read (nothing is
    /// written; stored values that do not parse count as absent), or [`BackupError::RestoreFailed`] when a write fails after rollback.
    pub async fn restore_document(
        &self,
        document: &BackupDocument,
    ) -> Result<Vec<LogicalKey>, BackupError> {
        document.data.check_shapes()?;
        let staged = document.data.staged_entries();

        let mut snapshot: Vec<(LogicalKey, Option<Value>)> = Vec::with_capacity(staged.len());
        for (key, _) in &staged {
            let previous = match self.storage.try_get(key.as_str()).await {
                Ok(previous) => previous,
                Err(err @ StorageError::Parse { .. }) => {
                    warn!(key = key.as_str(), error = %err, "unreadable value treated as absent");
                    None
                }
                Err(err) => return Err(err.into()),
            };
            snapshot.push((*key, previous));
        }

        for (index, (key, value)) in staged.iter().enumerate() {
            if let Err(err) = self.storage.try_set(key.as_str(), value).await {
                error!(key = key.as_str(), error = %err, "restore write failed; rolling back");
                let rolled_back = self.roll_back(&snapshot[..index]).await;
                return Err(BackupError::RestoreFailed {
                    key: *key,
                    message: err.to_string(),
                    rolled_back,
                });
            }
        }

        let keys = staged.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
        info!(restored = keys.len(), "backup restored");
        Ok(keys)
    }

    async fn roll_back(&self, written: &[(LogicalKey, Option<Value>)]) -> usize {
        let mut restored = 0;
        for (key, previous) in written.iter().rev() {
            let value = previous.clone().unwrap_or(Value::Null);
            match self.storage.try_set(key.as_str(), &value).await {
                Ok(()) => restored += 1,
                Err(err) => error!(key = key.as_str(), error = %err, "rollback write failed"),
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::storage::kv::{KvStore, KvStoreFuture, MemoryKvStore};

    fn service_with(store: impl KvStore + 'static) -> BackupService {
        BackupService::new(StorageAdapter::new(store), BackupConfig::default())
    }

    /// Memory store that rejects writes to one key once armed, and can hold one corrupt slot.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryKvStore,
        reject: Rc<RefCell<Option<String>>>,
        corrupt: Rc<RefCell<Option<String>>>,
        writes: Rc<Cell<u32>>,
    }

    impl KvStore for FlakyStore {
        fn backend_name(&self) -> &'static str {
            "flaky"
        }

        fn read_value<'a>(
            &'a self,
            key: &'a str,
        ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
            if self.corrupt.borrow().as_deref() == Some(key) {
                return Box::pin(async move {
                    Err(StorageError::Parse {
                        key: key.to_string(),
                        message: "EOF while parsing a list".to_string(),
                    })
                });
            }
            self.inner.read_value(key)
        }

        fn write_value<'a>(
            &'a self,
            key: &'a str,
            value: &'a Value,
        ) -> KvStoreFuture<'a, Result<(), StorageError>> {
            self.writes.set(self.writes.get() + 1);
            if self.reject.borrow().as_deref() == Some(key) {
                return Box::pin(async move {
                    Err(StorageError::Io {
                        key: key.to_string(),
                        message: "disk full".to_string(),
                    })
                });
            }
            if self.corrupt.borrow().as_deref() == Some(key) {
                self.corrupt.replace(None);
            }
            self.inner.write_value(key, value)
        }
    }

    fn seed(storage: &StorageAdapter) {
        block_on(storage.set(LogicalKey::Settings.as_str(), &json!({"schoolName": "X"})));
        block_on(storage.set(LogicalKey::ApiKey.as_str(), &json!("secret123")));
        block_on(storage.set(LogicalKey::Exams.as_str(), &json!([{"id": 1}])));
        block_on(storage.set(LogicalKey::Vocab.as_str(), &json!([{"word": "cat"}])));
    }

    fn snapshot(storage: &StorageAdapter) -> Vec<Value> {
        LogicalKey::ALL
            .into_iter()
            .map(|key| block_on(storage.get_value(key.as_str(), key.default_value())))
            .collect()
    }

    #[test]
    fn export_without_credential_omits_api_key() {
        let service = service_with(MemoryKvStore::default());
        seed(service.storage());
        let sink = MemoryBackupSink::default();

        let outcome = block_on(service.export_to(&sink, false));
        assert!(outcome.is_success());

        let contents = sink.last_contents().expect("saved");
        let value: Value = serde_json::from_str(&contents).expect("json");
        assert!(value["data"].get("apiKey").is_none());
        assert_eq!(value["data"]["settings"]["schoolName"], json!("X"));
        assert_eq!(value["data"]["leaderboard"], json!([]));
        assert_eq!(value["meta"]["platform"], json!("EduGen Pro"));
        assert_eq!(value["meta"]["version"], json!("2.0"));

        let (file_name, _) = &sink.saved()[0];
        assert!(file_name.starts_with("EduGen_Backup_"));
        assert!(file_name.ends_with(".json"));
    }

    #[test]
    fn export_with_credential_includes_api_key() {
        let service = service_with(MemoryKvStore::default());
        seed(service.storage());
        let document = block_on(service.collect_document(true));
        assert_eq!(document.data.get(LogicalKey::ApiKey), Some(&json!("secret123")));
    }

    #[test]
    fn export_then_import_restores_every_key() {
        let service = service_with(MemoryKvStore::default());
        seed(service.storage());
        let before = snapshot(service.storage());
        let sink = MemoryBackupSink::default();
        assert!(block_on(service.export_to(&sink, true)).is_success());

        block_on(service.storage().set(LogicalKey::Settings.as_str(), &json!({"schoolName": "Y"})));
        block_on(service.storage().set(LogicalKey::ApiKey.as_str(), &json!("other")));
        block_on(service.storage().set(LogicalKey::Leaderboard.as_str(), &json!([{"score": 1}])));

        let source = MemoryBackupSource::with_contents(sink.last_contents().expect("saved"));
        let outcome = block_on(service.import_from(&source)).expect("valid backup");
        assert!(outcome.requires_reload());
        assert_eq!(snapshot(service.storage()), before);
    }

    #[test]
    fn import_of_export_without_credential_leaves_credential_untouched() {
        let service = service_with(MemoryKvStore::default());
        seed(service.storage());
        let sink = MemoryBackupSink::default();
        block_on(service.export_to(&sink, false));

        block_on(service.storage().set(LogicalKey::ApiKey.as_str(), &json!("rotated")));
        let source = MemoryBackupSource::with_contents(sink.last_contents().expect("saved"));
        let outcome = block_on(service.import_from(&source)).expect("valid backup");

        let ImportOutcome::Restored { keys } = outcome else {
            panic!("expected a completed restore");
        };
        assert!(!keys.contains(&LogicalKey::ApiKey));
        assert_eq!(
            block_on(service.storage().get_value(LogicalKey::ApiKey.as_str(), json!(""))),
            json!("rotated")
        );
    }

    #[test]
    fn import_without_data_block_is_rejected_before_any_write() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        seed(service.storage());
        let before = snapshot(service.storage());
        let writes_before = store.writes.get();

        let source = MemoryBackupSource::with_contents(r#"{"meta": {"version": "2.0"}}"#);
        let err = block_on(service.import_from(&source)).expect_err("invalid format");
        assert!(err.is_format_error());
        assert_eq!(store.writes.get(), writes_before);
        assert_eq!(snapshot(service.storage()), before);
    }

    #[test]
    fn import_with_wrong_shape_is_rejected_before_any_write() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        let source = MemoryBackupSource::with_contents(
            r#"{"meta": {}, "data": {"exams": [], "settings": "oops"}}"#,
        );
        let err = block_on(service.import_from(&source)).expect_err("invalid shape");
        assert_eq!(
            err,
            BackupError::InvalidFormat("`data.settings` must be a JSON object".to_string())
        );
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn failed_write_rolls_back_earlier_keys() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        seed(service.storage());
        let before = snapshot(service.storage());
        *store.reject.borrow_mut() = Some(LogicalKey::Leaderboard.as_str().to_string());

        let source = MemoryBackupSource::with_contents(
            json!({
                "meta": {"version": "2.0", "timestamp": 1, "platform": "EduGen Pro"},
                "data": {
                    "exams": [{"id": 99}],
                    "vocab": [],
                    "settings": {"schoolName": "Z"},
                    "leaderboard": [{"score": 3}],
                    "speakingManual": [{"q": "hi"}]
                }
            })
            .to_string(),
        );
        let outcome = block_on(service.import_from(&source)).expect("format is valid");
        let ImportOutcome::Failed { message } = outcome else {
            panic!("expected a failed restore");
        };
        assert!(message.contains(LogicalKey::Leaderboard.as_str()));
        assert!(message.contains("rolled back 3 key(s)"));
        assert_eq!(snapshot(service.storage()), before);
        assert_eq!(
            block_on(store.inner.read_value(LogicalKey::SpeakingManual.as_str())).expect("read"),
            None
        );
    }

    #[test]
    fn import_overwrites_a_slot_holding_corrupt_json() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        seed(service.storage());
        *store.corrupt.borrow_mut() = Some(LogicalKey::Vocab.as_str().to_string());

        let source = MemoryBackupSource::with_contents(
            json!({
                "meta": {"version": "2.0", "timestamp": 1, "platform": "EduGen Pro"},
                "data": {
                    "vocab": [{"word": "dog"}],
                    "settings": {"schoolName": "Restored"}
                }
            })
            .to_string(),
        );
        let outcome = block_on(service.import_from(&source)).expect("valid backup");
        assert_eq!(
            outcome,
            ImportOutcome::Restored {
                keys: vec![LogicalKey::Vocab, LogicalKey::Settings]
            }
        );
        assert_eq!(
            block_on(service.storage().get_value(LogicalKey::Vocab.as_str(), json!([]))),
            json!([{"word": "dog"}])
        );
        assert_eq!(
            block_on(service.storage().get_value(LogicalKey::Settings.as_str(), json!({}))),
            json!({"schoolName": "Restored"})
        );
    }

    #[test]
    fn rollback_restores_corrupt_slot_as_null_placeholder() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        *store.corrupt.borrow_mut() = Some(LogicalKey::Exams.as_str().to_string());
        *store.reject.borrow_mut() = Some(LogicalKey::Settings.as_str().to_string());

        let mut data = BackupData::default();
        data.set(LogicalKey::Exams, Some(json!([1])));
        data.set(LogicalKey::Settings, Some(json!({})));
        let document = BackupDocument {
            meta: BackupMeta {
                version: "2.0".into(),
                timestamp: 0,
                platform: "test".into(),
            },
            data,
        };
        let err = block_on(service.restore_document(&document)).expect_err("write fails");
        assert!(matches!(
            err,
            BackupError::RestoreFailed { key: LogicalKey::Settings, rolled_back: 1, .. }
        ));
        assert_eq!(
            block_on(store.inner.read_value(LogicalKey::Exams.as_str())).expect("read"),
            Some(Value::Null)
        );
    }

    #[test]
    fn rollback_restores_never_written_keys_as_null_placeholder() {
        let store = FlakyStore::default();
        let service = service_with(store.clone());
        *store.reject.borrow_mut() = Some(LogicalKey::Settings.as_str().to_string());

        let mut data = BackupData::default();
        data.set(LogicalKey::Exams, Some(json!([1])));
        data.set(LogicalKey::Settings, Some(json!({})));
        let document = BackupDocument {
            meta: BackupMeta {
                version: "2.0".into(),
                timestamp: 0,
                platform: "test".into(),
            },
            data,
        };
        let err = block_on(service.restore_document(&document)).expect_err("write fails");
        assert!(matches!(
            err,
            BackupError::RestoreFailed { key: LogicalKey::Settings, rolled_back: 1, .. }
        ));
        assert_eq!(
            block_on(store.inner.read_value(LogicalKey::Exams.as_str())).expect("read"),
            Some(Value::Null)
        );
    }

    #[test]
    fn cancelled_dialogs_are_not_errors() {
        let service = service_with(MemoryKvStore::default());
        assert_eq!(
            block_on(service.import_from(&MemoryBackupSource::cancelled())),
            Ok(ImportOutcome::Cancelled)
        );

        struct CancellingSink;
        impl BackupSink for CancellingSink {
            fn save_backup<'a>(
                &'a self,
                _file_name: &'a str,
                _contents: &'a str,
            ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>> {
                Box::pin(async { Ok(SinkReceipt::Cancelled) })
            }
        }
        let outcome = block_on(service.export_to(&CancellingSink, true));
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert!(!outcome.is_success());
    }

    #[test]
    fn unsupported_source_reports_failure_without_error() {
        struct NoImport;
        impl BackupSource for NoImport {
            fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>> {
                Box::pin(async {
                    Err(BackupError::Unsupported(
                        "import requires the desktop app".to_string(),
                    ))
                })
            }
        }
        let service = service_with(MemoryKvStore::default());
        let outcome = block_on(service.import_from(&NoImport)).expect("not a format error");
        assert_eq!(
            outcome,
            ImportOutcome::Failed {
                message: "import requires the desktop app".to_string()
            }
        );
        assert!(!outcome.requires_reload());
    }
}
