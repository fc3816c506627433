//! Typed persistence contracts shared by the EduGen UI runtime and its desktop host.
//!
//! This crate owns the logical key table, the async key/value backend contract, the storage
//! adapter that applies the default-value and failover policy, and the backup document plus the
//! export/import service built on top of it. Browser and Tauri backends live in
//! `platform_host_web`; the host-side file store lives in `desktop_store`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod backup;
pub mod ipc;
pub mod storage;
pub mod time;

pub use backup::document::{
    backup_file_name, parse_backup, render_backup, BackupData, BackupDocument, BackupMeta,
    BACKUP_FILE_STEM, BACKUP_FORMAT_VERSION, BACKUP_PLATFORM,
};
pub use backup::error::BackupError;
pub use backup::transfer::{
    BackupConfig, BackupFuture, BackupService, BackupSink, BackupSource, ExportOutcome,
    ImportOutcome, MemoryBackupSink, MemoryBackupSource, SinkReceipt, SourceReceipt,
};
pub use ipc::{
    ExportFileReply, ExportFileRequest, HostErrorKind, HostErrorPayload, ImportFileReply,
    KvWriteReply, BACKUP_EXPORT_COMMAND, BACKUP_IMPORT_COMMAND, KV_READ_COMMAND,
    KV_WRITE_COMMAND,
};
pub use storage::adapter::{FailoverPolicy, StorageAdapter, StorageHealth};
pub use storage::collections::{
    Leaderboard, LeaderboardEntry, VocabBank, VocabularyItem, DEFAULT_VOCAB_TOPIC,
    LEADERBOARD_CAPACITY,
};
pub use storage::error::StorageError;
pub use storage::keys::{file_name_for_key, validate_key, LogicalKey, ValueShape};
pub use storage::kv::{
    load_value_with, save_value_with, KvStore, KvStoreFuture, MemoryKvStore, UnavailableKvStore,
};
pub use time::{unix_time_ms_now, utc_date_stamp};
