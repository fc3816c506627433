//! UI-runtime implementations of the [`platform_host`] storage and backup contracts.
//!
//! This crate is the concrete wiring layer between the storage adapter and whatever the runtime
//! offers: browser local storage and downloads, or the desktop host's per-key file store and
//! native dialogs reached through the Tauri bridge.
//!
//! Bridge bindings are split by domain under `bridge/`:
//! - `bridge::kv`
//! - `bridge::backup`
//! - `bridge::interop` (shared wasm/non-wasm transport glue)

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Startup capability probe, host-strategy selection, and storage service factories.
pub mod adapters;
mod bridge;
pub mod storage;
pub mod transfer;

pub use adapters::{
    backup_sink, backup_source, build_storage_services, build_storage_services_for, kv_store,
    selected_host_strategy, BackupSinkAdapter, BackupSourceAdapter, HostCapabilities,
    HostStrategy, KvStoreAdapter, StorageConfig, StorageServices,
};
pub use storage::local_kv::WebKvStore;
pub use storage::tauri_kv::TauriKvStore;
pub use transfer::{TauriBackupSink, TauriBackupSource, WebBackupSource, WebDownloadSink};
