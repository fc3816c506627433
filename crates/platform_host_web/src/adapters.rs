use platform_host::{
    BackupConfig, BackupError, BackupFuture, BackupService, BackupSink, BackupSource,
    ExportOutcome, FailoverPolicy, ImportOutcome, KvStore, KvStoreFuture, SinkReceipt,
    SourceReceipt, StorageAdapter, StorageError,
};
use serde_json::Value;
use tracing::info;

use crate::{
    TauriBackupSink, TauriBackupSource, TauriKvStore, WebBackupSource, WebDownloadSink, WebKvStore,
};

#[cfg(all(feature = "browser-only", feature = "desktop-host-tauri"))]
compile_error!(
    "features `browser-only` and `desktop-host-tauri` are mutually exclusive; enable only one"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Host strategy selected once at startup.
pub enum HostStrategy {
    /// Browser local storage and file downloads.
    Browser,
    /// Desktop host file store and native dialogs, with browser storage as fallback.
    DesktopTauri,
}

impl HostStrategy {
    /// Stable string token for logs and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::DesktopTauri => "desktop-tauri",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Result of the startup capability probe.
pub struct HostCapabilities {
    /// The desktop host bridge answered the probe.
    pub host_bridge: bool,
    /// Browser local storage is reachable.
    pub local_storage: bool,
}

impl HostCapabilities {
    /// Probes the runtime once.
    pub fn detect() -> Self {
        Self {
            host_bridge: crate::bridge::bridge_available(),
            local_storage: WebKvStore::is_available(),
        }
    }
}

/// Returns the host strategy for this build and the probed `capabilities`.
///
/// The `desktop-host-tauri` and `browser-only` features pin the strategy without consulting the
/// probe.
pub const fn selected_host_strategy(capabilities: HostCapabilities) -> HostStrategy {
    #[cfg(feature = "desktop-host-tauri")]
    {
        let _ = capabilities;
        HostStrategy::DesktopTauri
    }

    #[cfg(feature = "browser-only")]
    {
        let _ = capabilities;
        HostStrategy::Browser
    }

    #[cfg(not(any(feature = "browser-only", feature = "desktop-host-tauri")))]
    {
        if capabilities.host_bridge {
            HostStrategy::DesktopTauri
        } else {
            HostStrategy::Browser
        }
    }
}

/// Adapter enum that erases the concrete key/value backend behind [`KvStore`].
#[derive(Debug, Clone, Copy)]
pub enum KvStoreAdapter {
    /// Browser local storage.
    Browser(WebKvStore),
    /// Desktop host file store.
    DesktopTauri(TauriKvStore),
}

impl KvStore for KvStoreAdapter {
    fn backend_name(&self) -> &'static str {
        match self {
            Self::Browser(store) => store.backend_name(),
            Self::DesktopTauri(store) => store.backend_name(),
        }
    }

    fn read_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KvStoreFuture<'a, Result<Option<Value>, StorageError>> {
        match self {
            Self::Browser(store) => store.read_value(key),
            Self::DesktopTauri(store) => store.read_value(key),
        }
    }

    fn write_value<'a>(
        &'a self,
        key: &'a str,
        value: &'a Value,
    ) -> KvStoreFuture<'a, Result<(), StorageError>> {
        match self {
            Self::Browser(store) => store.write_value(key, value),
            Self::DesktopTauri(store) => store.write_value(key, value),
        }
    }
}

/// Adapter enum that erases the concrete backup destination behind [`BackupSink`].
#[derive(Debug, Clone, Copy)]
pub enum BackupSinkAdapter {
    /// Browser file download.
    Browser(WebDownloadSink),
    /// Desktop save dialog.
    DesktopTauri(TauriBackupSink),
}

impl BackupSink for BackupSinkAdapter {
    fn save_backup<'a>(
        &'a self,
        file_name: &'a str,
        contents: &'a str,
    ) -> BackupFuture<'a, Result<SinkReceipt, BackupError>> {
        match self {
            Self::Browser(sink) => sink.save_backup(file_name, contents),
            Self::DesktopTauri(sink) => sink.save_backup(file_name, contents),
        }
    }
}

/// Adapter enum that erases the concrete backup origin behind [`BackupSource`].
#[derive(Debug, Clone, Copy)]
pub enum BackupSourceAdapter {
    /// Browser runtime without import support.
    Browser(WebBackupSource),
    /// Desktop open dialog.
    DesktopTauri(TauriBackupSource),
}

impl BackupSource for BackupSourceAdapter {
    fn open_backup<'a>(&'a self) -> BackupFuture<'a, Result<SourceReceipt, BackupError>> {
        match self {
            Self::Browser(source) => source.open_backup(),
            Self::DesktopTauri(source) => source.open_backup(),
        }
    }
}

/// Primary key/value backend for `strategy`.
pub fn kv_store(strategy: HostStrategy) -> KvStoreAdapter {
    match strategy {
        HostStrategy::Browser => KvStoreAdapter::Browser(WebKvStore),
        HostStrategy::DesktopTauri => KvStoreAdapter::DesktopTauri(TauriKvStore),
    }
}

/// Backup destination for `strategy`.
pub fn backup_sink(strategy: HostStrategy) -> BackupSinkAdapter {
    match strategy {
        HostStrategy::Browser => BackupSinkAdapter::Browser(WebDownloadSink),
        HostStrategy::DesktopTauri => BackupSinkAdapter::DesktopTauri(TauriBackupSink),
    }
}

/// Backup origin for `strategy`.
pub fn backup_source(strategy: HostStrategy) -> BackupSourceAdapter {
    match strategy {
        HostStrategy::Browser => BackupSourceAdapter::Browser(WebBackupSource),
        HostStrategy::DesktopTauri => BackupSourceAdapter::DesktopTauri(TauriBackupSource),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Startup configuration for the storage services.
pub struct StorageConfig {
    /// Behavior when the primary backend fails transiently.
    pub failover: FailoverPolicy,
    /// Metadata written into exported backups.
    pub backup: BackupConfig,
}

#[derive(Debug, Clone)]
/// Storage services wired for one host strategy.
pub struct StorageServices {
    /// Strategy the services were built for.
    pub strategy: HostStrategy,
    /// Shared storage adapter.
    pub adapter: StorageAdapter,
    /// Backup service over [`StorageServices::adapter`].
    pub backup: BackupService,
    /// Export destination.
    pub sink: BackupSinkAdapter,
    /// Import origin.
    pub source: BackupSourceAdapter,
}

impl StorageServices {
    /// Exports every logical key through the strategy's sink.
    pub async fn export_backup(&self, include_sensitive: bool) -> ExportOutcome {
        self.backup.export_to(&self.sink, include_sensitive).await
    }

    /// Imports a backup through the strategy's source.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFormat`] when the chosen file is not a backup document.
    pub async fn import_backup(&self) -> Result<ImportOutcome, BackupError> {
        self.backup.import_from(&self.source).await
    }
}

/// Probes the runtime once and builds the storage services for the selected strategy.
pub fn build_storage_services(config: StorageConfig) -> StorageServices {
    let capabilities = HostCapabilities::detect();
    let strategy = selected_host_strategy(capabilities);
    info!(
        strategy = strategy.name(),
        host_bridge = capabilities.host_bridge,
        local_storage = capabilities.local_storage,
        "selected storage strategy"
    );
    build_storage_services_for(strategy, config)
}

/// Builds the storage services for an explicit `strategy`.
///
/// The desktop strategy keeps browser storage as the fallback backend.
pub fn build_storage_services_for(strategy: HostStrategy, config: StorageConfig) -> StorageServices {
    let mut adapter = StorageAdapter::new(kv_store(strategy)).with_policy(config.failover);
    if strategy == HostStrategy::DesktopTauri {
        adapter = adapter.with_fallback(kv_store(HostStrategy::Browser));
    }
    let backup = BackupService::new(adapter.clone(), config.backup);
    StorageServices {
        strategy,
        adapter,
        backup,
        sink: backup_sink(strategy),
        source: backup_source(strategy),
    }
}
