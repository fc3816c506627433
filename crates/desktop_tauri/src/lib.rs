//! Tauri desktop host for EduGen.
//!
//! The host owns the on-disk store: it resolves the application data directory once at startup,
//! keeps a [`desktop_store::ScopedKvFileStore`] in managed state, and serves the storage and
//! backup commands the UI process calls over the bridge.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod backup_files;
mod kv;

use desktop_store::ScopedKvFileStore;
use tauri::Manager;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Subdirectory of the application data directory holding the per-key files.
pub const STORE_DIR_NAME: &str = "store";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Starts the Tauri desktop host process.
pub fn run() {
    init_tracing();
    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let root = app.path().app_data_dir()?.join(STORE_DIR_NAME);
            let store = ScopedKvFileStore::from_root(&root)?;
            info!(root = %root.display(), "file store ready");
            app.manage(store);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            kv::kv_read,
            kv::kv_write,
            backup_files::backup_export_file,
            backup_files::backup_import_file
        ])
        .run(tauri::generate_context!());
    if let Err(err) = result {
        error!(error = %err, "desktop host exited with an error");
        std::process::exit(1);
    }
}
