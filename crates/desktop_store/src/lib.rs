//! Host-process side of the EduGen file-backed store.
//!
//! The desktop host resolves its data directory once and hands it to [`ScopedKvFileStore`]; every
//! storage key maps to one JSON file in that directory through the fixed file name table in
//! [`platform_host::LogicalKey`]. Backup export/import files chosen through native dialogs are
//! written and read with the helpers in [`backup_files`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod backup_files;
pub mod error;
pub mod store;

pub use backup_files::{read_backup_file, write_backup_file};
pub use error::HostStoreError;
pub use store::ScopedKvFileStore;
