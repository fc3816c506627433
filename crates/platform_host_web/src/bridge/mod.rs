//! Host bridge bindings used by the Tauri-backed store and backup transfers.
//!
//! This module is organized by host domain (`kv`, `backup`) on top of the shared `interop`
//! transport glue.

mod backup;
mod interop;
mod kv;

pub(crate) use backup::{export_file, import_file};
pub(crate) use kv::{kv_read, kv_write};

/// Whether the desktop host bridge is reachable from this runtime.
pub(crate) fn bridge_available() -> bool {
    interop::bridge_available()
}
