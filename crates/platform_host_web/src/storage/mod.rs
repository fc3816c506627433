//! Key/value storage backends for the UI runtime.

pub mod local_kv;
pub mod tauri_kv;
