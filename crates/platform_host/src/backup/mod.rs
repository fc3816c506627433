//! Whole-state backup: document format, errors, and the export/import service.

pub mod document;
pub mod error;
pub mod transfer;
