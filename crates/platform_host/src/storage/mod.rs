//! Key/value storage: logical keys, backend contract, adapter, and typed collections.

pub mod adapter;
pub mod collections;
pub mod error;
pub mod keys;
pub mod kv;
