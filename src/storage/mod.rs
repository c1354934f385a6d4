//! Key-value storage for workspace snapshots
//!
//! Provides:
//! - The `KeyValueStorage` trait the store persists through
//! - An in-memory backend with an optional quota
//! - A file backend with atomic writes

pub mod file;
pub mod memory;

pub use file::*;
pub use memory::*;

use crate::error::StorageResult;

/// String key-value store holding serialized snapshots
///
/// Writes replace the whole value for a key. The store swallows write
/// failures, so backends report them rather than retrying.
pub trait KeyValueStorage {
    /// Read the value under `key`, `None` when nothing is stored
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
}
