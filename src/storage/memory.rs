//! In-memory storage backend

use super::KeyValueStorage;
use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;

/// Storage that lives as long as the process
///
/// An optional quota bounds the total size of all stored values, the way a
/// browser caps local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once stored values would exceed `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Storage pre-seeded with one value
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut storage = Self::default();
        storage.values.insert(key.to_string(), value.into());
        storage
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            let size = key.len() + value.len();
            if self.used_bytes_without(key) + size > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    quota,
                });
            }
        }

        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
