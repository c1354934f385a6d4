//! Error types for Workbook Publisher
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.
//! None of these escape a store operation as a panic: storage failures are
//! swallowed by the store, malformed snapshots degrade to defaults.

use crate::state::BlockType;
use std::path::PathBuf;
use thiserror::Error;

/// Key-value storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage directory could not be created
    #[error("Could not create storage directory: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading a stored value
    #[error("Could not read stored value: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a stored value
    #[error("Could not write stored value: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value does not fit in the remaining storage budget
    #[error("Storage quota exceeded for {key}: {size} bytes, quota {quota} bytes")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    /// State could not be encoded
    #[error("Could not serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Errors raised while applying field updates to a block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockFieldError {
    /// Patch targets a different block kind than the block it was applied to
    #[error("Cannot apply {patch} fields to {block_id} ({found})")]
    KindMismatch {
        block_id: String,
        patch: BlockType,
        found: BlockType,
    },

    /// Field key does not belong to the block kind
    #[error("Field {field} does not exist on {block_type} blocks")]
    UnknownField { block_type: BlockType, field: String },

    /// Field can never be changed once the block exists
    #[error("Field {field} is immutable")]
    ImmutableField { field: String },

    /// Field value has the wrong shape
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Reasons a stored workspace snapshot is discarded in favor of defaults
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Payload is not valid JSON
    #[error("Stored state is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Payload is valid JSON but not an object
    #[error("Stored state is not an object")]
    NotAnObject,

    /// Block sequence could not be decoded
    #[error("Stored blocks are malformed: {0}")]
    InvalidBlocks(#[source] serde_json::Error),

    /// Two stored blocks share an id
    #[error("Stored blocks repeat id {0}")]
    DuplicateBlockId(String),
}

/// Errors that can occur during export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode export payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid export path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for block field updates
pub type BlockFieldResult<T> = Result<T, BlockFieldError>;

/// Result type alias for snapshot restoration
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

impl StorageError {
    /// Create a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            StorageError::QuotaExceeded { .. } => {
                "Storage is full. Your changes are kept for this session only.".to_string()
            }
            StorageError::WriteError { .. } | StorageError::DirectoryError { .. } => {
                "Could not save the workbook. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::QuotaExceeded {
            key: "workspace".to_string(),
            size: 10,
            quota: 4,
        };
        assert!(err.to_string().contains("workspace"));
        assert!(err.user_message().contains("full"));
    }

    #[test]
    fn test_block_field_error_display() {
        let err = BlockFieldError::KindMismatch {
            block_id: "block_3".to_string(),
            patch: BlockType::Heading,
            found: BlockType::Paragraph,
        };
        let text = err.to_string();
        assert!(text.contains("block_3"));
        assert!(text.contains("heading"));
        assert!(text.contains("paragraph"));
    }
}
