//! File-backed storage with atomic writes
//!
//! Each key is kept in `<directory>/<key>.json`. A write goes to a temporary
//! file in the same directory first and is then renamed over the target, so
//! a value is either fully replaced or unchanged.

use super::KeyValueStorage;
use crate::error::{StorageError, StorageResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage keeping one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `directory`; the directory is created on first write
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.json", file_name))
    }

    fn ensure_directory(&self) -> StorageResult<()> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory).map_err(|e| StorageError::DirectoryError {
                path: self.directory.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_directory()?;
        let path = self.path_for(key);
        write_file_atomic(&path, value).map_err(|source| StorageError::WriteError { path, source })
    }
}

/// Replace `path` with `content` through a sibling temporary file
///
/// The temporary file is named `.<file>.<pid>.tmp` and is removed again when
/// any step before the rename fails.
pub fn write_file_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    let staged = std::fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    let result = staged.and_then(|()| std::fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.read("kdpWorkbookEditorWorkspaceState").unwrap(), None);
    }

    #[test]
    fn test_write_creates_directory_and_replaces_value() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested").join("store"));

        storage.write("state", r#"{"a":1}"#).unwrap();
        storage.write("state", r#"{"a":2}"#).unwrap();

        assert_eq!(storage.read("state").unwrap().as_deref(), Some(r#"{"a":2}"#));
        assert!(storage.path_for("state").exists());

        // no temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(storage.directory())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_key_is_sanitized_into_file_name() {
        let storage = FileStorage::new("/tmp/store");
        assert_eq!(
            storage.path_for("../escape/key"),
            PathBuf::from("/tmp/store/___escape_key.json")
        );
    }

    #[test]
    fn test_write_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut storage = FileStorage::new(blocker.join("store"));
        let err = storage.write("state", "{}").unwrap_err();
        assert!(matches!(err, StorageError::DirectoryError { .. }));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // a directory in the way makes the rename fail
        let target = dir.path().join("state.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        assert!(write_file_atomic(&target, "{}").is_err());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
