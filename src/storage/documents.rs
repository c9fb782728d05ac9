// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON document files on the local filesystem.
//!
//! Every document is one pretty-printed JSON file. Writes go to a uniquely
//! named temporary file that is then renamed over the target, so readers
//! never observe a half-written document.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::StoragePaths;

/// Error type for document storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Entity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    paths: StoragePaths,
    initialized: bool,
}

impl DocumentStore {
    /// Create a new DocumentStore instance.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the collection directories. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        for dir in [self.paths.users_dir(), self.paths.adverts_dir()] {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        tracing::info!(root = %self.paths.root().display(), "Document store initialized");
        Ok(())
    }

    /// Write, read back and remove a probe file under the root.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let probe = self.paths.root().join(".health_check");
        let data = b"health_check_data";

        fs::write(&probe, data)?;
        let read_back = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read_back != data {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "health check data mismatch",
            )));
        }

        Ok(())
    }

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let file = File::open(path.as_ref())?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(value)
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        let written = (|| -> StorageResult<()> {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            Ok(())
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Delete a file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List the file stems in `dir` having the given extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DocumentStore) {
        let dir = TempDir::new().unwrap();
        let mut storage = DocumentStore::new(StoragePaths::new(dir.path()));
        storage.initialize().expect("Failed to initialize test storage");
        (dir, storage)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    #[test]
    fn initialize_creates_directories() {
        let (_dir, storage) = test_storage();
        assert!(storage.paths().users_dir().is_dir());
        assert!(storage.paths().adverts_dir().is_dir());
    }

    #[test]
    fn operations_require_initialization() {
        let dir = TempDir::new().unwrap();
        let storage = DocumentStore::new(StoragePaths::new(dir.path()));

        let result = storage.read_json::<TestData>(storage.paths().user("x"));
        assert!(matches!(result, Err(StorageError::NotInitialized)));
        assert!(matches!(
            storage.health_check(),
            Err(StorageError::NotInitialized)
        ));
    }

    #[test]
    fn write_and_read_json() {
        let (_dir, storage) = test_storage();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = storage.paths().user("test-1");
        storage.write_json(&path, &data).unwrap();

        let read: TestData = storage.read_json(&path).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn overwrite_leaves_no_temporary_files() {
        let (_dir, storage) = test_storage();
        let path = storage.paths().advert("ad-1");

        for value in 0..3 {
            storage
                .write_json(&path, &TestData { id: "ad-1".into(), value })
                .unwrap();
        }

        let entries = fs::read_dir(storage.paths().adverts_dir()).unwrap().count();
        assert_eq!(entries, 1);
        let read: TestData = storage.read_json(&path).unwrap();
        assert_eq!(read.value, 2);
    }

    #[test]
    fn reading_missing_file_is_not_found() {
        let (_dir, storage) = test_storage();
        let result = storage.read_json::<TestData>(storage.paths().user("nobody"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn health_check_works() {
        let (_dir, storage) = test_storage();
        storage.health_check().expect("Health check should pass");
    }

    #[test]
    fn list_files_returns_sorted_ids() {
        let (_dir, storage) = test_storage();

        for i in [3, 1, 2] {
            storage
                .write_json(
                    storage.paths().user(&format!("u-{i}")),
                    &TestData {
                        id: format!("u-{i}"),
                        value: i,
                    },
                )
                .unwrap();
        }
        fs::write(storage.paths().users_dir().join("notes.txt"), b"ignored").unwrap();

        let ids = storage.list_files(storage.paths().users_dir(), "json").unwrap();
        assert_eq!(ids, vec!["u-1", "u-2", "u-3"]);
    }

    #[test]
    fn delete_file_removes_it() {
        let (_dir, storage) = test_storage();

        let path = storage.paths().user("to-delete");
        storage
            .write_json(&path, &TestData { id: "del".into(), value: 0 })
            .unwrap();

        assert!(storage.exists(&path));
        storage.delete(&path).unwrap();
        assert!(!storage.exists(&path));
    }
}
