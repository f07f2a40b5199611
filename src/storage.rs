//! JSON database module
//!
//! This module provides single-file persistence for the resolver's stores.
//! The whole document is serialized to JSON on every write and replaced
//! atomically through a staging file.

use crate::temp::create_staging_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing a JSON database
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to create or access the database directory
    #[error("Failed to create database directory at {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read the database file
    #[error("Failed to read database file {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write the database file
    #[error("Failed to write database file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to remove the database file
    #[error("Failed to delete database file {path}: {source}")]
    DeleteFailed { path: PathBuf, source: io::Error },

    /// Failed to deserialize the database file
    #[error("Failed to deserialize database file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize the database contents
    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A JSON document stored in a single file
pub(crate) struct JsonDatabase<T> {
    /// Location of the JSON file
    path: PathBuf,
    /// Phantom data for the document type
    _phantom: PhantomData<T>,
}

impl<T> JsonDatabase<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    /// Opens the database at `path`, creating its parent directory
    ///
    /// The file itself is only created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        Ok(Self {
            path,
            _phantom: PhantomData,
        })
    }

    /// Loads the stored document
    ///
    /// A missing file yields `T::default()`. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(&self) -> Result<T, StorageError> {
        if !self.path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StorageError::ReadFailed {
            path: self.path.clone(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::DeserializationFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replaces the stored document with `data`
    pub fn save(&self, data: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(data)?;

        let write_failed = |e: io::Error| StorageError::WriteFailed {
            path: self.path.clone(),
            source: e,
        };

        let (staging, mut file) = create_staging_file(&self.path).map_err(write_failed)?;
        file.write_all(content.as_bytes()).map_err(write_failed)?;
        file.sync_all().map_err(write_failed)?;
        drop(file);
        staging.persist(&self.path).map_err(write_failed)?;

        Ok(())
    }

    /// Removes the database file; a missing file is not an error
    pub fn delete(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Returns the path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let db: JsonDatabase<Vec<u32>> = JsonDatabase::open(dir.path().join("db.json")).unwrap();
        assert_eq!(db.load().unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let db: JsonDatabase<Vec<u32>> = JsonDatabase::open(dir.path().join("db.json")).unwrap();
        db.save(&vec![1, 2, 3]).unwrap();
        assert_eq!(db.load().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("db.json");
        let db: JsonDatabase<Vec<u32>> = JsonDatabase::open(&nested).unwrap();
        db.save(&vec![7]).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{not json").unwrap();
        let db: JsonDatabase<Vec<u32>> = JsonDatabase::open(&path).unwrap();
        assert!(matches!(
            db.load(),
            Err(StorageError::DeserializationFailed { .. })
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db: JsonDatabase<Vec<u32>> = JsonDatabase::open(dir.path().join("db.json")).unwrap();
        db.save(&vec![1]).unwrap();
        db.delete().unwrap();
        assert!(!db.path().exists());
        db.delete().unwrap();
    }
}
