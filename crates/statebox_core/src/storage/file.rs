//! JSON-file snapshot storage.
//!
//! # Invariants
//! - One `<key>.json` file per key inside the storage directory.
//! - Saves write a sibling temp file first and rename it into place, so a
//!   crash mid-write leaves the previous snapshot intact.

use super::{validate_key, SnapshotStorage, StorageError, StorageResult};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SNAPSHOT_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Directory-backed storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `dir`, creating the directory when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SNAPSHOT_EXTENSION}"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{TEMP_EXTENSION}"))
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|err| {
                StorageError::CorruptPayload {
                    key: key.to_string(),
                    reason: err.to_string(),
                }
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        validate_key(key)?;
        let temp_path = self.temp_path_for(key);
        let path = self.path_for(key);

        fs::write(&temp_path, payload).map_err(|source| StorageError::Io {
            path: temp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::Io { path, source });
        }

        debug!(
            "event=snapshot_save module=storage backend=file status=ok key={key} bytes={}",
            payload.len()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileStorage;
    use crate::storage::{SnapshotStorage, StorageError};

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.load("cart").unwrap(), None);
    }

    #[test]
    fn save_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.save("cart", r#"{"a":1}"#).unwrap();
        storage.save("cart", r#"{"a":2}"#).unwrap();

        assert_eq!(
            storage.load("cart").unwrap().as_deref(),
            Some(r#"{"a":2}"#)
        );
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["cart.json".to_string()]);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.save("todos", "[]").unwrap();

        storage.remove("todos").unwrap();
        storage.remove("todos").unwrap();
        assert!(!storage.path_for("todos").exists());
    }

    #[test]
    fn non_utf8_file_loads_as_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        std::fs::write(storage.path_for("cart"), b"{\"book-\xff\":2}").unwrap();

        let err = storage.load("cart").unwrap_err();
        assert!(matches!(err, StorageError::CorruptPayload { ref key, .. } if key == "cart"));
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        // A directory in the snapshot's place makes the rename fail.
        std::fs::create_dir(storage.path_for("cart")).unwrap();
        std::fs::write(storage.path_for("cart").join("keep"), b"x").unwrap();

        let err = storage.save("cart", "{}").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!dir.path().join("cart.json.tmp").exists());
    }

    #[test]
    fn rejects_keys_that_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let err = storage.save("../escape", "{}").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
