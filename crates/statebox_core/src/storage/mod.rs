//! Durable-storage mirror for store snapshots.
//!
//! # Responsibility
//! - Persist one serialized collection per key, overwritten wholesale.
//! - Hide the backend (memory, JSON files, SQLite) from the store engine.
//!
//! # Invariants
//! - `load` returns `None` only when nothing was ever saved under the key.
//! - `save` replaces the previous payload in full; there are no partial writes.
//! - Keys are non-empty and limited to `[A-Za-z0-9_-]`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    InvalidKey(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Db(DbError),
    /// The backend holds bytes under `key` that are not a text payload.
    CorruptPayload { key: String, reason: String },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(
                f,
                "invalid storage key `{key}`; expected non-empty [A-Za-z0-9_-]"
            ),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::CorruptPayload { key, reason } => {
                write!(f, "stored payload `{key}` is unreadable: {reason}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) | Self::CorruptPayload { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value persistence for serialized snapshots.
///
/// `load` reports payloads it cannot decode as `StorageError::CorruptPayload`
/// so the store can apply its corrupt-snapshot policy to them.
pub trait SnapshotStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>>;
    fn save(&self, key: &str, payload: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: SnapshotStorage + ?Sized> SnapshotStorage for &T {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        (**self).save(key, payload)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Rejects keys that could escape a directory or collide after escaping.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
