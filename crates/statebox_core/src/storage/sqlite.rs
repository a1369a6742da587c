//! SQLite-backed snapshot storage.
//!
//! # Invariants
//! - Connections must come from `db::open_db*` so the `snapshots` table exists.
//! - `save` is a single upsert statement; a key holds at most one row.

use super::{validate_key, SnapshotStorage, StorageResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Snapshot storage over a borrowed SQLite connection.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    /// Wraps `conn` after checking its schema is fully migrated.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let db_version = current_user_version(conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(DbError::SchemaNotReady {
                db_version,
                expected,
            }
            .into());
        }
        Ok(Self { conn })
    }

    /// Keys that currently hold a snapshot, in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM snapshots ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl SnapshotStorage for SqliteStorage<'_> {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![key, payload],
        )?;
        debug!(
            "event=snapshot_save module=storage backend=sqlite status=ok key={key} bytes={}",
            payload.len()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1;", [key])?;
        Ok(())
    }
}
