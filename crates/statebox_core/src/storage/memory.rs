//! In-process snapshot storage.

use super::{validate_key, SnapshotStorage, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Map-backed storage; clones share the same map.
///
/// A clone handed to a second store behaves like the same browser profile
/// reopened: it sees whatever the first store last wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw payload, bypassing any store. Used to seed fixtures.
    pub fn insert_raw(&self, key: &str, payload: impl Into<String>) {
        self.entries().insert(key.to_string(), payload.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries().insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::SnapshotStorage;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.save("cart", "{}").unwrap();
        assert_eq!(other.load("cart").unwrap().as_deref(), Some("{}"));

        other.remove("cart").unwrap();
        assert_eq!(storage.load("cart").unwrap(), None);
    }
}
