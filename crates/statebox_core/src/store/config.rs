//! Store configuration.

use crate::model::Collection;

/// Undelivered snapshots retained per subscriber before it starts skipping.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// What `Store::open` does when the persisted payload cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptSnapshotPolicy {
    /// Start empty and report `LoadOutcome::Recovered`.
    #[default]
    Reset,
    /// Fail with `StoreError::CorruptSnapshot`.
    Reject,
}

/// Options for opening a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage key; `None` uses the collection's default key.
    pub storage_key: Option<String>,
    pub channel_capacity: usize,
    pub corrupt_policy: CorruptSnapshotPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            corrupt_policy: CorruptSnapshotPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptSnapshotPolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    /// Key the store for `C` will read and write.
    pub fn resolve_key<C: Collection>(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(C::DEFAULT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::{CorruptSnapshotPolicy, StoreConfig, DEFAULT_CHANNEL_CAPACITY};
    use crate::model::cart::Cart;
    use crate::model::task::TaskList;

    #[test]
    fn default_config_uses_collection_keys() {
        let config = StoreConfig::default();
        assert_eq!(config.resolve_key::<Cart>(), "cart");
        assert_eq!(config.resolve_key::<TaskList>(), "todos");
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.corrupt_policy, CorruptSnapshotPolicy::Reset);
    }

    #[test]
    fn explicit_key_overrides_default() {
        let config = StoreConfig::default().with_storage_key("wishlist");
        assert_eq!(config.resolve_key::<Cart>(), "wishlist");
    }
}
