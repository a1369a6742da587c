//! Cart use-case service.
//!
//! # Responsibility
//! - Add, decrement and remove cart lines by item id.
//! - Give observers a subscription to cart snapshots.
//!
//! # Invariants
//! - Lines are addressed by item id, never by position.
//! - Unknown items on decrement/remove return `ItemNotFound` and do not
//!   persist or publish.

use crate::model::cart::{Cart, ItemId};
use crate::notify::{SharedSnapshot, Subscription};
use crate::storage::SnapshotStorage;
use crate::store::{LoadOutcome, Store, StoreConfig, StoreError, StoreResult};

/// Shopping cart backed by a persisted store.
pub struct CartService<S: SnapshotStorage> {
    store: Store<Cart, S>,
}

impl<S: SnapshotStorage> CartService<S> {
    /// Opens the cart stored under the default `cart` key.
    pub fn open(storage: S) -> StoreResult<Self> {
        Self::open_with_config(storage, StoreConfig::default())
    }

    /// Opens the cart with an explicit key, channel capacity and corrupt
    /// snapshot policy.
    pub fn open_with_config(storage: S, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: Store::open(storage, config)?,
        })
    }

    /// Adds one unit of `item_id` and returns the new quantity.
    pub fn add(&mut self, item_id: &str) -> StoreResult<u32> {
        let item = ItemId::parse(item_id)?;
        self.store
            .mutate("cart_add", |cart| cart.add(item).map_err(StoreError::from))
    }

    /// Removes one unit of `item_id` and returns the remaining quantity.
    ///
    /// The line is dropped when the quantity reaches zero.
    pub fn decrement(&mut self, item_id: &str) -> StoreResult<u32> {
        let item = ItemId::parse(item_id)?;
        self.store.mutate("cart_decrement", |cart| {
            cart.decrement(item.as_str())
                .ok_or_else(|| StoreError::ItemNotFound(item.to_string()))
        })
    }

    /// Drops the whole line for `item_id` and returns its former quantity.
    pub fn remove(&mut self, item_id: &str) -> StoreResult<u32> {
        let item = ItemId::parse(item_id)?;
        self.store.mutate("cart_remove", |cart| {
            cart.remove(item.as_str())
                .ok_or_else(|| StoreError::ItemNotFound(item.to_string()))
        })
    }

    /// Empties the cart. Persists and publishes even when already empty.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.mutate("cart_clear", |cart| {
            cart.clear();
            Ok(())
        })
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.store.items().quantity(item_id.trim())
    }

    pub fn total_quantity(&self) -> u64 {
        self.store.items().total_quantity()
    }

    /// Owned copy of the cart; later mutations do not affect it.
    pub fn get_all(&self) -> Cart {
        self.store.get_all()
    }

    pub fn snapshot(&self) -> SharedSnapshot<Cart> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<Cart> {
        self.store.subscribe()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        self.store.load_outcome()
    }

    pub fn store(&self) -> &Store<Cart, S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::CartService;
    use crate::model::{Collection, ModelError};
    use crate::storage::MemoryStorage;
    use crate::store::StoreError;

    #[test]
    fn add_twice_yields_quantity_two() {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        cart.add("book-1").unwrap();
        cart.add("book-1").unwrap();

        let all = cart.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all.quantity("book-1"), 2);
    }

    #[test]
    fn blank_item_is_rejected() {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        let err = cart.add("").unwrap_err();
        assert!(matches!(err, StoreError::Validation(ModelError::EmptyItemId)));
        assert_eq!(cart.store().version(), 0);
    }

    #[test]
    fn decrement_and_remove_unknown_items_fail() {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        assert!(matches!(
            cart.decrement("ghost").unwrap_err(),
            StoreError::ItemNotFound(item) if item == "ghost"
        ));
        assert!(matches!(
            cart.remove("ghost").unwrap_err(),
            StoreError::ItemNotFound(_)
        ));
        assert_eq!(cart.store().version(), 0);
    }

    #[test]
    fn decrement_to_zero_drops_line() {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        cart.add("pen").unwrap();
        assert_eq!(cart.decrement("pen").unwrap(), 0);
        assert!(cart.get_all().is_empty());
    }

    #[test]
    fn remove_returns_previous_quantity() {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        cart.add("a").unwrap();
        cart.add("a").unwrap();
        cart.add("b").unwrap();

        assert_eq!(cart.remove("a").unwrap(), 2);
        assert_eq!(cart.quantity("a"), 0);
        assert_eq!(cart.total_quantity(), 1);
    }
}
