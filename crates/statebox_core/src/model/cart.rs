//! Shopping cart model.
//!
//! # Responsibility
//! - Map item identifiers to quantities.
//! - Keep quantity arithmetic checked.
//!
//! # Invariants
//! - `ItemId` is trimmed and non-empty.
//! - A line with quantity zero is removed, never stored.
//! - Serialized form is a flat JSON object: `{"book-1": 2}`.

use super::{Collection, ModelError};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Identifier of one cart item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Parses a caller-provided identifier, trimming surrounding whitespace.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyItemId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

/// Cart contents keyed by item id, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<ItemId, u32>")]
pub struct Cart {
    lines: BTreeMap<ItemId, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item`, starting at 1 when absent.
    ///
    /// Returns the new quantity.
    pub fn add(&mut self, item: ItemId) -> Result<u32, ModelError> {
        let current = self.quantity(item.as_str());
        let next = current
            .checked_add(1)
            .ok_or_else(|| ModelError::QuantityOverflow {
                item: item.to_string(),
            })?;
        self.lines.insert(item, next);
        Ok(next)
    }

    /// Removes one unit of `item`.
    ///
    /// Returns `None` when the item is absent, otherwise the new quantity.
    /// A result of `Some(0)` means the line was dropped.
    pub fn decrement(&mut self, item: &str) -> Option<u32> {
        let quantity = self.lines.get_mut(item)?;
        *quantity -= 1;
        let remaining = *quantity;
        if remaining == 0 {
            self.lines.remove(item);
        }
        Some(remaining)
    }

    /// Drops the whole line for `item`, returning its quantity.
    pub fn remove(&mut self, item: &str) -> Option<u32> {
        self.lines.remove(item)
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity for `item`, zero when absent.
    pub fn quantity(&self, item: &str) -> u32 {
        self.lines.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.lines.contains_key(item)
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|quantity| u64::from(*quantity)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.lines.iter().map(|(item, quantity)| (item, *quantity))
    }
}

impl Collection for Cart {
    const DEFAULT_KEY: &'static str = "cart";

    fn len(&self) -> usize {
        self.lines.len()
    }
}

impl TryFrom<BTreeMap<ItemId, u32>> for Cart {
    type Error = ModelError;

    fn try_from(lines: BTreeMap<ItemId, u32>) -> Result<Self, Self::Error> {
        if let Some((item, _)) = lines.iter().find(|(_, quantity)| **quantity == 0) {
            return Err(ModelError::ZeroQuantity {
                item: item.to_string(),
            });
        }
        Ok(Self { lines })
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartVisitor)
    }
}

/// Reads a cart object entry by entry so repeated ids are caught instead of
/// overwriting each other, including ids that only match after trimming.
struct CartVisitor;

impl<'de> Visitor<'de> for CartVisitor {
    type Value = Cart;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a map of item ids to quantities")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cart, A::Error> {
        let mut lines = BTreeMap::new();
        while let Some((item, quantity)) = access.next_entry::<ItemId, u32>()? {
            if lines.contains_key(&item) {
                return Err(de::Error::custom(ModelError::DuplicateItemId(
                    item.to_string(),
                )));
            }
            lines.insert(item, quantity);
        }
        Cart::try_from(lines).map_err(de::Error::custom)
    }
}

impl From<Cart> for BTreeMap<ItemId, u32> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
