//! Domain model for the tracked collections.
//!
//! # Responsibility
//! - Define the record shapes held by a store (cart lines, tasks).
//! - Enforce record-level invariants before anything reaches storage.
//!
//! # Invariants
//! - Quantities are never zero or negative inside a `Cart`.
//! - Task order is insertion order and is never changed by toggling.
//! - Persisted collections that violate an invariant fail to deserialize.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cart;
pub mod task;

/// Record-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    EmptyItemId,
    EmptyTaskText,
    QuantityOverflow { item: String },
    ZeroQuantity { item: String },
    DuplicateTaskId(uuid::Uuid),
    DuplicateItemId(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyItemId => write!(f, "item id cannot be empty"),
            Self::EmptyTaskText => write!(f, "task text cannot be empty"),
            Self::QuantityOverflow { item } => {
                write!(f, "quantity for item `{item}` would overflow")
            }
            Self::ZeroQuantity { item } => {
                write!(f, "item `{item}` has a zero quantity")
            }
            Self::DuplicateTaskId(id) => write!(f, "task id {id} appears more than once"),
            Self::DuplicateItemId(item) => write!(f, "item `{item}` appears more than once"),
        }
    }
}

impl Error for ModelError {}

/// A collection that can live inside a `Store`.
///
/// Implementors are plain values: the store clones them to build a working
/// copy for each mutation and shares finished snapshots behind `Arc`.
pub trait Collection:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Storage key used when the store config does not name one.
    const DEFAULT_KEY: &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
