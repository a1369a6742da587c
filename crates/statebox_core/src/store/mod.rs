//! Store engine: authoritative collection plus write-through and broadcast.
//!
//! # Responsibility
//! - Own the current collection for one storage key.
//! - Run every mutation as copy, persist, swap, publish.
//!
//! # Invariants
//! - Durable storage is read once, in `Store::open`.
//! - A failed mutation changes nothing: no swap, no write, no publish.
//! - Each successful mutation bumps the snapshot version by exactly one.

mod config;
mod engine;
mod error;

pub use config::{CorruptSnapshotPolicy, StoreConfig, DEFAULT_CHANNEL_CAPACITY};
pub use engine::{LoadOutcome, Store};
pub use error::{StoreError, StoreResult};
