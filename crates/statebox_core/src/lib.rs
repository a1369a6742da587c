//! Core of statebox: observable, persisted in-memory collections.
//! A store owns one collection, writes it through to durable storage on every
//! mutation, and broadcasts the new snapshot to its subscribers.

pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod service;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cart::{Cart, ItemId};
pub use model::task::{Task, TaskId, TaskList};
pub use model::{Collection, ModelError};
pub use notify::{Notifier, SharedSnapshot, Snapshot, Subscription};
pub use service::cart_service::CartService;
pub use service::todo_service::TodoService;
pub use storage::{
    FileStorage, MemoryStorage, SnapshotStorage, SqliteStorage, StorageError, StorageResult,
};
pub use store::{
    CorruptSnapshotPolicy, LoadOutcome, Store, StoreConfig, StoreError, StoreResult,
    DEFAULT_CHANNEL_CAPACITY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
