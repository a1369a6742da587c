//! To-do use-case service.
//!
//! # Responsibility
//! - Add, toggle and remove tasks.
//! - Give observers a subscription to task list snapshots.
//!
//! # Invariants
//! - Toggling flips completion in place and keeps list order.
//! - Removal is by stable `TaskId`; positions are only used for `toggle_at`.

use crate::model::task::{TaskId, TaskList};
use crate::notify::{SharedSnapshot, Subscription};
use crate::storage::SnapshotStorage;
use crate::store::{LoadOutcome, Store, StoreConfig, StoreError, StoreResult};

/// Ordered to-do list backed by a persisted store.
pub struct TodoService<S: SnapshotStorage> {
    store: Store<TaskList, S>,
}

impl<S: SnapshotStorage> TodoService<S> {
    /// Opens the list stored under the default `todos` key.
    pub fn open(storage: S) -> StoreResult<Self> {
        Self::open_with_config(storage, StoreConfig::default())
    }

    /// Opens the list with an explicit key, channel capacity and corrupt
    /// snapshot policy.
    pub fn open_with_config(storage: S, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self {
            store: Store::open(storage, config)?,
        })
    }

    /// Appends an open task and returns its id.
    pub fn add(&mut self, text: &str) -> StoreResult<TaskId> {
        self.store
            .mutate("todo_add", |list| list.push(text).map_err(StoreError::from))
    }

    /// Flips completion of task `id` and returns the new state.
    pub fn toggle(&mut self, id: TaskId) -> StoreResult<bool> {
        self.store.mutate("todo_toggle", |list| {
            list.toggle(id).ok_or(StoreError::TaskNotFound(id))
        })
    }

    /// Flips completion of the task at list position `index`.
    pub fn toggle_at(&mut self, index: usize) -> StoreResult<bool> {
        self.store.mutate("todo_toggle", |list| {
            let len = list.as_slice().len();
            list.toggle_at(index)
                .ok_or(StoreError::IndexOutOfRange { index, len })
        })
    }

    /// Removes task `id`; `TaskNotFound` when it is not in the list.
    pub fn remove(&mut self, id: TaskId) -> StoreResult<()> {
        self.store.mutate("todo_remove", |list| {
            list.remove(id)
                .map(|_| ())
                .ok_or(StoreError::TaskNotFound(id))
        })
    }

    /// Drops completed tasks and returns how many were removed.
    pub fn clear_completed(&mut self) -> StoreResult<usize> {
        self.store
            .mutate("todo_clear_completed", |list| Ok(list.clear_completed()))
    }

    pub fn remaining(&self) -> usize {
        self.store.items().remaining()
    }

    /// Owned copy of the list; later mutations do not affect it.
    pub fn get_all(&self) -> TaskList {
        self.store.get_all()
    }

    pub fn snapshot(&self) -> SharedSnapshot<TaskList> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<TaskList> {
        self.store.subscribe()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        self.store.load_outcome()
    }

    pub fn store(&self) -> &Store<TaskList, S> {
        &self.store
    }
}
