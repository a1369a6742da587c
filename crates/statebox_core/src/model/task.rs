//! To-do task model.
//!
//! # Responsibility
//! - Define the task record and the ordered task list.
//! - Address tasks by stable id; positional access is a convenience only.
//!
//! # Invariants
//! - `text` is trimmed and non-empty.
//! - Task ids are unique within a list.
//! - Toggling completion never reorders the list.

use super::{Collection, ModelError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier of one task.
pub type TaskId = Uuid;

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned on creation. Entries persisted without an id get a fresh one
    /// on load, which the store writes back when it opens.
    #[serde(default = "Uuid::new_v4")]
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates an open task with a generated id.
    pub fn new(text: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyTaskText);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            text: trimmed.to_string(),
            completed: false,
        })
    }

    /// Flips completion and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

/// Tasks in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new open task and returns its id.
    pub fn push(&mut self, text: impl AsRef<str>) -> Result<TaskId, ModelError> {
        let task = Task::new(text)?;
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    /// Toggles the task with `id`, returning its new completion state.
    pub fn toggle(&mut self, id: TaskId) -> Option<bool> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .map(Task::toggle)
    }

    /// Toggles the task at list position `index`.
    pub fn toggle_at(&mut self, index: usize) -> Option<bool> {
        self.tasks.get_mut(index).map(Task::toggle)
    }

    /// Removes the task with `id`, returning it.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Drops completed tasks, keeping the order of the rest.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    /// Drops every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Looks up a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Number of tasks not yet completed.
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}

impl Collection for TaskList {
    const DEFAULT_KEY: &'static str = "todos";

    fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl TryFrom<Vec<Task>> for TaskList {
    type Error = ModelError;

    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if task.text.trim().is_empty() {
                return Err(ModelError::EmptyTaskText);
            }
            if !seen.insert(task.id) {
                return Err(ModelError::DuplicateTaskId(task.id));
            }
        }
        Ok(Self { tasks })
    }
}

impl From<TaskList> for Vec<Task> {
    fn from(list: TaskList) -> Self {
        list.tasks
    }
}
