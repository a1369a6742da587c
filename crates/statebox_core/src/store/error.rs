use crate::model::task::TaskId;
use crate::model::ModelError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store and service operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ModelError),
    Storage(StorageError),
    Serialize(serde_json::Error),
    CorruptSnapshot { key: String, reason: String },
    ItemNotFound(String),
    TaskNotFound(TaskId),
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize snapshot: {err}"),
            Self::CorruptSnapshot { key, reason } => {
                write!(f, "persisted snapshot `{key}` is corrupt: {reason}")
            }
            Self::ItemNotFound(item) => write!(f, "item not in cart: {item}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "task index {index} out of range for {len} tasks")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::CorruptSnapshot { .. }
            | Self::ItemNotFound(_)
            | Self::TaskNotFound(_)
            | Self::IndexOutOfRange { .. } => None,
        }
    }
}

impl From<ModelError> for StoreError {
    fn from(value: ModelError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
