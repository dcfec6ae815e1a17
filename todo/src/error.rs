//! Error types for the todo store.

use crate::types::TodoId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_store_runtime::StoreError;

/// Why an action was rejected
///
/// Rejections are local to one dispatch: state is left untouched and the
/// error is recorded in `AppState::last_error`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoError {
    /// No todo with this id
    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// Unknown visibility filter token
    #[error("invalid visibility filter: {0}")]
    InvalidFilter(String),

    /// A todo with this id already exists
    #[error("todo {0} already exists")]
    DuplicateId(TodoId),

    /// Cancel requested for a todo without a pending notification workflow
    #[error("no pending notification workflow for todo {0}")]
    NoPendingWorkflow(TodoId),
}

/// Errors returned by [`TodoApp::dispatch`](crate::TodoApp::dispatch)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The reducer rejected the action
    #[error("action rejected: {0}")]
    Rejected(#[from] TodoError),

    /// The store could not accept the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// The domain error, if the action was rejected by the reducer
    #[must_use]
    pub const fn rejection(&self) -> Option<&TodoError> {
        match self {
            Self::Rejected(error) => Some(error),
            Self::Store(_) => None,
        }
    }
}
