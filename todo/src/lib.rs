//! A normalized todo store with selectors and a delayed notification workflow.
//!
//! - **Entity table**: todos keyed by id plus an ordered id list
//! - **Reducers**: one per state slice, behind a validating root reducer
//! - **Selectors**: filtered id lists and notification messages
//! - **Notification workflow**: `AddTodoWithNotification` adds the todo, then
//!   hides its notification after a cancellable delay (5000 ms by default)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo::{selectors, TodoApp, TodoEnvironment, TodoId};
//! use todo_store_core::environment::SystemClock;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = TodoApp::new(TodoEnvironment::new(Arc::new(SystemClock)));
//!
//! let id = TodoId::generate();
//! let mut workflow = app.add_todo_with_notification(id.clone(), "Buy milk").await?;
//! println!("{:?}", app.select(selectors::notification_list).await);
//!
//! app.toggle_todo(id).await?;
//!
//! // Notification hidden after the timeout
//! workflow.wait().await;
//! assert!(app.select(selectors::notification_list).await.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod reducer;
pub mod selectors;
pub mod types;
pub mod workflow;

pub use app::{TodoApp, TodoStore};
pub use error::{DispatchError, TodoError};
pub use reducer::{AppReducer, DEFAULT_NOTIFICATION_TIMEOUT, TodoEnvironment};
pub use types::{
    AppState, Notification, NotificationState, Todo, TodoAction, TodoId, TodoState, VisibilityFilter, WorkflowPhase,
    WorkflowState,
};
pub use workflow::workflow_id;
