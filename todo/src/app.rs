//! `TodoApp`: the dispatch/select surface a UI talks to.

use crate::error::{DispatchError, TodoError};
use crate::reducer::{AppReducer, TodoEnvironment};
use crate::types::{AppState, Todo, TodoAction, TodoId, TodoState, VisibilityFilter};
use crate::workflow::workflow_id;
use std::time::Duration;
use todo_store_core::composition::{log_actions, LoggedReducer};
use todo_store_runtime::{EffectHandle, Store, StoreConfig};
use tokio::sync::broadcast;

/// The store type behind [`TodoApp`]
pub type TodoStore = Store<AppState, TodoAction, TodoEnvironment, LoggedReducer<AppReducer>>;

/// Log target for every reduced action
const ACTION_LOG_TARGET: &str = "todo::actions";

/// Handle to a todo store
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct TodoApp {
    store: TodoStore,
}

impl TodoApp {
    /// Creates an empty store with default configuration
    #[must_use]
    pub fn new(environment: TodoEnvironment) -> Self {
        Self::with_config(AppState::default(), environment, StoreConfig::default())
    }

    /// Creates a store seeded with `todos`, in list order
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::DuplicateId`] if two todos share an id.
    pub fn with_todos(todos: impl IntoIterator<Item = Todo>, environment: TodoEnvironment) -> Result<Self, TodoError> {
        let todos = TodoState::normalize(todos)?;
        Ok(Self::with_config(AppState::with_todos(todos), environment, StoreConfig::default()))
    }

    /// Creates a store from explicit initial state and configuration
    #[must_use]
    pub fn with_config(initial_state: AppState, environment: TodoEnvironment, config: StoreConfig) -> Self {
        let reducer = log_actions(AppReducer::new(), ACTION_LOG_TARGET);
        Self {
            store: Store::with_config(initial_state, reducer, environment, config),
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Dispatch an action
    ///
    /// The outcome is read in the same critical section as the reduction, so
    /// a concurrent dispatch cannot mask this action's rejection.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Rejected`] if validation failed; state is unchanged
    /// - [`DispatchError::Store`] if the store is shutting down
    pub async fn dispatch(&self, action: TodoAction) -> Result<EffectHandle, DispatchError> {
        let action_type = action.action_type();
        tracing::debug!(action = action_type, "Dispatching");

        let (handle, rejection) = self
            .store
            .send_and_inspect(action, |state| state.last_error.clone())
            .await?;

        match rejection {
            Some(error) => Err(DispatchError::Rejected(error)),
            None => Ok(handle),
        }
    }

    /// Snapshot of the whole state
    pub async fn get_state(&self) -> AppState {
        self.store.state(Clone::clone).await
    }

    /// Run a selector against current state
    ///
    /// ```ignore
    /// let ids = app.select(selectors::visible_todo_ids).await;
    /// ```
    pub async fn select<F, T>(&self, selector: F) -> T
    where
        F: FnOnce(&AppState) -> T,
    {
        self.store.state(selector).await
    }

    /// Dispatch `AddTodo`
    ///
    /// # Errors
    ///
    /// See [`TodoApp::dispatch`].
    pub async fn add_todo(&self, id: impl Into<TodoId>, name: impl Into<String>) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::add(id, name)).await
    }

    /// Dispatch `AddTodoWithNotification`
    ///
    /// The todo and its notification exist once this returns. The returned
    /// handle completes when the notification has been hidden or the workflow
    /// cancelled.
    ///
    /// # Errors
    ///
    /// See [`TodoApp::dispatch`].
    pub async fn add_todo_with_notification(
        &self,
        id: impl Into<TodoId>,
        name: impl Into<String>,
    ) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::add_with_notification(id, name)).await
    }

    /// Dispatch `ToggleTodo`
    ///
    /// # Errors
    ///
    /// See [`TodoApp::dispatch`].
    pub async fn toggle_todo(&self, id: impl Into<TodoId>) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::toggle(id)).await
    }

    /// Dispatch `SetFilter`
    ///
    /// # Errors
    ///
    /// See [`TodoApp::dispatch`].
    pub async fn set_filter(&self, filter: VisibilityFilter) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::set_filter(filter)).await
    }

    /// Dispatch `SetFilter` from its token, e.g. `"SHOW_COMPLETED"`
    ///
    /// # Errors
    ///
    /// [`TodoError::InvalidFilter`] for an unknown token, otherwise see
    /// [`TodoApp::dispatch`].
    pub async fn set_filter_token(&self, token: &str) -> Result<EffectHandle, DispatchError> {
        let filter = token.parse::<VisibilityFilter>().inspect_err(|error| {
            tracing::warn!(error = %error, "Rejected filter token");
        })?;
        self.set_filter(filter).await
    }

    /// Dispatch `HideNotification`
    ///
    /// # Errors
    ///
    /// See [`TodoApp::dispatch`].
    pub async fn hide_notification(&self, id: impl Into<TodoId>) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::hide_notification(id)).await
    }

    /// Dispatch `CancelNotification`
    ///
    /// # Errors
    ///
    /// [`TodoError::NoPendingWorkflow`] if the workflow is not pending,
    /// otherwise see [`TodoApp::dispatch`].
    pub async fn cancel_notification(&self, id: impl Into<TodoId>) -> Result<EffectHandle, DispatchError> {
        self.dispatch(TodoAction::cancel_notification(id)).await
    }

    /// Returns true while the notification timer for `id` is running
    #[must_use]
    pub fn is_workflow_running(&self, id: &TodoId) -> bool {
        self.store.is_in_flight(&workflow_id(id))
    }

    /// Subscribe to actions produced by effects (e.g. the timed `HideNotification`)
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// Dispatch an action and wait for an effect-produced action matching `predicate`
    ///
    /// A rejected action produces nothing to wait for, so it ends in `Timeout`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Store`] with `Timeout` if nothing matched in time
    /// - [`DispatchError::Store`] if the store is shutting down
    pub async fn dispatch_and_wait_for<F>(
        &self,
        action: TodoAction,
        predicate: F,
        timeout: Duration,
    ) -> Result<TodoAction, DispatchError>
    where
        F: Fn(&TodoAction) -> bool,
    {
        Ok(self.store.send_and_wait_for(action, predicate, timeout).await?)
    }

    /// Stop accepting actions and wait for running workflows
    ///
    /// Pending notification timers still fire during the wait, so their
    /// workflows end `Completed`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Store`] with `ShutdownTimeout` if workflows were still
    /// running when `timeout` elapsed.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), DispatchError> {
        Ok(self.store.shutdown(timeout).await?)
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("config", self.store.config())
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
