//! Reducer logic for the todo store.
//!
//! The root reducer validates each action against the whole state, then hands
//! it to one reducer per state slice. A rejected action touches no slice.

use crate::error::TodoError;
use crate::types::{
    AppState, Notification, NotificationState, Todo, TodoAction, TodoState, VisibilityFilter, WorkflowPhase,
    WorkflowState,
};
use crate::workflow::WorkflowReducer;
use std::sync::Arc;
use std::time::Duration;
use todo_store_core::composition::{combine_reducers, scope_reducer, BoxedReducer, CombinedReducer};
use todo_store_core::{effect::Effect, environment::Clock, reducer::Reducer, SmallVec};

/// How long a notification stays up before the workflow hides it
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Environment dependencies for the todo reducers
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Delay before a workflow hides its notification
    pub notification_timeout: Duration,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with the default notification timeout
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    /// Override the notification timeout
    #[must_use]
    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("notification_timeout", &self.notification_timeout)
            .finish_non_exhaustive()
    }
}

/// Owns the normalized todo table
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoListReducer;

impl Reducer for TodoListReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        todos: &mut TodoState,
        action: TodoAction,
        _env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        match action {
            TodoAction::AddTodo { id, name } => {
                todos.insert(Todo::new(id, name));
            },
            TodoAction::ToggleTodo { id } => {
                if let Some(todo) = todos.entities.get_mut(&id) {
                    todo.completed = !todo.completed;
                }
            },
            TodoAction::AddTodoWithNotification { .. }
            | TodoAction::SetFilter { .. }
            | TodoAction::HideNotification { .. }
            | TodoAction::CancelNotification { .. } => {},
        }
        SmallVec::new()
    }
}

/// Owns the visibility filter
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterReducer;

impl Reducer for FilterReducer {
    type State = VisibilityFilter;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        current: &mut VisibilityFilter,
        action: TodoAction,
        _env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if let TodoAction::SetFilter { filter } = action {
            *current = filter;
        }
        SmallVec::new()
    }
}

/// Owns the notification map
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationReducer;

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        notifications: &mut NotificationState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        match action {
            TodoAction::AddTodo { id, name } => {
                notifications.insert(id, Notification::todo_created(&name, env.clock.now()));
            },
            TodoAction::HideNotification { id } => {
                notifications.remove(&id);
            },
            TodoAction::AddTodoWithNotification { .. }
            | TodoAction::ToggleTodo { .. }
            | TodoAction::SetFilter { .. }
            | TodoAction::CancelNotification { .. } => {},
        }
        SmallVec::new()
    }
}

fn todos_slice(state: &mut AppState) -> &mut TodoState {
    &mut state.todos
}

fn filter_slice(state: &mut AppState) -> &mut VisibilityFilter {
    &mut state.filter
}

fn notifications_slice(state: &mut AppState) -> &mut NotificationState {
    &mut state.notifications
}

fn workflows_slice(state: &mut AppState) -> &mut WorkflowState {
    &mut state.workflows
}

/// Checks an action against the whole state before any slice sees it
///
/// # Errors
///
/// Returns the [`TodoError`] the action is rejected with.
pub fn validate(state: &AppState, action: &TodoAction) -> Result<(), TodoError> {
    match action {
        TodoAction::AddTodo { id, .. } | TodoAction::AddTodoWithNotification { id, .. } => {
            if state.todos.contains(id) {
                return Err(TodoError::DuplicateId(id.clone()));
            }
        },
        TodoAction::ToggleTodo { id } => {
            if !state.todos.contains(id) {
                return Err(TodoError::NotFound(id.clone()));
            }
        },
        TodoAction::CancelNotification { id } => {
            if state.workflows.get(id) != Some(&WorkflowPhase::Pending) {
                return Err(TodoError::NoPendingWorkflow(id.clone()));
            }
        },
        TodoAction::SetFilter { .. } | TodoAction::HideNotification { .. } => {},
    }
    Ok(())
}

/// Root reducer for [`AppState`]
///
/// Clears `last_error`, validates the action, then runs the slice reducers.
/// An intent that puts a plain action (see [`TodoAction::put_action`]) has
/// that action run through the slices first, in the same dispatch.
#[derive(Clone)]
pub struct AppReducer {
    slices: Arc<CombinedReducer<AppState, TodoAction, TodoEnvironment>>,
}

impl AppReducer {
    /// Creates the root reducer
    #[must_use]
    pub fn new() -> Self {
        let slices: Vec<BoxedReducer<AppState, TodoAction, TodoEnvironment>> = vec![
            Box::new(scope_reducer(TodoListReducer, todos_slice)),
            Box::new(scope_reducer(FilterReducer, filter_slice)),
            Box::new(scope_reducer(NotificationReducer, notifications_slice)),
            Box::new(scope_reducer(WorkflowReducer, workflows_slice)),
        ];

        Self {
            slices: Arc::new(combine_reducers(slices)),
        }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppReducer")
            .field("slices", &self.slices.len())
            .finish()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut AppState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        state.last_error = None;

        if let Err(error) = validate(state, &action) {
            tracing::warn!(action = action.action_type(), error = %error, "Action rejected");
            state.last_error = Some(error);
            return SmallVec::new();
        }

        let mut effects = SmallVec::new();
        if let Some(put) = action.put_action() {
            tracing::debug!(
                action = put.action_type(),
                intent = action.action_type(),
                todo_id = ?put.todo_id(),
                "Applying action put by intent"
            );
            effects.extend(self.slices.reduce(state, put, env));
        }
        effects.extend(self.slices.reduce(state, action, env));
        effects
    }
}
