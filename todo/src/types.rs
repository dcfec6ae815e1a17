//! Domain types for the todo store.
//!
//! State is normalized: todos live in an id-keyed table with a separate
//! ordered id list, and notifications are keyed by the todo they announce.

use crate::error::TodoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use todo_store_macros::Action;
use uuid::Uuid;

/// Unique identifier for a todo item
///
/// Ids are assigned by the caller. Any string is accepted; [`TodoId::generate`]
/// produces a random UUID v4 token.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a `TodoId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new random `TodoId`
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub name: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a new, incomplete todo
    #[must_use]
    pub fn new(id: impl Into<TodoId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed: false,
        }
    }
}

/// Normalized todo table
///
/// Every id in `ids` has an entry in `entities` and vice versa. `ids` holds no
/// duplicates and keeps insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Todos indexed by id
    pub entities: HashMap<TodoId, Todo>,
    /// Ids in insertion order
    pub ids: Vec<TodoId>,
}

impl TodoState {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a list of todos, keeping list order
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::DuplicateId`] if two todos share an id.
    pub fn normalize(todos: impl IntoIterator<Item = Todo>) -> Result<Self, TodoError> {
        let mut state = Self::new();
        for todo in todos {
            if state.contains(&todo.id) {
                return Err(TodoError::DuplicateId(todo.id));
            }
            state.insert(todo);
        }
        Ok(state)
    }

    /// Returns the number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns true if a todo with this id exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.entities.contains_key(id)
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.entities.get(id)
    }

    /// Iterates over todos in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Inserts a todo, appending its id. Existing ids are left untouched.
    pub(crate) fn insert(&mut self, todo: Todo) {
        if self.entities.contains_key(&todo.id) {
            return;
        }
        self.ids.push(todo.id.clone());
        self.entities.insert(todo.id.clone(), todo);
    }

    /// Checks the table invariant: `ids` and `entities` agree and `ids` is unique
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.ids.len());
        self.ids.len() == self.entities.len()
            && self.ids.iter().all(|id| self.entities.contains_key(id) && seen.insert(id))
    }
}

/// Which todos are visible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityFilter {
    /// Every todo
    #[default]
    ShowAll,
    /// Completed todos only
    ShowCompleted,
    /// Incomplete todos only
    ShowIncompleted,
}

impl VisibilityFilter {
    /// All filters, in display order
    pub const ALL: [Self; 3] = [Self::ShowAll, Self::ShowCompleted, Self::ShowIncompleted];

    /// The filter's token, e.g. `"SHOW_COMPLETED"`
    #[must_use]
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::ShowAll => "SHOW_ALL",
            Self::ShowCompleted => "SHOW_COMPLETED",
            Self::ShowIncompleted => "SHOW_INCOMPLETED",
        }
    }

    /// Returns true if `todo` passes this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::ShowAll => true,
            Self::ShowCompleted => todo.completed,
            Self::ShowIncompleted => !todo.completed,
        }
    }
}

impl std::fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for VisibilityFilter {
    type Err = TodoError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_token() == token)
            .ok_or_else(|| TodoError::InvalidFilter(token.to_string()))
    }
}

/// A transient message announcing a new todo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Display text
    pub message: String,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// The message shown when a todo is created
    #[must_use]
    pub fn todo_created(name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            message: format!("Todo Created: {name}"),
            created_at,
        }
    }
}

/// Notifications keyed by the todo they announce
pub type NotificationState = HashMap<TodoId, Notification>;

/// Where a todo's notification workflow stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowPhase {
    /// No workflow was started
    #[default]
    Idle,
    /// Todo added, waiting for the notification timeout
    Pending,
    /// Notification hidden, by the timer or explicitly
    Completed,
    /// Timer cancelled, notification kept
    Cancelled,
}

/// Workflow phases keyed by todo id. Absent means [`WorkflowPhase::Idle`].
pub type WorkflowState = HashMap<TodoId, WorkflowPhase>;

/// Root state of the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Normalized todo table
    pub todos: TodoState,
    /// Active visibility filter
    pub filter: VisibilityFilter,
    /// Live notifications
    pub notifications: NotificationState,
    /// Notification workflows
    pub workflows: WorkflowState,
    /// Why the most recent action was rejected, if it was
    pub last_error: Option<TodoError>,
}

impl AppState {
    /// Creates a state holding `todos` with everything else at its default
    #[must_use]
    pub fn with_todos(todos: TodoState) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }
}

/// Actions for the todo store
///
/// Tagged `SCREAMING_SNAKE_CASE` on the wire, e.g.
/// `{"type":"ADD_TODO","id":"1","name":"milk"}`.
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoAction {
    /// Add a todo and announce it
    AddTodo {
        /// Id of the new todo
        id: TodoId,
        /// Name of the new todo
        name: String,
    },

    /// Flip a todo's completed flag
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Replace the visibility filter
    SetFilter {
        /// The new filter
        filter: VisibilityFilter,
    },

    /// Remove a todo's notification
    HideNotification {
        /// Todo whose notification to hide
        id: TodoId,
    },

    /// Add a todo, then hide its notification after the notification timeout
    #[intent]
    AddTodoWithNotification {
        /// Id of the new todo
        id: TodoId,
        /// Name of the new todo
        name: String,
    },

    /// Stop a pending notification workflow, keeping the notification
    #[intent]
    CancelNotification {
        /// Todo whose workflow to cancel
        id: TodoId,
    },
}

impl TodoAction {
    /// `AddTodo` shorthand
    #[must_use]
    pub fn add(id: impl Into<TodoId>, name: impl Into<String>) -> Self {
        Self::AddTodo {
            id: id.into(),
            name: name.into(),
        }
    }

    /// `AddTodoWithNotification` shorthand
    #[must_use]
    pub fn add_with_notification(id: impl Into<TodoId>, name: impl Into<String>) -> Self {
        Self::AddTodoWithNotification {
            id: id.into(),
            name: name.into(),
        }
    }

    /// `ToggleTodo` shorthand
    #[must_use]
    pub fn toggle(id: impl Into<TodoId>) -> Self {
        Self::ToggleTodo { id: id.into() }
    }

    /// `SetFilter` shorthand
    #[must_use]
    pub const fn set_filter(filter: VisibilityFilter) -> Self {
        Self::SetFilter { filter }
    }

    /// `HideNotification` shorthand
    #[must_use]
    pub fn hide_notification(id: impl Into<TodoId>) -> Self {
        Self::HideNotification { id: id.into() }
    }

    /// `CancelNotification` shorthand
    #[must_use]
    pub fn cancel_notification(id: impl Into<TodoId>) -> Self {
        Self::CancelNotification { id: id.into() }
    }

    /// The plain action an intent applies before its own transition
    ///
    /// `AddTodoWithNotification` puts `AddTodo` with the same id and name.
    #[must_use]
    pub fn put_action(&self) -> Option<Self> {
        match self {
            Self::AddTodoWithNotification { id, name } => Some(Self::AddTodo {
                id: id.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// The todo this action targets, if any
    #[must_use]
    pub const fn todo_id(&self) -> Option<&TodoId> {
        match self {
            Self::AddTodo { id, .. }
            | Self::ToggleTodo { id }
            | Self::HideNotification { id }
            | Self::AddTodoWithNotification { id, .. }
            | Self::CancelNotification { id } => Some(id),
            Self::SetFilter { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_order() -> Result<(), TodoError> {
        let state = TodoState::normalize(vec![Todo::new("2", "b"), Todo::new("1", "a")])?;

        assert_eq!(state.ids, vec![TodoId::from("2"), TodoId::from("1")]);
        assert_eq!(state.get(&TodoId::from("1")).map(|t| t.name.as_str()), Some("a"));
        assert!(state.is_consistent());
        Ok(())
    }

    #[test]
    fn normalize_rejects_duplicates() {
        let result = TodoState::normalize(vec![Todo::new("1", "a"), Todo::new("1", "b")]);
        assert_eq!(result, Err(TodoError::DuplicateId(TodoId::from("1"))));
    }

    #[test]
    fn inconsistent_table_is_detected() {
        let mut state = TodoState::new();
        state.ids.push(TodoId::from("ghost"));
        assert!(!state.is_consistent());

        let mut state = TodoState::new();
        state.insert(Todo::new("1", "a"));
        state.ids.push(TodoId::from("1"));
        assert!(!state.is_consistent());
    }

    #[test]
    fn filter_tokens_parse() {
        for filter in VisibilityFilter::ALL {
            assert_eq!(filter.as_token().parse::<VisibilityFilter>(), Ok(filter));
        }
        assert_eq!(
            "SHOW_SOME".parse::<VisibilityFilter>(),
            Err(TodoError::InvalidFilter("SHOW_SOME".to_string()))
        );
    }

    #[test]
    fn filter_serializes_as_token() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&VisibilityFilter::ShowIncompleted)?, "\"SHOW_INCOMPLETED\"");
        Ok(())
    }

    #[test]
    fn action_tags() -> Result<(), serde_json::Error> {
        let action = TodoAction::add_with_notification("x", "buy milk");

        assert_eq!(action.action_type(), "ADD_TODO_WITH_NOTIFICATION");
        assert!(action.is_intent());
        assert!(!TodoAction::add("x", "buy milk").is_intent());

        let json = serde_json::to_value(&action)?;
        assert_eq!(json["type"], "ADD_TODO_WITH_NOTIFICATION");
        assert_eq!(json["id"], "x");
        Ok(())
    }

    #[test]
    fn intent_puts_plain_add() {
        let intent = TodoAction::add_with_notification("x", "buy milk");

        let put = intent.put_action();
        assert_eq!(put, Some(TodoAction::add("x", "buy milk")));
        assert_eq!(put.map(|action| action.action_type()), Some("ADD_TODO"));
        assert_eq!(TodoAction::cancel_notification("x").put_action(), None);
        assert_eq!(TodoAction::add("x", "buy milk").put_action(), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(TodoId::generate(), TodoId::generate());
    }
}
