//! Derived views over [`AppState`].

use crate::types::{AppState, Todo, TodoId, WorkflowPhase};

/// Ids of the todos passing the active filter, in insertion order
#[must_use]
pub fn visible_todo_ids(state: &AppState) -> Vec<TodoId> {
    visible_todos(state).into_iter().map(|todo| todo.id.clone()).collect()
}

/// Todos passing the active filter, in insertion order
#[must_use]
pub fn visible_todos(state: &AppState) -> Vec<&Todo> {
    state
        .todos
        .iter()
        .filter(|todo| state.filter.matches(todo))
        .collect()
}

/// Looks up a todo
#[must_use]
pub fn todo_by_id<'a>(state: &'a AppState, id: &TodoId) -> Option<&'a Todo> {
    state.todos.get(id)
}

/// Every live notification message, oldest first (ties by todo id)
#[must_use]
pub fn notification_list(state: &AppState) -> Vec<String> {
    let mut entries: Vec<_> = state.notifications.iter().collect();
    entries.sort_by(|(a_id, a), (b_id, b)| a.created_at.cmp(&b.created_at).then_with(|| a_id.cmp(b_id)));
    entries.into_iter().map(|(_, notification)| notification.message.clone()).collect()
}

/// Number of completed todos
#[must_use]
pub fn completed_count(state: &AppState) -> usize {
    state.todos.iter().filter(|todo| todo.completed).count()
}

/// Phase of a todo's notification workflow
#[must_use]
pub fn workflow_phase(state: &AppState, id: &TodoId) -> WorkflowPhase {
    state.workflows.get(id).copied().unwrap_or_default()
}
