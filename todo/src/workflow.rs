//! The notification workflow.
//!
//! `AddTodoWithNotification` moves a todo's workflow from `Idle` to `Pending`
//! and schedules a cancellable `HideNotification` after the notification
//! timeout. The hide (timed or explicit) completes it; `CancelNotification`
//! stops the timer and keeps the notification.

use crate::reducer::TodoEnvironment;
use crate::types::{TodoAction, TodoId, WorkflowPhase, WorkflowState};
use todo_store_core::effect::{Effect, EffectId};
use todo_store_core::reducer::Reducer;
use todo_store_core::{smallvec, SmallVec};

/// Prefix of every notification workflow's effect id
pub const WORKFLOW_ID_PREFIX: &str = "notification-workflow";

/// The effect id the workflow for `id` runs under
#[must_use]
pub fn workflow_id(id: &TodoId) -> EffectId {
    EffectId::new(format!("{WORKFLOW_ID_PREFIX}:{id}"))
}

/// Drives [`WorkflowPhase`] transitions and schedules the notification timer
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkflowReducer;

impl Reducer for WorkflowReducer {
    type State = WorkflowState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        workflows: &mut WorkflowState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        match action {
            TodoAction::AddTodoWithNotification { id, .. } => {
                workflows.insert(id.clone(), WorkflowPhase::Pending);
                tracing::debug!(todo_id = %id, timeout = ?env.notification_timeout, "Notification workflow started");

                let effect_id = workflow_id(&id);
                smallvec![
                    Effect::delay(env.notification_timeout, TodoAction::HideNotification { id }).cancellable(effect_id)
                ]
            },
            TodoAction::HideNotification { id } => {
                match workflows.get_mut(&id) {
                    Some(phase) if *phase == WorkflowPhase::Pending => {
                        *phase = WorkflowPhase::Completed;
                        tracing::debug!(todo_id = %id, "Notification workflow completed");
                        // Ends the timer's own registration when the timer delivered the hide
                        smallvec![Effect::Cancel(workflow_id(&id))]
                    },
                    _ => SmallVec::new(),
                }
            },
            TodoAction::CancelNotification { id } => match workflows.get_mut(&id) {
                Some(phase) if *phase == WorkflowPhase::Pending => {
                    *phase = WorkflowPhase::Cancelled;
                    tracing::debug!(todo_id = %id, "Notification workflow cancelled");
                    smallvec![Effect::Cancel(workflow_id(&id))]
                },
                _ => SmallVec::new(),
            },
            TodoAction::AddTodo { .. } | TodoAction::ToggleTodo { .. } | TodoAction::SetFilter { .. } => {
                SmallVec::new()
            },
        }
    }
}
