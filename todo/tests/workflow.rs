//! Notification workflow behaviour under the real runtime with a paused clock.

use std::sync::Arc;
use std::time::Duration;
use todo::{
    selectors, DispatchError, TodoAction, TodoApp, TodoEnvironment, TodoError, TodoId, WorkflowPhase,
};
use todo_store_runtime::StoreError;
use todo_store_testing::{init_tracing, test_clock, ManualClock};
use tokio::sync::broadcast::error::TryRecvError;

fn app() -> TodoApp {
    init_tracing();
    TodoApp::new(TodoEnvironment::new(Arc::new(test_clock())))
}

#[tokio::test(start_paused = true)]
async fn cancelled_workflow_keeps_notification() -> Result<(), DispatchError> {
    let app = app();
    let id = TodoId::from("x");

    let mut workflow = app.add_todo_with_notification(id.clone(), "buy milk").await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    app.cancel_notification(id.clone()).await?;
    workflow.wait().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let state = app.get_state().await;
    assert_eq!(selectors::notification_list(&state), vec!["Todo Created: buy milk"]);
    assert_eq!(selectors::workflow_phase(&state, &id), WorkflowPhase::Cancelled);
    assert!(!app.is_workflow_running(&id));

    // Dismissing by hand still works
    app.hide_notification(id).await?;
    assert!(app.select(selectors::notification_list).await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancel_twice_is_rejected() -> Result<(), DispatchError> {
    let app = app();

    let _ = app.add_todo_with_notification("x", "buy milk").await?;
    app.cancel_notification("x").await?;

    let result = app.cancel_notification("x").await;
    assert_eq!(result.err(), Some(DispatchError::Rejected(TodoError::NoPendingWorkflow(TodoId::from("x")))));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn explicit_dismissal_stops_the_timer() -> Result<(), DispatchError> {
    let app = app();
    let mut observed = app.subscribe();
    let id = TodoId::from("x");

    let mut workflow = app.add_todo_with_notification(id.clone(), "buy milk").await?;
    app.hide_notification(id.clone()).await?;

    assert!(app.select(selectors::notification_list).await.is_empty());
    assert!(!app.is_workflow_running(&id));

    workflow.wait().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    // The timer never fired its own HideNotification
    assert!(matches!(observed.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(app.select(|s| selectors::workflow_phase(s, &id)).await, WorkflowPhase::Completed);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn timed_hide_is_broadcast_after_it_is_reduced() -> Result<(), DispatchError> {
    let app = app();

    let hidden = app
        .dispatch_and_wait_for(
            TodoAction::add_with_notification("x", "buy milk"),
            |action| matches!(action, TodoAction::HideNotification { .. }),
            Duration::from_secs(10),
        )
        .await?;

    assert_eq!(hidden, TodoAction::hide_notification("x"));
    assert!(app.select(selectors::notification_list).await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn waiting_on_a_rejected_action_times_out() -> Result<(), DispatchError> {
    let app = app();
    app.add_todo("x", "buy milk").await?;

    let result = app
        .dispatch_and_wait_for(
            TodoAction::add_with_notification("x", "again"),
            |action| matches!(action, TodoAction::HideNotification { .. }),
            Duration::from_secs(10),
        )
        .await;

    assert_eq!(result, Err(DispatchError::Store(StoreError::Timeout)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn workflows_run_independently() -> Result<(), DispatchError> {
    init_tracing();
    let clock = Arc::new(ManualClock::default());
    let app = TodoApp::new(TodoEnvironment::new(clock.clone()));

    let _ = app.add_todo_with_notification("a", "first").await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    clock.advance(Duration::from_secs(2));
    let _ = app.add_todo_with_notification("b", "second").await?;

    assert_eq!(
        app.select(selectors::notification_list).await,
        vec!["Todo Created: first", "Todo Created: second"]
    );

    // t = 5.5s: only "a" has expired
    tokio::time::sleep(Duration::from_millis(3500)).await;
    let state = app.get_state().await;
    assert_eq!(selectors::notification_list(&state), vec!["Todo Created: second"]);
    assert_eq!(selectors::workflow_phase(&state, &TodoId::from("a")), WorkflowPhase::Completed);
    assert_eq!(selectors::workflow_phase(&state, &TodoId::from("b")), WorkflowPhase::Pending);

    // t = 7.5s: both have expired
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(app.select(selectors::notification_list).await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn custom_notification_timeout() -> Result<(), DispatchError> {
    init_tracing();
    let env = TodoEnvironment::new(Arc::new(test_clock())).with_notification_timeout(Duration::from_millis(100));
    let app = TodoApp::new(env);

    let _ = app.add_todo_with_notification("x", "quick").await?;
    tokio::time::sleep(Duration::from_millis(101)).await;

    assert!(app.select(selectors::notification_list).await.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_keep_the_table_consistent() -> Result<(), DispatchError> {
    init_tracing();
    let env = TodoEnvironment::new(Arc::new(test_clock())).with_notification_timeout(Duration::from_millis(20));
    let app = TodoApp::new(env);

    let tasks: Vec<_> = (0..20)
        .map(|n| {
            let app = app.clone();
            tokio::spawn(async move { app.add_todo_with_notification(n.to_string(), format!("todo {n}")).await })
        })
        .collect();

    let mut workflows = Vec::new();
    #[allow(clippy::panic)]
    for task in tasks {
        match task.await {
            Ok(result) => workflows.push(result?),
            Err(e) => panic!("dispatch task panicked: {e}"),
        }
    }
    for workflow in &mut workflows {
        workflow.wait().await;
    }

    let state = app.get_state().await;
    assert_eq!(state.todos.len(), 20);
    assert!(state.todos.is_consistent());
    assert!(state.notifications.is_empty());
    assert!(state.workflows.values().all(|phase| *phase == WorkflowPhase::Completed));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_rejects_new_dispatches() -> Result<(), DispatchError> {
    let app = app();

    app.shutdown(Duration::from_secs(1)).await?;

    let result = app.add_todo("x", "too late").await;
    assert_eq!(result.err(), Some(DispatchError::Store(StoreError::ShutdownInProgress)));
    assert!(app.get_state().await.todos.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_times_out_on_pending_workflow() -> Result<(), DispatchError> {
    let app = app();

    let _ = app.add_todo_with_notification("x", "buy milk").await?;
    let result = app.shutdown(Duration::from_secs(1)).await;

    assert_eq!(result, Err(DispatchError::Store(StoreError::ShutdownTimeout(1))));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_completes_pending_workflows() -> Result<(), DispatchError> {
    let app = app();
    let id = TodoId::from("x");

    let _ = app.add_todo_with_notification(id.clone(), "buy milk").await?;
    app.shutdown(Duration::from_secs(30)).await?;

    let state = app.get_state().await;
    assert_eq!(selectors::workflow_phase(&state, &id), WorkflowPhase::Completed);
    assert!(selectors::notification_list(&state).is_empty());
    assert!(!app.is_workflow_running(&id));

    let result = app.add_todo("y", "too late").await;
    assert_eq!(result.err(), Some(DispatchError::Store(StoreError::ShutdownInProgress)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn only_explicit_cancels_count_as_cancelled() -> Result<(), DispatchError> {
    let app = app();

    let mut expiring = app.add_todo_with_notification("a", "first").await?;
    expiring.wait().await;
    assert_eq!(app.select(|s| selectors::workflow_phase(s, &TodoId::from("a"))).await, WorkflowPhase::Completed);
    assert_eq!(app.store().cancelled_effects(), 0);

    let _ = app.add_todo_with_notification("b", "second").await?;
    app.cancel_notification("b").await?;
    assert_eq!(app.store().cancelled_effects(), 1);
    Ok(())
}
