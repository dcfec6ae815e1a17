//! Command-line walkthrough of the todo store.
//!
//! Seeds the store, adds a todo with a notification, toggles a few todos and
//! prints the filtered views while the notification expires.

use std::sync::Arc;
use todo::{TodoApp, TodoEnvironment, TodoId, VisibilityFilter, selectors};
use todo_store_core::environment::SystemClock;
use tracing_subscriber::EnvFilter;

const SEED: [(&str, &str); 10] = [
    ("1", "Hands On: Redux Standalone with advanced Actions"),
    ("2", "Hands On: Redux Standalone with advanced Reducers"),
    ("3", "Hands On: Bootstrap App with Redux"),
    ("4", "Hands On: Naive Todo with React and Redux"),
    ("5", "Hands On: Sophisticated Todo with React and Redux"),
    ("6", "Hands On: Connecting State Everywhere"),
    ("7", "Hands On: Todo with advanced Redux"),
    ("8", "Hands On: Todo but more Features"),
    ("9", "Hands On: Todo with Notifications"),
    ("10", "Hands On: Hacker News with Redux"),
];

async fn print_visible(app: &TodoApp) {
    let state = app.get_state().await;
    println!("\n[{}]", state.filter);
    for todo in selectors::visible_todos(&state) {
        let status = if todo.completed { "✓" } else { " " };
        println!("  [{status}] {}", todo.name);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Todo Store ===");

    let seed = SEED.into_iter().map(|(id, name)| todo::Todo::new(id, name));
    let app = TodoApp::with_todos(seed, TodoEnvironment::new(Arc::new(SystemClock)))?;

    let id = TodoId::generate();
    let mut workflow = app.add_todo_with_notification(id.clone(), "Hands On: Notification Workflow").await?;
    println!("\nNotifications: {:?}", app.select(selectors::notification_list).await);

    app.toggle_todo("1").await?;
    app.toggle_todo("4").await?;
    app.toggle_todo(id).await?;
    print_visible(&app).await;

    app.set_filter(VisibilityFilter::ShowCompleted).await?;
    print_visible(&app).await;

    app.set_filter_token("SHOW_INCOMPLETED").await?;
    print_visible(&app).await;

    if let Err(error) = app.toggle_todo("does-not-exist").await {
        println!("\nRejected: {error}");
    }

    println!("\nWaiting for the notification to expire...");
    workflow.wait().await;
    println!("Notifications: {:?}", app.select(selectors::notification_list).await);
    println!(
        "Completed: {}/{}",
        app.select(selectors::completed_count).await,
        app.select(|state| state.todos.len()).await
    );

    app.shutdown(std::time::Duration::from_secs(1)).await?;
    Ok(())
}
