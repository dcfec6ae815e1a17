//! # Todo Store Testing
//!
//! Testing utilities and helpers for the todo store.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then builder for reducer tests
//! - Assertion helpers for effects
//! - Test log capture
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_testing::{init_tracing, test_clock};
//! use todo_store_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_add_todo() {
//!     init_tracing();
//!     let env = TodoEnvironment::new(Arc::new(test_clock()));
//!     let store = Store::new(AppState::default(), AppReducer::new(), env);
//!
//!     store.send(TodoAction::AddTodo { id: "1".into(), name: "milk".into() }).await?;
//!
//!     let state = store.state(|s| s.clone()).await;
//!     assert_eq!(state.todos.ids.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use todo_store_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::FixedClock;
    /// use todo_store_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Useful when a test needs distinct, ordered timestamps.
    ///
    /// ```
    /// use std::time::Duration;
    /// use todo_store_core::environment::Clock;
    /// use todo_store_testing::mocks::ManualClock;
    ///
    /// let clock = ManualClock::default();
    /// let before = clock.now();
    /// clock.advance(Duration::from_secs(1));
    /// assert!(clock.now() > before);
    /// ```
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time: Mutex::new(time) }
        }

        /// Move the clock forward
        ///
        /// Durations too large for chrono saturate to no movement.
        pub fn advance(&self, by: Duration) {
            let step = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += step;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(test_clock().now())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honours `RUST_LOG` and defaults to `debug`. Safe to call from every test;
/// only the first call installs anything.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
