//! # Todo Store Runtime
//!
//! Runtime implementation for the todo store.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The single owner of state. Every action is reduced under one
//!   write lock, so reducer applications never interleave.
//! - **Effect Executor**: Runs effect descriptions on tokio tasks and feeds the
//!   actions they produce back through the same dispatch path.
//! - **Cancellation Registry**: Tracks in-flight [`Effect::Cancellable`] work by
//!   [`EffectId`] so that [`Effect::Cancel`] can abort it.
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use todo_store_core::effect::{Effect, EffectId};
use todo_store_core::reducer::Reducer;
use tokio::sync::{watch, RwLock};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;
pub use store::Store;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use todo_store_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_shutdown_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of effect-produced actions buffered for each observer
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// that action. Actions fed back by those effects are reduced before the
/// handle completes, but effects *they* start are not tracked.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle together with the tracking context used by the runtime
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs even if the effect panics or its task is aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

tokio::task_local! {
    /// Registration of the cancellable task being polled
    static CURRENT_REGISTRATION: (EffectId, u64);
}

/// Internal: what a cancel found under an id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cancellation {
    NotInFlight,
    /// Another task was aborted
    Aborted,
    /// The registered task cancelled itself through an action it delivered
    Finished,
}

/// Internal: in-flight cancellable effects by id
///
/// Each registration gets a generation so that a finished task only removes
/// its own entry, never a newer registration under the same id.
#[derive(Default)]
struct CancellationRegistry {
    next_generation: AtomicU64,
    aborted: AtomicU64,
    in_flight: Mutex<HashMap<EffectId, (u64, AbortHandle)>>,
}

impl CancellationRegistry {
    fn entries(&self) -> MutexGuard<'_, HashMap<EffectId, (u64, AbortHandle)>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a running task. A task already registered under `id` is aborted.
    fn register(&self, id: EffectId, generation: u64, handle: AbortHandle) {
        let previous = self.entries().insert(id.clone(), (generation, handle));

        if let Some((_, previous)) = previous {
            tracing::debug!(effect_id = %id, "Replacing in-flight effect with the same id");
            previous.abort();
        }
    }

    fn release(&self, id: &EffectId, generation: u64) {
        let mut entries = self.entries();
        if entries.get(id).is_some_and(|(current, _)| *current == generation) {
            entries.remove(id);
        }
    }

    fn cancel(&self, id: &EffectId) -> Cancellation {
        let removed = self.entries().remove(id);
        let Some((generation, handle)) = removed else {
            return Cancellation::NotInFlight;
        };

        // From inside the task the abort lands at its next await point, after
        // the delivery in progress has been reduced and published
        handle.abort();

        let own = CURRENT_REGISTRATION
            .try_with(|(current, current_generation)| current == id && *current_generation == generation)
            .unwrap_or(false);
        if own {
            Cancellation::Finished
        } else {
            self.aborted.fetch_add(1, Ordering::Relaxed);
            Cancellation::Aborted
        }
    }

    fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    fn contains(&self, id: &EffectId) -> bool {
        self.entries().contains_key(id)
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, Cancellation, CancellationRegistry, DecrementGuard,
        Duration, Effect, EffectHandle, EffectId, EffectTracking, Ordering, Reducer, RwLock, StoreConfig,
        StoreError, CURRENT_REGISTRATION,
    };
    use futures::future::BoxFuture;
    use tokio::sync::broadcast;
    use tokio::task::JoinHandle;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store yields another handle to the same state.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Arc<CancellationRegistry>,
        /// Actions produced by effects, published after they have been reduced
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(CancellationRegistry::default()),
                action_broadcast,
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Number of effect tasks still running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Returns true once [`Store::shutdown`] has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to complete (with timeout)
        ///
        /// Effects that were already running are drained, not dropped: the
        /// actions they feed back are still reduced and published. Only new
        /// [`Store::send`] calls are rejected.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(100);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout: {} effects still running", pending);
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Schedules returned effects before the lock is released
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// Scheduling under the lock means an [`Effect::Cancel`] returned for a
        /// later action always finds the work an earlier action registered.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            self.send_internal(action, |_| ()).await.map(|(handle, ())| handle)
        }

        /// Send an action and read state in the same critical section
        ///
        /// `inspect` runs right after the reducer, before any other action can
        /// be reduced. Use it to read the outcome of this particular action.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action, inspect), name = "store_send_and_inspect")]
        pub async fn send_and_inspect<F, T>(&self, action: A, inspect: F) -> Result<(EffectHandle, T), StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            self.send_internal(action, inspect).await
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// Subscribes before sending, so a fast effect cannot slip past.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(&self, action: A, predicate: F, timeout: Duration) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged, {} actions skipped", skipped);
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Actions sent directly via `send` are not broadcast. Each action is
        /// published after it has been reduced.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Abort the in-flight cancellable effect registered under `id`
        ///
        /// Returns false if nothing was in flight under that id.
        ///
        /// A cancellable effect whose own delivered action cancels it is not
        /// counted as aborted; it stops after that delivery.
        pub fn cancel(&self, id: &EffectId) -> bool {
            match self.cancellations.cancel(id) {
                Cancellation::Aborted => {
                    tracing::debug!(effect_id = %id, "Cancelled in-flight effect");
                    metrics::counter!("store.effects.cancelled").increment(1);
                    true
                },
                Cancellation::Finished => {
                    tracing::trace!(effect_id = %id, "Cancellable effect finished by its own action");
                    true
                },
                Cancellation::NotInFlight => {
                    tracing::trace!(effect_id = %id, "Nothing in flight to cancel");
                    false
                },
            }
        }

        /// Number of in-flight effects aborted by cancellation so far
        #[must_use]
        pub fn cancelled_effects(&self) -> u64 {
            self.cancellations.aborted()
        }

        /// Returns true if a cancellable effect is in flight under `id`
        #[must_use]
        pub fn is_in_flight(&self, id: &EffectId) -> bool {
            self.cancellations.contains(id)
        }

        /// Number of cancellable effects currently in flight
        #[must_use]
        pub fn in_flight_count(&self) -> usize {
            self.cancellations.len()
        }

        async fn send_internal<F, T>(&self, action: A, inspect: F) -> Result<(EffectHandle, T), StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.reduce_action(action, inspect).await)
        }

        /// Reduce one action and schedule its effects, without the shutdown check
        async fn reduce_action<F, T>(&self, action: A, inspect: F) -> (EffectHandle, T)
        where
            F: FnOnce(&S) -> T,
        {
            tracing::debug!("Processing action");
            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let inspected = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds").record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                let inspected = inspect(&*state);

                for effect in effects {
                    self.execute_effect(effect, &tracking);
                }

                inspected
            };

            drop(state);
            tracing::debug!("Action processing completed, returning handle");

            (handle, inspected)
        }

        /// Schedule a top-level effect returned by the reducer
        ///
        /// `Cancel` is applied immediately. `Cancellable` is registered before
        /// this returns. Everything else runs on a spawned task tracked by the
        /// action's [`EffectHandle`] and by the store-wide shutdown counter.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Cancel(id) => {
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(&id);
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                    let (task, generation) = self.spawn_cancellable(id.clone(), *effect);
                    let store = self.clone();
                    self.spawn_tracked(tracking, async move {
                        store.join_cancellable(id, generation, task).await;
                    });
                },
                effect => {
                    let store = self.clone();
                    self.spawn_tracked(tracking, store.run(effect));
                },
            }
        }

        fn spawn_tracked<F>(&self, tracking: &EffectTracking, work: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tracking.increment();
            let guard = DecrementGuard(tracking.clone());

            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            tokio::spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;
                work.await;
            });
        }

        fn spawn_cancellable(&self, id: EffectId, effect: Effect<A>) -> (JoinHandle<()>, u64) {
            let generation = self.cancellations.next_generation();
            let work = CURRENT_REGISTRATION.scope((id.clone(), generation), self.clone().run(effect));
            let task = tokio::spawn(work);
            self.cancellations.register(id, generation, task.abort_handle());
            (task, generation)
        }

        async fn join_cancellable(&self, id: EffectId, generation: u64, task: JoinHandle<()>) {
            match task.await {
                Ok(()) => tracing::trace!(effect_id = %id, "Cancellable effect completed"),
                Err(error) if error.is_cancelled() => {
                    tracing::debug!(effect_id = %id, "Cancellable effect aborted");
                },
                Err(error) => {
                    tracing::error!(effect_id = %id, error = %error, "Cancellable effect failed");
                },
            }
            self.cancellations.release(&id, generation);
        }

        /// Run an effect to completion
        ///
        /// # Error Handling Strategy
        ///
        /// Effect failures are logged and do not halt the store. A panic in an
        /// effect is isolated in its task; the guards still update the counters.
        fn run(self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        tracing::trace!("Executing Effect::Future");
                        metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            self.deliver(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                        metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                        tokio::time::sleep(duration).await;
                        self.deliver(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                        metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                        let branches = effects.into_iter().map(|effect| self.clone().run(effect));
                        futures::future::join_all(branches).await;
                    },
                    Effect::Sequential(effects) => {
                        let effect_count = effects.len();
                        tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                        metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!("Executing sequential effect {} of {}", idx + 1, effect_count);
                            self.clone().run(effect).await;
                        }
                    },
                    Effect::Cancellable { id, effect } => {
                        metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                        let (task, generation) = self.spawn_cancellable(id.clone(), *effect);
                        self.join_cancellable(id, generation, task).await;
                    },
                    Effect::Cancel(id) => {
                        metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                        self.cancel(&id);
                    },
                }
            })
        }

        /// Feed an effect-produced action back into the store, then publish it
        ///
        /// Bypasses the shutdown check so that a draining shutdown still sees
        /// the work it waited for.
        async fn deliver(&self, action: A) {
            if self.is_shutting_down() {
                tracing::debug!("Delivering effect action while shutting down");
            }
            let _ = self.reduce_action(action.clone(), |_| ()).await;
            // No observers is fine
            let _ = self.action_broadcast.send(action);
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config,
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}
