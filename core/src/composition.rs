//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on one slice of a larger state
//! - **`log_actions`**: Log every action passing through a reducer
//!
//! # Examples
//!
//! ## Splitting state into slices
//!
//! ```
//! use todo_store_core::composition::{combine_reducers, scope_reducer, BoxedReducer};
//! use todo_store_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     visits: u32,
//!     theme: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Visit,
//!     SetTheme(String),
//! }
//!
//! struct VisitReducer;
//! struct ThemeReducer;
//!
//! impl Reducer for VisitReducer {
//!     type State = u32;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, visits: &mut u32, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if matches!(action, AppAction::Visit) {
//!             *visits += 1;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for ThemeReducer {
//!     type State = String;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, theme: &mut String, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if let AppAction::SetTheme(name) = action {
//!             *theme = name;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! fn visits(state: &mut AppState) -> &mut u32 {
//!     &mut state.visits
//! }
//!
//! fn theme(state: &mut AppState) -> &mut String {
//!     &mut state.theme
//! }
//!
//! let slices: Vec<BoxedReducer<AppState, AppAction, ()>> = vec![
//!     Box::new(scope_reducer(VisitReducer, visits)),
//!     Box::new(scope_reducer(ThemeReducer, theme)),
//! ];
//! let root = combine_reducers(slices);
//!
//! let mut state = AppState::default();
//! root.reduce(&mut state, AppAction::Visit, &());
//! root.reduce(&mut state, AppAction::SetTheme("dark".into()), &());
//! assert_eq!(state.visits, 1);
//! assert_eq!(state.theme, "dark");
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// A boxed reducer that can be shared with the runtime's worker tasks
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
/// This is useful when you want to split reducer logic across multiple implementations.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns true if no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}

/// Scopes a reducer to operate on one slice of a larger state.
///
/// `slice` is a lens from the parent state to the child state. The child
/// reducer mutates the slice in place, so no copy of the slice is made.
pub fn scope_reducer<S, SubS, A, E, R>(reducer: R, slice: fn(&mut S) -> &mut SubS) -> ScopedReducer<S, SubS, A, E, R>
where
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        slice,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    slice: fn(&mut S) -> &mut SubS,
    _phantom: std::marker::PhantomData<fn(A, &E)>,
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.reducer.reduce((self.slice)(state), action, env)
    }
}

/// Wraps a reducer so every action is logged through `tracing`.
///
/// The action is logged at `debug`. The state before and after the reduction
/// is logged at `trace`, and only rendered when that level is enabled.
pub const fn log_actions<R>(reducer: R, target: &'static str) -> LoggedReducer<R> {
    LoggedReducer { reducer, target }
}

/// A reducer that logs actions and state transitions.
///
/// Created by [`log_actions`].
#[derive(Debug, Clone)]
pub struct LoggedReducer<R> {
    reducer: R,
    target: &'static str,
}

impl<R> LoggedReducer<R> {
    /// The wrapped reducer
    pub const fn inner(&self) -> &R {
        &self.reducer
    }
}

impl<R> Reducer for LoggedReducer<R>
where
    R: Reducer,
    R::State: std::fmt::Debug,
    R::Action: std::fmt::Debug,
{
    type State = R::State;
    type Action = R::Action;
    type Environment = R::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let trace_state = tracing::enabled!(tracing::Level::TRACE);
        if trace_state {
            tracing::trace!(reducer = self.target, prev_state = ?state, "state before action");
        }
        tracing::debug!(reducer = self.target, action = ?action, "action");

        let effects = self.reducer.reduce(state, action, env);

        if trace_state {
            tracing::trace!(reducer = self.target, next_state = ?state, "state after action");
        }
        tracing::debug!(reducer = self.target, effects = effects.len(), "action reduced");

        effects
    }
}
