//! # Todo Store Core
//!
//! Core traits and types for the todo store.
//!
//! This crate provides the abstractions the store is built from. Business logic
//! lives in reducers, side effects are returned as values, and the runtime crate
//! executes them.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (state changes and intents)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```
//! use todo_store_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug, Default)]
//! struct BannerState {
//!     visible: bool,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum BannerAction {
//!     Show,
//!     Hide,
//! }
//!
//! struct BannerReducer;
//!
//! impl Reducer for BannerReducer {
//!     type State = BannerState;
//!     type Action = BannerAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BannerState,
//!         action: BannerAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<BannerAction>; 4]> {
//!         match action {
//!             BannerAction::Show => {
//!                 state.visible = true;
//!                 smallvec![Effect::delay(Duration::from_secs(5), BannerAction::Hide)]
//!             },
//!             BannerAction::Hide => {
//!                 state.visible = false;
//!                 SmallVec::new()
//!             },
//!         }
//!     }
//! }
//!
//! let mut state = BannerState::default();
//! let effects = BannerReducer.reduce(&mut state, BannerAction::Show, &());
//! assert!(state.visible);
//! assert_eq!(effects.len(), 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities
pub mod composition;

/// Reducer module - The core trait for business logic
///
/// Reducers take `(State, Action, Environment)`, update state in place and
/// return effect descriptions. They contain all business logic and are
/// deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use serde::{Deserialize, Serialize};
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier used to cancel an in-flight effect
    ///
    /// An effect wrapped in [`Effect::Cancellable`] is registered under its id
    /// by the runtime until it finishes. [`Effect::Cancel`] with the same id
    /// aborts it.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EffectId(String);

    impl EffectId {
        /// Creates a new effect id
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(id.into())
        }

        /// Returns the id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, expiring notifications)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run the inner effect so that it can be aborted by id
        Cancellable {
            /// Id the running effect is registered under
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort the in-flight effect registered under this id
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Dispatch `action` after `duration`
        #[must_use]
        pub fn delay(duration: Duration, action: Action) -> Effect<Action> {
            Effect::Delay {
                duration,
                action: Box::new(action),
            }
        }

        /// Make this effect abortable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use std::time::Duration;

    #[test]
    fn effect_id_display() {
        let id = EffectId::new("notification-workflow:42");
        assert_eq!(id.to_string(), "notification-workflow:42");
        assert_eq!(id.as_str(), "notification-workflow:42");
    }

    #[test]
    fn cancellable_wraps_inner_effect() {
        let effect = Effect::delay(Duration::from_secs(5), "hide").cancellable(EffectId::new("a"));

        let Effect::Cancellable { id, effect } = effect else {
            unreachable!("cancellable() always wraps");
        };
        assert_eq!(id, EffectId::new("a"));
        assert!(matches!(*effect, Effect::Delay { duration, .. } if duration == Duration::from_secs(5)));
    }

    #[test]
    fn debug_output_hides_futures() {
        let effect: Effect<u8> = Effect::merge(vec![
            Effect::Future(Box::pin(async { Some(1) })),
            Effect::Cancel(EffectId::new("x")),
        ]);
        let rendered = format!("{effect:?}");
        assert!(rendered.contains("Effect::Future(<future>)"));
        assert!(rendered.contains("Effect::Cancel"));
    }

    #[test]
    fn is_none() {
        assert!(Effect::<()>::None.is_none());
        assert!(!Effect::<()>::chain(vec![]).is_none());
    }
}
