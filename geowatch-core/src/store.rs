//! Reducer-driven state container
//!
//! State changes only by dispatching an action through a reducer. An
//! optional middleware sees every action together with whether it changed
//! anything.

use std::marker::PhantomData;

use crate::{Action, ActionCategory};

/// Applies one action to the state
///
/// Returns `true` if the state changed and observers should be notified.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Observer of dispatched actions
pub trait Middleware<A: Action> {
    /// Called once per dispatch, after the reducer ran
    fn observe(&mut self, action: &A, changed: bool);
}

impl<A: Action> Middleware<A> for () {
    fn observe(&mut self, _action: &A, _changed: bool) {}
}

/// State plus the reducer allowed to change it
///
/// Resource stores and the root store each wrap one behind a mutex.
///
/// # Example
/// ```
/// use geowatch_core::{Action, Store};
///
/// #[derive(Clone, Debug)]
/// struct Bump;
///
/// impl Action for Bump {
///     fn name(&self) -> &'static str {
///         "Bump"
///     }
/// }
///
/// fn reducer(count: &mut u32, _: Bump) -> bool {
///     *count += 1;
///     true
/// }
///
/// let mut store = Store::new(0, reducer);
/// assert!(store.dispatch(Bump));
/// assert_eq!(*store.state(), 1);
/// ```
pub struct Store<S, A: Action, M: Middleware<A> = ()> {
    state: S,
    reducer: Reducer<S, A>,
    middleware: M,
    _action: PhantomData<fn(A)>,
}

impl<S, A: Action> Store<S, A> {
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self::with_middleware(state, reducer, ())
    }
}

impl<S, A: Action, M: Middleware<A>> Store<S, A, M> {
    pub fn with_middleware(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            state,
            reducer,
            middleware,
            _action: PhantomData,
        }
    }

    /// Run `action` through the reducer; returns whether the state changed
    pub fn dispatch(&mut self, action: A) -> bool {
        let changed = (self.reducer)(&mut self.state, action.clone());
        self.middleware.observe(&action, changed);
        changed
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Writes one `tracing` debug record per dispatched action
///
/// Records carry the store's scope, the action's name and category, and
/// whether the state changed.
#[derive(Debug, Clone, Copy)]
pub struct LoggingMiddleware {
    scope: &'static str,
}

impl LoggingMiddleware {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }
}

impl<A: ActionCategory> Middleware<A> for LoggingMiddleware {
    fn observe(&mut self, action: &A, changed: bool) {
        tracing::debug!(
            scope = self.scope,
            action = %action.name(),
            category = %action.category().unwrap_or("none"),
            changed,
            "Dispatched"
        );
    }
}
