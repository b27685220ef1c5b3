//! Async orchestration of remote calls for one resource collection

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{reducer, Operation, ResourceAction, ResourceState};
use crate::error::{OperationError, TransportError};
use crate::remote::{Entity, RemoteResource};
use crate::store::{LoggingMiddleware, Store};

type EntityOf<R> = <R as RemoteResource>::Entity;
type IdOf<R> = <EntityOf<R> as Entity>::Id;
type Inner<T> = Store<ResourceState<T>, ResourceAction<T>, LoggingMiddleware>;

/// Local mirror of one remote collection plus its operation state
///
/// Every operation dispatches `Begin` before calling the remote client and
/// exactly one settling action when the call resolves. Results are applied
/// in resolution order; the lock is held only for the duration of a single
/// reducer call, never across an `.await`.
///
/// # Example
/// ```ignore
/// let store = ResourceStore::new("aoi", client);
/// store.fetch_all().await;
/// let created = store.create(&draft).await?;
/// store.read(|state| assert!(state.get(created.id()).is_some()));
/// ```
pub struct ResourceStore<R: RemoteResource> {
    scope: &'static str,
    remote: R,
    inner: Mutex<Inner<R::Entity>>,
    revision: watch::Sender<u64>,
}

impl<R: RemoteResource> ResourceStore<R> {
    /// Create an empty store backed by `remote`
    ///
    /// `scope` names the store in log records.
    pub fn new(scope: &'static str, remote: R) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            scope,
            remote,
            inner: Mutex::new(Store::with_middleware(
                ResourceState::default(),
                reducer,
                LoggingMiddleware::new(scope),
            )),
            revision,
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    /// The remote client, for calls against nested endpoints
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ResourceState<R::Entity> {
        self.lock().state().clone()
    }

    /// Run `f` against a snapshot of the current state
    ///
    /// The lock is released before `f` runs, so `f` may call back into the
    /// store. Changes it makes are not visible in the snapshot it was given.
    pub fn read<O>(&self, f: impl FnOnce(&ResourceState<R::Entity>) -> O) -> O {
        let state = self.state();
        f(&state)
    }

    /// Revision counter bumped on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Replace the collection with the backend's list
    ///
    /// Failures are recorded in the state's `error` and not returned: a
    /// failed refresh leaves the previous collection displayed.
    pub async fn fetch_all(&self) {
        let result = self
            .run(Operation::FetchAll, self.remote.list(), |items| {
                (ResourceAction::DidFetchAll(items), ())
            })
            .await;
        if result.is_err() {
            tracing::debug!(scope = self.scope, "Keeping previous collection");
        }
    }

    /// Re-read one entity and replace it in place if it is present
    pub async fn fetch_one(&self, id: &IdOf<R>) -> Result<R::Entity, OperationError> {
        self.run(Operation::FetchOne, self.remote.get(id), |entity| {
            (ResourceAction::DidFetchOne(entity.clone()), entity)
        })
        .await
    }

    /// Create an entity and append the backend's copy to the collection
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Entity, OperationError> {
        self.run(Operation::Create, self.remote.create(draft), |entity| {
            (ResourceAction::DidCreate(entity.clone()), entity)
        })
        .await
    }

    /// Update an entity; the backend's copy replaces the local one in place
    ///
    /// If the entity is no longer in the collection when the response
    /// arrives, the local collection is left unchanged.
    pub async fn update(&self, entity: &R::Entity) -> Result<R::Entity, OperationError> {
        self.run(Operation::Update, self.remote.update(entity), |entity| {
            (ResourceAction::DidUpdate(entity.clone()), entity)
        })
        .await
    }

    /// Delete an entity by id; deleting an unknown id is harmless
    pub async fn delete(&self, id: &IdOf<R>) -> Result<(), OperationError> {
        let removed = id.clone();
        self.run(Operation::Delete, self.remote.delete(id), move |()| {
            (ResourceAction::DidDelete(removed), ())
        })
        .await
    }

    /// Track a call that does not touch the collection
    ///
    /// The call counts as in flight on this store and failures are recorded
    /// like any other operation. `apply` runs before the operation settles.
    pub async fn track<O>(
        &self,
        op: Operation,
        call: impl Future<Output = Result<O, TransportError>>,
        apply: impl FnOnce(&O),
    ) -> Result<O, OperationError> {
        self.run(op, call, |output| {
            apply(&output);
            (ResourceAction::DidSettle(op), output)
        })
        .await
    }

    pub fn set_selected(&self, entity: R::Entity) {
        self.dispatch(ResourceAction::Select(entity));
    }

    pub fn clear_selected(&self) {
        self.dispatch(ResourceAction::ClearSelected);
    }

    /// Clear the recorded error without touching loading or the collection
    pub fn clear_error(&self) {
        self.dispatch(ResourceAction::ClearError);
    }

    async fn run<O, V>(
        &self,
        op: Operation,
        call: impl Future<Output = Result<O, TransportError>>,
        merge: impl FnOnce(O) -> (ResourceAction<R::Entity>, V),
    ) -> Result<V, OperationError> {
        let flight = InFlight::begin(self, op);
        match call.await {
            Ok(output) => {
                let (action, value) = merge(output);
                flight.settle(action);
                Ok(value)
            }
            Err(err) => {
                let error = OperationError::from(err);
                tracing::warn!(
                    scope = self.scope,
                    operation = %op,
                    error = %error,
                    "Operation failed"
                );
                flight.settle(ResourceAction::DidFail {
                    op,
                    message: error.message().to_owned(),
                });
                Err(error)
            }
        }
    }

    fn dispatch(&self, action: ResourceAction<R::Entity>) -> bool {
        let changed = self.lock().dispatch(action);
        if changed {
            self.revision.send_modify(|revision| *revision += 1);
        }
        changed
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R::Entity>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-flight mark for one operation
///
/// Released by [`InFlight::settle`] or, if the operation's future is
/// dropped first, by `Drop`.
struct InFlight<'a, R: RemoteResource> {
    store: &'a ResourceStore<R>,
    op: Operation,
    settled: bool,
}

impl<'a, R: RemoteResource> InFlight<'a, R> {
    fn begin(store: &'a ResourceStore<R>, op: Operation) -> Self {
        store.dispatch(ResourceAction::Begin(op));
        Self {
            store,
            op,
            settled: false,
        }
    }

    fn settle(mut self, action: ResourceAction<R::Entity>) {
        self.settled = true;
        self.store.dispatch(action);
    }
}

impl<R: RemoteResource> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(scope = self.store.scope, operation = %self.op, "Operation abandoned");
            self.store.dispatch(ResourceAction::Abandon(self.op));
        }
    }
}
