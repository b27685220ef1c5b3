//! Test utilities for stores built on geowatch-core
//!
//! - [`MockRemote`]: scripted [`RemoteResource`] with call recording
//! - [`Gate`]: holds a scripted reply until released, for ordering tests
//! - [`Record`] / [`NewRecord`]: a minimal entity and its draft
//!
//! # Example
//!
//! ```
//! use geowatch_core::testing::{MockRemote, NewRecord, Record};
//! use geowatch_core::ResourceStore;
//!
//! # tokio_test_block(async {
//! let remote = MockRemote::<Record, NewRecord>::new();
//! remote.reply_create(Ok(Record::new(2, "AOI-2")));
//!
//! let store = ResourceStore::new("aoi", remote.clone());
//! let created = store.create(&NewRecord::new("AOI-2")).await.unwrap();
//! assert_eq!(created.id, 2);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::TransportError;
use crate::remote::{Entity, RemoteResource};

/// Minimal entity: numeric id and a name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
}

impl Record {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Record {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// Draft for [`Record`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
}

impl NewRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A call received by a [`MockRemote`]
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List,
    /// Serialized draft
    Create(serde_json::Value),
    Get(String),
    Update(String),
    Delete(String),
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::List => f.write_str("list"),
            Call::Create(_) => f.write_str("create"),
            Call::Get(id) => write!(f, "get {id}"),
            Call::Update(id) => write!(f, "update {id}"),
            Call::Delete(id) => write!(f, "delete {id}"),
        }
    }
}

/// Releases a gated reply
///
/// Dropping the gate also releases it.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

struct Scripted<O> {
    reply: Result<O, TransportError>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<O> Scripted<O> {
    fn missing(call: &Call) -> Self {
        Self {
            reply: Err(TransportError::Network(format!(
                "no scripted response for {call}"
            ))),
            gate: None,
        }
    }

    async fn resolve(self) -> Result<O, TransportError> {
        if let Some(gate) = self.gate {
            // A dropped sender counts as released.
            let _ = gate.await;
        }
        self.reply
    }
}

struct Script<T> {
    list: VecDeque<Scripted<Vec<T>>>,
    create: VecDeque<Scripted<T>>,
    get: VecDeque<Scripted<T>>,
    update: VecDeque<Scripted<T>>,
    delete: VecDeque<Scripted<()>>,
    calls: Vec<Call>,
}

/// Scripted remote resource
///
/// Replies are queued per operation and consumed in call order: the reply
/// is taken when the call is made, not when its future is first polled. A
/// call with nothing queued fails with a network error. Clones share the same script,
/// so a test can keep a handle while the store owns another.
pub struct MockRemote<T, D> {
    script: Arc<Mutex<Script<T>>>,
    _draft: PhantomData<fn() -> D>,
}

impl<T, D> Clone for MockRemote<T, D> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            _draft: PhantomData,
        }
    }
}

impl<T, D> Default for MockRemote<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> MockRemote<T, D> {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                list: VecDeque::new(),
                create: VecDeque::new(),
                get: VecDeque::new(),
                update: VecDeque::new(),
                delete: VecDeque::new(),
                calls: Vec::new(),
            })),
            _draft: PhantomData,
        }
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn reply_list(&self, reply: Result<Vec<T>, TransportError>) -> &Self {
        self.lock().list.push_back(ready(reply));
        self
    }

    pub fn reply_create(&self, reply: Result<T, TransportError>) -> &Self {
        self.lock().create.push_back(ready(reply));
        self
    }

    pub fn reply_get(&self, reply: Result<T, TransportError>) -> &Self {
        self.lock().get.push_back(ready(reply));
        self
    }

    pub fn reply_update(&self, reply: Result<T, TransportError>) -> &Self {
        self.lock().update.push_back(ready(reply));
        self
    }

    pub fn reply_delete(&self, reply: Result<(), TransportError>) -> &Self {
        self.lock().delete.push_back(ready(reply));
        self
    }

    pub fn gated_list(&self, reply: Result<Vec<T>, TransportError>) -> Gate {
        let (gate, scripted) = gated(reply);
        self.lock().list.push_back(scripted);
        gate
    }

    pub fn gated_create(&self, reply: Result<T, TransportError>) -> Gate {
        let (gate, scripted) = gated(reply);
        self.lock().create.push_back(scripted);
        gate
    }

    pub fn gated_update(&self, reply: Result<T, TransportError>) -> Gate {
        let (gate, scripted) = gated(reply);
        self.lock().update.push_back(scripted);
        gate
    }

    pub fn gated_delete(&self, reply: Result<(), TransportError>) -> Gate {
        let (gate, scripted) = gated(reply);
        self.lock().delete.push_back(scripted);
        gate
    }

    fn next<O>(
        &self,
        call: Call,
        queue: impl FnOnce(&mut Script<T>) -> &mut VecDeque<Scripted<O>>,
    ) -> Scripted<O> {
        let mut script = self.lock();
        let scripted = queue(&mut *script).pop_front();
        let scripted = scripted.unwrap_or_else(|| Scripted::missing(&call));
        script.calls.push(call);
        scripted
    }

    fn lock(&self) -> MutexGuard<'_, Script<T>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ready<O>(reply: Result<O, TransportError>) -> Scripted<O> {
    Scripted { reply, gate: None }
}

fn gated<O>(reply: Result<O, TransportError>) -> (Gate, Scripted<O>) {
    let (tx, rx) = oneshot::channel();
    (
        Gate(tx),
        Scripted {
            reply,
            gate: Some(rx),
        },
    )
}

impl<T, D> RemoteResource for MockRemote<T, D>
where
    T: Entity,
    D: Serialize + Send + Sync,
{
    type Entity = T;
    type Draft = D;

    fn list(&self) -> impl Future<Output = Result<Vec<T>, TransportError>> + Send {
        self.next(Call::List, |s| &mut s.list).resolve()
    }

    fn create(&self, draft: &D) -> impl Future<Output = Result<T, TransportError>> + Send {
        let body = serde_json::to_value(draft).unwrap_or(serde_json::Value::Null);
        self.next(Call::Create(body), |s| &mut s.create).resolve()
    }

    fn get(&self, id: &T::Id) -> impl Future<Output = Result<T, TransportError>> + Send {
        self.next(Call::Get(id.to_string()), |s| &mut s.get).resolve()
    }

    fn update(&self, entity: &T) -> impl Future<Output = Result<T, TransportError>> + Send {
        self.next(Call::Update(entity.id().to_string()), |s| &mut s.update)
            .resolve()
    }

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), TransportError>> + Send {
        self.next(Call::Delete(id.to_string()), |s| &mut s.delete)
            .resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order() {
        let remote = MockRemote::<Record, NewRecord>::new();
        remote
            .reply_list(Ok(vec![Record::new(1, "a")]))
            .reply_list(Err(TransportError::Network("down".into())));

        assert_eq!(remote.list().await.unwrap().len(), 1);
        assert!(remote.list().await.is_err());
        assert_eq!(remote.calls(), vec![Call::List, Call::List]);
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let remote = MockRemote::<Record, NewRecord>::new();

        let err = remote.delete(&3).await.unwrap_err();

        assert_eq!(err.to_string(), "no scripted response for delete 3");
    }

    #[tokio::test]
    async fn test_create_records_draft() {
        let remote = MockRemote::<Record, NewRecord>::new();
        remote.reply_create(Ok(Record::new(1, "a")));

        remote.create(&NewRecord::new("a")).await.unwrap();

        assert_eq!(
            remote.calls(),
            vec![Call::Create(serde_json::json!({ "name": "a" }))]
        );
    }

    #[tokio::test]
    async fn test_gate_holds_reply() {
        let remote = MockRemote::<Record, NewRecord>::new();
        let gate = remote.gated_create(Ok(Record::new(1, "a")));
        let draft = NewRecord::new("a");

        let pending = remote.create(&draft);
        tokio::pin!(pending);
        let early =
            tokio::time::timeout(std::time::Duration::from_millis(10), &mut pending).await;
        assert!(early.is_err());

        gate.open();
        assert_eq!(pending.await.unwrap(), Record::new(1, "a"));
    }
}
