//! Local mirror of one remote collection
//!
//! [`ResourceState`] is the state, [`ResourceAction`] the actions and
//! [`reducer`] the merge rules. [`ResourceStore`] drives remote calls and
//! dispatches the result actions.
//!
//! Operations follow the two-phase pattern: `Begin` marks an operation in
//! flight before the remote call, and exactly one result action (`Did*`,
//! `DidFail` or `Abandon`) settles it. A result action performs its merge
//! and its settlement in one reducer call, so concurrent operations never
//! observe a half-applied response.

mod store;

pub use store::ResourceStore;

use std::collections::HashSet;
use std::fmt;

use crate::action::{Action, ActionCategory};
use crate::remote::Entity;

/// Kind of operation tracked by a resource store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
    /// A call against a nested endpoint (e.g. detection job results)
    Nested(&'static str),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::FetchAll => f.write_str("fetch_all"),
            Operation::FetchOne => f.write_str("fetch_one"),
            Operation::Create => f.write_str("create"),
            Operation::Update => f.write_str("update"),
            Operation::Delete => f.write_str("delete"),
            Operation::Nested(name) => f.write_str(name),
        }
    }
}

/// State of one resource store
///
/// Read-only outside this module: the collection changes only through
/// [`reducer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceState<T> {
    items: Vec<T>,
    selected: Option<T>,
    in_flight: usize,
    error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            in_flight: 0,
            error: None,
        }
    }
}

impl<T: Entity> ResourceState<T> {
    /// Collection in backend order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Index of the entity with the given id
    pub fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// True while at least one operation on this store is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of outstanding operations
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Message of the last failed operation
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn settle(&mut self) {
        // Saturating: an unmatched settlement must not wrap the counter.
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn succeed(&mut self) {
        self.settle();
        self.error = None;
    }

    fn replace(&mut self, entity: T) -> bool {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                true
            }
            None => false,
        }
    }
}

/// Actions understood by [`reducer`]
#[derive(Clone, Debug)]
pub enum ResourceAction<T: Entity> {
    /// Intent: an operation was issued
    Begin(Operation),
    /// Result: full collection from the backend
    DidFetchAll(Vec<T>),
    /// Result: one entity re-read from the backend
    DidFetchOne(T),
    DidCreate(T),
    DidUpdate(T),
    DidDelete(T::Id),
    /// Result: the operation succeeded without touching the collection
    DidSettle(Operation),
    DidFail {
        op: Operation,
        message: String,
    },
    /// The caller dropped the operation before it resolved
    Abandon(Operation),
    Select(T),
    ClearSelected,
    ClearError,
}

impl<T: Entity> Action for ResourceAction<T> {
    fn name(&self) -> &'static str {
        match self {
            ResourceAction::Begin(_) => "Begin",
            ResourceAction::DidFetchAll(_) => "DidFetchAll",
            ResourceAction::DidFetchOne(_) => "DidFetchOne",
            ResourceAction::DidCreate(_) => "DidCreate",
            ResourceAction::DidUpdate(_) => "DidUpdate",
            ResourceAction::DidDelete(_) => "DidDelete",
            ResourceAction::DidSettle(_) => "DidSettle",
            ResourceAction::DidFail { .. } => "DidFail",
            ResourceAction::Abandon(_) => "Abandon",
            ResourceAction::Select(_) => "Select",
            ResourceAction::ClearSelected => "ClearSelected",
            ResourceAction::ClearError => "ClearError",
        }
    }
}

impl<T: Entity> ActionCategory for ResourceAction<T> {
    fn category(&self) -> Option<&'static str> {
        match self {
            ResourceAction::Begin(_) | ResourceAction::Abandon(_) => Some("operation"),
            ResourceAction::DidFetchAll(_)
            | ResourceAction::DidFetchOne(_)
            | ResourceAction::DidCreate(_)
            | ResourceAction::DidUpdate(_)
            | ResourceAction::DidDelete(_)
            | ResourceAction::DidSettle(_)
            | ResourceAction::DidFail { .. } => Some("async_result"),
            ResourceAction::Select(_) | ResourceAction::ClearSelected => Some("selection"),
            ResourceAction::ClearError => None,
        }
    }
}

/// Merge rules for a resource collection
///
/// - fetch-all replaces the collection (duplicate ids keep the first)
/// - create appends, or replaces in place when the id is already present
/// - update and fetch-one replace in place; unknown ids are ignored
/// - delete filters by id
pub fn reducer<T: Entity>(state: &mut ResourceState<T>, action: ResourceAction<T>) -> bool {
    match action {
        ResourceAction::Begin(_) => {
            state.in_flight += 1;
            true
        }

        ResourceAction::DidFetchAll(items) => {
            state.items = unique_by_id(items);
            state.succeed();
            true
        }

        ResourceAction::DidFetchOne(entity) => {
            state.replace(entity);
            state.succeed();
            true
        }

        ResourceAction::DidCreate(entity) => {
            if let Some(index) = state.position(entity.id()) {
                tracing::debug!(id = %entity.id(), "Created entity already present, replacing");
                state.items[index] = entity;
            } else {
                state.items.push(entity);
            }
            state.succeed();
            true
        }

        ResourceAction::DidUpdate(entity) => {
            let id = entity.id().clone();
            if !state.replace(entity) {
                tracing::debug!(id = %id, "Updated entity not in collection, dropping");
            }
            state.succeed();
            true
        }

        ResourceAction::DidDelete(id) => {
            state.items.retain(|item| item.id() != &id);
            state.succeed();
            true
        }

        ResourceAction::DidSettle(_) => {
            state.succeed();
            true
        }

        ResourceAction::DidFail { message, .. } => {
            state.settle();
            state.error = Some(message);
            true
        }

        ResourceAction::Abandon(_) => {
            state.settle();
            true
        }

        ResourceAction::Select(entity) => {
            state.selected = Some(entity);
            true
        }

        ResourceAction::ClearSelected => state.selected.take().is_some(),

        ResourceAction::ClearError => state.error.take().is_some(),
    }
}

fn unique_by_id<T: Entity>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    let unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect();
    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "Fetched collection contained duplicate ids"
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Record;

    fn loaded(items: Vec<Record>) -> ResourceState<Record> {
        let mut state = ResourceState::default();
        reducer(&mut state, ResourceAction::Begin(Operation::FetchAll));
        reducer(&mut state, ResourceAction::DidFetchAll(items));
        state
    }

    #[test]
    fn test_categories() {
        let fail = ResourceAction::<Record>::DidFail {
            op: Operation::Delete,
            message: "gone".into(),
        };

        assert_eq!(ResourceAction::<Record>::Begin(Operation::Create).category(), Some("operation"));
        assert_eq!(ResourceAction::<Record>::DidDelete(1).category(), Some("async_result"));
        assert_eq!(fail.category(), Some("async_result"));
        assert_eq!(ResourceAction::<Record>::ClearSelected.category(), Some("selection"));
        assert_eq!(ResourceAction::<Record>::ClearError.category(), None);
    }

    #[test]
    fn test_begin_sets_loading() {
        let mut state = ResourceState::<Record>::default();
        assert!(!state.is_loading());

        assert!(reducer(&mut state, ResourceAction::Begin(Operation::Create)));

        assert!(state.is_loading());
        assert_eq!(state.in_flight(), 1);
    }

    #[test]
    fn test_fetch_all_replaces_collection() {
        let mut state = loaded(vec![Record::new(1, "a"), Record::new(2, "b")]);
        assert!(!state.is_loading());

        reducer(&mut state, ResourceAction::Begin(Operation::FetchAll));
        reducer(&mut state, ResourceAction::DidFetchAll(vec![Record::new(3, "c")]));

        assert_eq!(state.items(), &[Record::new(3, "c")]);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_fetch_all_collapses_duplicate_ids() {
        let state = loaded(vec![
            Record::new(1, "first"),
            Record::new(2, "b"),
            Record::new(1, "second"),
        ]);

        assert_eq!(state.len(), 2);
        assert_eq!(state.get(&1).map(|r| r.name.as_str()), Some("first"));
    }

    #[test]
    fn test_create_appends_at_end() {
        let mut state = loaded(vec![Record::new(1, "a")]);

        reducer(&mut state, ResourceAction::Begin(Operation::Create));
        reducer(&mut state, ResourceAction::DidCreate(Record::new(2, "b")));

        assert_eq!(state.position(&2), Some(1));
    }

    #[test]
    fn test_create_of_known_id_replaces_in_place() {
        let mut state = loaded(vec![Record::new(1, "a"), Record::new(2, "b")]);

        reducer(&mut state, ResourceAction::Begin(Operation::Create));
        reducer(&mut state, ResourceAction::DidCreate(Record::new(1, "a2")));

        assert_eq!(state.len(), 2);
        assert_eq!(state.items()[0], Record::new(1, "a2"));
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut state = loaded(vec![Record::new(1, "a")]);
        let before = state.items().to_vec();

        reducer(&mut state, ResourceAction::Begin(Operation::Update));
        reducer(&mut state, ResourceAction::DidUpdate(Record::new(9, "ghost")));

        assert_eq!(state.items(), before.as_slice());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_delete_twice_is_idempotent() {
        let mut state = loaded(vec![Record::new(1, "a"), Record::new(2, "b")]);

        reducer(&mut state, ResourceAction::Begin(Operation::Delete));
        reducer(&mut state, ResourceAction::DidDelete(1));
        let once = state.items().to_vec();

        reducer(&mut state, ResourceAction::Begin(Operation::Delete));
        reducer(&mut state, ResourceAction::DidDelete(1));

        assert_eq!(state.items(), once.as_slice());
        assert_eq!(once, vec![Record::new(2, "b")]);
    }

    #[test]
    fn test_fail_records_error_and_settles() {
        let mut state = loaded(vec![Record::new(1, "a")]);

        reducer(&mut state, ResourceAction::Begin(Operation::Create));
        reducer(
            &mut state,
            ResourceAction::DidFail {
                op: Operation::Create,
                message: "network down".into(),
            },
        );

        assert_eq!(state.error(), Some("network down"));
        assert!(!state.is_loading());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut state = ResourceState::<Record>::default();
        reducer(&mut state, ResourceAction::Begin(Operation::FetchAll));
        reducer(
            &mut state,
            ResourceAction::DidFail {
                op: Operation::FetchAll,
                message: "boom".into(),
            },
        );

        reducer(&mut state, ResourceAction::Begin(Operation::FetchAll));
        reducer(&mut state, ResourceAction::DidFetchAll(vec![]));

        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_loading_until_last_settlement() {
        let mut state = ResourceState::<Record>::default();
        reducer(&mut state, ResourceAction::Begin(Operation::Create));
        reducer(&mut state, ResourceAction::Begin(Operation::Update));

        reducer(&mut state, ResourceAction::DidCreate(Record::new(1, "a")));
        assert!(state.is_loading());

        reducer(&mut state, ResourceAction::Abandon(Operation::Update));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_selection_is_local() {
        let mut state = ResourceState::<Record>::default();

        assert!(reducer(&mut state, ResourceAction::Select(Record::new(5, "x"))));
        assert_eq!(state.selected(), Some(&Record::new(5, "x")));
        assert!(!state.is_loading());

        assert!(reducer(&mut state, ResourceAction::ClearSelected));
        assert!(!reducer(&mut state, ResourceAction::ClearSelected));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_clear_error_leaves_loading() {
        let mut state = ResourceState::<Record>::default();
        reducer(&mut state, ResourceAction::Begin(Operation::FetchAll));
        reducer(&mut state, ResourceAction::Begin(Operation::Create));
        reducer(
            &mut state,
            ResourceAction::DidFail {
                op: Operation::FetchAll,
                message: "boom".into(),
            },
        );

        assert!(reducer(&mut state, ResourceAction::ClearError));
        assert_eq!(state.error(), None);
        assert!(state.is_loading());
        assert!(!reducer(&mut state, ResourceAction::ClearError));
    }

    #[test]
    fn test_unmatched_settlement_does_not_underflow() {
        let mut state = ResourceState::<Record>::default();
        reducer(&mut state, ResourceAction::Abandon(Operation::Delete));
        assert_eq!(state.in_flight(), 0);
    }
}
