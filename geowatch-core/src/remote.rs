//! Remote resource contract
//!
//! A remote resource is one REST endpoint family on the backend
//! (`/{resource}` and `/{resource}/{id}`). Implementations are stateless;
//! the [`ResourceStore`](crate::ResourceStore) owns all local state.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;

use serde::Serialize;

use crate::error::TransportError;

/// One record of a resource kind
///
/// The `id` is assigned by the backend and is unique within a collection.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

/// Typed calls against one resource's endpoint family.
///
/// Every method fails with a [`TransportError`] when the call cannot be
/// completed or the backend reports a non-success status.
pub trait RemoteResource: Send + Sync {
    /// Entity returned by the backend
    type Entity: Entity;
    /// Caller-supplied fields for `create` (no id)
    type Draft: Serialize + Send + Sync;

    /// `GET /{resource}`
    fn list(&self) -> impl Future<Output = Result<Vec<Self::Entity>, TransportError>> + Send;

    /// `POST /{resource}`
    fn create(
        &self,
        draft: &Self::Draft,
    ) -> impl Future<Output = Result<Self::Entity, TransportError>> + Send;

    /// `GET /{resource}/{id}`
    fn get(
        &self,
        id: &<Self::Entity as Entity>::Id,
    ) -> impl Future<Output = Result<Self::Entity, TransportError>> + Send;

    /// `PUT /{resource}/{id}` with the full entity as body
    fn update(
        &self,
        entity: &Self::Entity,
    ) -> impl Future<Output = Result<Self::Entity, TransportError>> + Send;

    /// `DELETE /{resource}/{id}`
    fn delete(
        &self,
        id: &<Self::Entity as Entity>::Id,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
