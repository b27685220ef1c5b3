//! Core traits and types for geowatch
//!
//! This crate provides the client-side synchronization layer: local mirrors
//! of remote collections whose state changes only through dispatched
//! actions, following a Redux/Elm-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Action**: describes a state change
//! - **Store**: state container with a reducer and an optional middleware
//! - **RemoteResource**: typed REST calls for one endpoint family
//! - **ResourceStore**: a remote collection mirrored locally, with
//!   loading/error tracking and merge rules for every result
//!
//! # Async Operation Pattern
//!
//! Every resource operation is two-phase:
//!
//! 1. **Intent** (`Begin`) marks the operation in flight
//! 2. **Result** (`DidCreate`, `DidFail`, ...) merges the response and
//!    settles the operation in one reducer call
//!
//! ```ignore
//! let store = ResourceStore::new("aoi", client);
//!
//! store.fetch_all().await;              // failures land in state().error()
//! let aoi = store.create(&draft).await?; // failures are also returned
//!
//! let active = store.read(|state| state.iter().filter(|a| a.is_active).count());
//! ```
//!
//! Operations may overlap; results are merged in the order they resolve.

pub mod action;
pub mod error;
pub mod remote;
pub mod resource;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory};
pub use remote::{Entity, RemoteResource};

// Error exports
pub use error::{OperationError, TransportError};

// Store exports
pub use store::{LoggingMiddleware, Middleware, Reducer, Store};

// Resource exports
pub use resource::{Operation, ResourceAction, ResourceState, ResourceStore};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory};
    pub use crate::error::{OperationError, TransportError};
    pub use crate::remote::{Entity, RemoteResource};
    pub use crate::resource::{Operation, ResourceState, ResourceStore};
    pub use crate::store::{LoggingMiddleware, Middleware, Store};
}
