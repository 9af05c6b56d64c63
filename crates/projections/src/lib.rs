//! Local projection layer: last-known copies of the store collections.
//!
//! Projections are disposable read models keyed by entity id, updated **only**
//! on confirmed mutation responses, never before the store has acknowledged
//! the write. A fresh session repopulates them through the store's list
//! endpoints.

pub mod set;
pub mod store;

pub use set::ProjectionSet;
pub use store::{InMemoryProjection, ProjectionStore};
