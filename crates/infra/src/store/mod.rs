//! Persistence gateway abstractions.
//!
//! The rule engine treats storage as an opaque collaborator exposing simple
//! CRUD per entity. Uniqueness of identifiers is the gateway's responsibility:
//! `insert` must reject a duplicate with [`StoreError::AlreadyExists`] even when
//! the caller's own pre-check raced with another writer.

pub mod entity_store;
pub mod recording;

pub use entity_store::{EntityStore, InMemoryStore, StoreError};
pub use recording::{RecordingStore, StoreCall};
