use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockroom_core::Entity;

/// Gateway failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    /// The patch was planned against a state the record no longer has.
    #[error("record was modified concurrently")]
    Conflict,

    /// Any other storage fault (connection, poisoned lock, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Keyed CRUD store for one entity type.
pub trait EntityStore<E: Entity>: Send + Sync {
    fn get(&self, id: &E::Id) -> Result<E, StoreError>;
    fn list(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError>;
    /// Fails with `AlreadyExists` when the identifier is taken.
    fn insert(&self, entity: E) -> Result<E, StoreError>;
    /// Fails with `Conflict` when the entity reports the patch as stale.
    fn update_fields(&self, id: &E::Id, patch: &E::Patch) -> Result<E, StoreError>;
    /// Fails with `NotFound` when nothing was stored under `id`.
    fn delete(&self, id: &E::Id) -> Result<bool, StoreError>;
    /// Returns how many records were removed.
    fn delete_where(&self, filter: &E::Filter) -> Result<usize, StoreError>;
    fn delete_all(&self) -> Result<bool, StoreError>;
}

impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    fn get(&self, id: &E::Id) -> Result<E, StoreError> {
        (**self).get(id)
    }

    fn list(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError> {
        (**self).list(filter)
    }

    fn insert(&self, entity: E) -> Result<E, StoreError> {
        (**self).insert(entity)
    }

    fn update_fields(&self, id: &E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        (**self).update_fields(id, patch)
    }

    fn delete(&self, id: &E::Id) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn delete_where(&self, filter: &E::Filter) -> Result<usize, StoreError> {
        (**self).delete_where(filter)
    }

    fn delete_all(&self) -> Result<bool, StoreError> {
        (**self).delete_all()
    }
}

/// In-memory store for tests/dev.
///
/// Records are kept in insertion order, so listings are deterministic.
#[derive(Debug)]
pub struct InMemoryStore<E> {
    inner: RwLock<Vec<E>>,
}

impl<E> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryStore<E> {
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Result<Self, StoreError>
    where
        E: Send + Sync,
    {
        let store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

impl<E> EntityStore<E> for InMemoryStore<E>
where
    E: Entity + Send + Sync,
{
    fn get(&self, id: &E::Id) -> Result<E, StoreError> {
        let records = self.inner.read().map_err(poisoned)?;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError> {
        let records = self.inner.read().map_err(poisoned)?;
        Ok(records.iter().filter(|r| r.matches(filter)).cloned().collect())
    }

    fn insert(&self, entity: E) -> Result<E, StoreError> {
        let mut records = self.inner.write().map_err(poisoned)?;
        if records.iter().any(|r| r.id() == entity.id()) {
            return Err(StoreError::AlreadyExists);
        }
        records.push(entity.clone());
        Ok(entity)
    }

    fn update_fields(&self, id: &E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        let mut records = self.inner.write().map_err(poisoned)?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound)?;
        if record.is_stale(patch) {
            return Err(StoreError::Conflict);
        }
        record.apply_patch(patch);
        Ok(record.clone())
    }

    fn delete(&self, id: &E::Id) -> Result<bool, StoreError> {
        let mut records = self.inner.write().map_err(poisoned)?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(true)
    }

    fn delete_where(&self, filter: &E::Filter) -> Result<usize, StoreError> {
        let mut records = self.inner.write().map_err(poisoned)?;
        let before = records.len();
        records.retain(|r| !r.matches(filter));
        Ok(before - records.len())
    }

    fn delete_all(&self) -> Result<bool, StoreError> {
        self.inner.write().map_err(poisoned)?.clear();
        Ok(true)
    }
}
