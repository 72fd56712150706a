//! Call-recording gateway wrapper.
//!
//! Wraps any [`EntityStore`] and logs which operations reached it. Used to
//! observe that a rejected operation issued no mutating call at all.

use std::sync::{Mutex, MutexGuard, PoisonError};

use stockroom_core::Entity;

use super::{EntityStore, StoreError};

/// Gateway operation kinds, in the order they were issued.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Get,
    List,
    Insert,
    UpdateFields,
    Delete,
    DeleteWhere,
    DeleteAll,
}

impl StoreCall {
    pub fn is_mutation(self) -> bool {
        !matches!(self, StoreCall::Get | StoreCall::List)
    }
}

#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<StoreCall>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call issued so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.log().clone()
    }

    pub fn mutations(&self) -> usize {
        self.calls().into_iter().filter(|c| c.is_mutation()).count()
    }

    pub fn reset(&self) {
        self.log().clear();
    }

    fn record(&self, call: StoreCall) {
        self.log().push(call);
    }

    // A panic elsewhere while holding the log leaves the entries intact.
    fn log(&self) -> MutexGuard<'_, Vec<StoreCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E, S> EntityStore<E> for RecordingStore<S>
where
    E: Entity,
    S: EntityStore<E>,
{
    fn get(&self, id: &E::Id) -> Result<E, StoreError> {
        self.record(StoreCall::Get);
        self.inner.get(id)
    }

    fn list(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError> {
        self.record(StoreCall::List);
        self.inner.list(filter)
    }

    fn insert(&self, entity: E) -> Result<E, StoreError> {
        self.record(StoreCall::Insert);
        self.inner.insert(entity)
    }

    fn update_fields(&self, id: &E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        self.record(StoreCall::UpdateFields);
        self.inner.update_fields(id, patch)
    }

    fn delete(&self, id: &E::Id) -> Result<bool, StoreError> {
        self.record(StoreCall::Delete);
        self.inner.delete(id)
    }

    fn delete_where(&self, filter: &E::Filter) -> Result<usize, StoreError> {
        self.record(StoreCall::DeleteWhere);
        self.inner.delete_where(filter)
    }

    fn delete_all(&self) -> Result<bool, StoreError> {
        self.record(StoreCall::DeleteAll);
        self.inner.delete_all()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use stockroom_auth::{Role, User, UserFilter};
    use stockroom_core::Username;

    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn keeps_recording_after_a_poisoned_log() {
        let store: Arc<RecordingStore<InMemoryStore<User>>> =
            Arc::new(RecordingStore::new(InMemoryStore::new()));
        let gateway: &dyn EntityStore<User> = &*store;
        let bob = Username::new("bob").unwrap();
        assert!(gateway.get(&bob).is_err());

        let poisoner = Arc::clone(&store);
        let joined = thread::spawn(move || {
            let _guard = poisoner.calls.lock().unwrap();
            panic!("test thread died holding the log");
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(gateway.list(&UserFilter::Role(Role::Admin)), Ok(vec![]));
        assert_eq!(store.calls(), vec![StoreCall::Get, StoreCall::List]);
        assert_eq!(store.mutations(), 0);

        store.reset();
        assert!(store.calls().is_empty());
    }
}
