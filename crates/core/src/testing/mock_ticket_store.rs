//! Mock ticket store for testing.

use std::sync::{Mutex, MutexGuard};

use crate::ticket::{InMemoryTicketStore, StoreError, Ticket, TicketStore};

/// Ticket store that records every call and can be told to fail.
///
/// Successful calls are served by an [`InMemoryTicketStore`].
#[derive(Debug, Default)]
pub struct MockTicketStore {
    inner: InMemoryTicketStore,
    calls: Mutex<Vec<&'static str>>,
    failure: Mutex<Option<StoreError>>,
}

impl MockTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: StoreError) {
        *lock(&self.failure) = Some(error);
    }

    /// Stop injecting failures.
    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: &'static str) -> Result<(), StoreError> {
        lock(&self.calls).push(call);
        match lock(&self.failure).as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl TicketStore for MockTicketStore {
    fn search(&self, keyword: &str) -> Result<Vec<Ticket>, StoreError> {
        self.record("search")?;
        self.inner.search(keyword)
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        self.record("get")?;
        self.inner.get(id)
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        self.record("exists")?;
        self.inner.exists(id)
    }

    fn create(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.record("create")?;
        self.inner.create(ticket)
    }

    fn update(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.record("update")?;
        self.inner.update(ticket)
    }

    fn close(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.record("close")?;
        self.inner.close(ticket)
    }

    fn old_new(&self) -> Result<Vec<Ticket>, StoreError> {
        self.record("old_new")?;
        self.inner.old_new()
    }

    fn old_assigned(&self) -> Result<Vec<Ticket>, StoreError> {
        self.record("old_assigned")?;
        self.inner.old_assigned()
    }

    fn old_all(&self) -> Result<Vec<Ticket>, StoreError> {
        self.record("old_all")?;
        self.inner.old_all()
    }
}
