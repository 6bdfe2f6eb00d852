//! In-memory ticket store.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{
    State, StoreError, Ticket, TicketStore, OLD_ANY_DAYS, OLD_ASSIGNED_DAYS, OLD_NEW_DAYS,
};

#[derive(Debug, Default)]
struct Backlog {
    /// Open tickets, in creation order.
    open: Vec<Ticket>,
    /// Tickets moved out of the backlog by close.
    closed: Vec<Ticket>,
}

impl Backlog {
    fn position(&self, id: &str) -> Option<usize> {
        self.open.iter().position(|t| t.id == id)
    }
}

/// Ticket store that keeps everything in RAM.
///
/// All data is lost when the instance is dropped. Closing a ticket moves it
/// from the open backlog into a separate closed list.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    backlog: Mutex<Backlog>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets that have been closed, in closing order.
    pub fn closed_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.lock()?.closed.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Backlog>, StoreError> {
        self.backlog.lock().map_err(|_| StoreError::Poisoned)
    }

    fn filter_open<F>(&self, predicate: F) -> Result<Vec<Ticket>, StoreError>
    where
        F: Fn(&Ticket) -> bool,
    {
        let backlog = self.lock()?;
        Ok(backlog
            .open
            .iter()
            .filter(|t| predicate(t))
            .cloned()
            .collect())
    }
}

impl TicketStore for InMemoryTicketStore {
    fn search(&self, keyword: &str) -> Result<Vec<Ticket>, StoreError> {
        self.filter_open(|t| t.contains(keyword))
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let backlog = self.lock()?;
        Ok(backlog.open.iter().find(|t| t.id == id).cloned())
    }

    fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.position(id).is_some())
    }

    fn create(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut backlog = self.lock()?;
        if backlog.position(&ticket.id).is_some() {
            debug!("Refusing duplicate ticket id {}", ticket.id);
            return Ok(false);
        }
        backlog.open.push(ticket.clone());
        Ok(true)
    }

    fn update(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut backlog = self.lock()?;
        let Some(idx) = backlog.position(&ticket.id) else {
            return Ok(false);
        };
        let stored = &mut backlog.open[idx];
        stored.state = ticket.state;
        stored.responsible = ticket.responsible;
        Ok(true)
    }

    fn close(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut backlog = self.lock()?;
        let Some(idx) = backlog.position(&ticket.id) else {
            return Ok(false);
        };
        let mut closed = backlog.open.remove(idx);
        closed.state = State::Closed;
        backlog.closed.push(closed);
        Ok(true)
    }

    fn old_new(&self) -> Result<Vec<Ticket>, StoreError> {
        self.filter_open(|t| t.state == State::New && t.is_at_least_days_old(OLD_NEW_DAYS))
    }

    fn old_assigned(&self) -> Result<Vec<Ticket>, StoreError> {
        self.filter_open(|t| {
            t.state == State::Assigned && t.is_at_least_days_old(OLD_ASSIGNED_DAYS)
        })
    }

    fn old_all(&self) -> Result<Vec<Ticket>, StoreError> {
        self.filter_open(|t| t.is_at_least_days_old(OLD_ANY_DAYS))
    }
}
