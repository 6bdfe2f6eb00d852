//! Ticket storage trait and types.

use thiserror::Error;

use crate::ticket::Ticket;

/// Whole-day age at which a NEW ticket is reported as stale.
pub const OLD_NEW_DAYS: i64 = 3;
/// Whole-day age at which an ASSIGNED ticket is reported as stale.
pub const OLD_ASSIGNED_DAYS: i64 = 10;
/// Whole-day age at which any open ticket is reported as stale.
pub const OLD_ANY_DAYS: i64 = 20;

/// Error type for ticket storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The backing collection lock was poisoned by a panicking holder.
    #[error("Ticket store lock poisoned")]
    Poisoned,

    /// A stored row could not be decoded into a ticket.
    #[error("Corrupt ticket row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Trait for ticket storage backends.
///
/// Only open tickets are visible through lookups, search and the aging
/// queries. Closed tickets are kept by the backend but never returned, so a
/// closed id can be reused by a later create.
pub trait TicketStore: Send + Sync {
    /// Case-sensitive substring search over id, name, details, type, state
    /// and responsible.
    fn search(&self, keyword: &str) -> Result<Vec<Ticket>, StoreError>;

    /// Get an open ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError>;

    /// Returns true if an open ticket with this ID exists.
    fn exists(&self, id: &str) -> Result<bool, StoreError>;

    /// Insert a new ticket. Returns false, without inserting, if the ID is
    /// already taken by an open ticket.
    fn create(&self, ticket: &Ticket) -> Result<bool, StoreError>;

    /// Persist the state and responsible of an existing ticket.
    /// Returns false if no open ticket has this ID.
    fn update(&self, ticket: &Ticket) -> Result<bool, StoreError>;

    /// Mark an existing ticket closed. Returns false if no open ticket has
    /// this ID.
    fn close(&self, ticket: &Ticket) -> Result<bool, StoreError>;

    /// NEW tickets at least [`OLD_NEW_DAYS`] old.
    fn old_new(&self) -> Result<Vec<Ticket>, StoreError>;

    /// ASSIGNED tickets at least [`OLD_ASSIGNED_DAYS`] old.
    fn old_assigned(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Open tickets in any state at least [`OLD_ANY_DAYS`] old.
    fn old_all(&self) -> Result<Vec<Ticket>, StoreError>;
}
