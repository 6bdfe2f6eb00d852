//! Ticket model and storage backends.

mod memory_store;
mod sqlite_store;
mod store;
mod types;

pub use memory_store::InMemoryTicketStore;
pub use sqlite_store::SqliteTicketStore;
pub use store::{StoreError, TicketStore, OLD_ANY_DAYS, OLD_ASSIGNED_DAYS, OLD_NEW_DAYS};
pub use types::{Responsible, State, Ticket, TicketType};
