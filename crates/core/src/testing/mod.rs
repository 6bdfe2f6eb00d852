//! Testing utilities and mock implementations.
//!
//! This module provides a scripted [`Presenter`](crate::engine::Presenter) and
//! an instrumented [`TicketStore`](crate::ticket::TicketStore), allowing the
//! engine to be driven end to end without a terminal or database.
//!
//! # Example
//!
//! ```rust,ignore
//! use tms_core::testing::{MockTicketStore, RecordingPresenter};
//!
//! let store = Arc::new(MockTicketStore::new());
//! let engine = TicketEngine::new(store.clone(), RecordingPresenter::new());
//!
//! engine.create("Case-1", "Bob", "x", "PR").unwrap_err();
//! assert!(store.calls().is_empty());
//! ```

mod mock_ticket_store;
mod recording_presenter;

pub use mock_ticket_store::MockTicketStore;
pub use recording_presenter::RecordingPresenter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeDelta, Utc};

    use crate::ticket::{Responsible, State, Ticket, TicketType};

    /// Create a fresh NEW/L1 problem report with reasonable defaults.
    pub fn ticket(id: &str) -> Ticket {
        Ticket::new(
            id,
            "Alice",
            "printer jam",
            TicketType::ProblemReport,
            State::New,
            Responsible::L1,
        )
    }

    /// Create a ticket in `state` created `days` days ago.
    pub fn aged_ticket(id: &str, state: State, days: i64) -> Ticket {
        let mut t = ticket(id).with_created_at(Utc::now() - TimeDelta::days(days));
        t.state = state;
        t
    }

    /// Create a ticket in `state` created `age` ago.
    pub fn ticket_aged_by(id: &str, state: State, age: TimeDelta) -> Ticket {
        let mut t = ticket(id).with_created_at(Utc::now() - age);
        t.state = state;
        t
    }
}
