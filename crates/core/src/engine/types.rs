//! Types for the ticket engine.

use serde::Serialize;
use thiserror::Error;

use crate::ticket::{Responsible, StoreError, Ticket};

/// Errors that can occur while handling a ticket operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// Id is not of the form `Case-NNN`.
    #[error("ID {0:?} is not in format Case-XXX where X represents a digit")]
    InvalidId(String),

    /// Details are empty.
    #[error("Description is empty, please fill all the details")]
    InvalidDetails,

    /// Name is empty or contains non-word characters.
    #[error("Name {0:?} is empty or is not alphanumeric")]
    InvalidName(String),

    /// Type literal is not PR or IR.
    #[error("Type {0:?} is not PR or IR")]
    InvalidType(String),

    /// State literal is unknown or not a legal update target.
    #[error("Invalid state {0:?}")]
    InvalidState(String),

    /// Responsible literal is unknown.
    #[error("Invalid assignee {0:?}")]
    InvalidResponsible(String),

    /// No open ticket with this id.
    #[error("Invalid id {0}: ticket not found")]
    NotFound(String),

    /// An open ticket already uses this id.
    #[error("ID {0} already exists")]
    AlreadyExists(String),

    /// Close attempted while the ticket is assigned above L1.
    #[error("Only L1 can close the ticket ({id} is assigned to {responsible})")]
    NotL1 { id: String, responsible: Responsible },

    /// Ticket store failure.
    #[error("ticket store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl TicketError {
    /// Returns true for failures caused by the backing store rather than the request.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, TicketError::Store(_))
    }
}

/// Raw input for a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub id: String,
    pub name: String,
    pub details: String,
    pub ticket_type: String,
}

impl CreateForm {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        details: impl Into<String>,
        ticket_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            details: details.into(),
            ticket_type: ticket_type.into(),
        }
    }
}

/// Raw input for an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateForm {
    pub id: String,
    pub state: String,
    pub responsible: String,
}

impl UpdateForm {
    pub fn new(
        id: impl Into<String>,
        state: impl Into<String>,
        responsible: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            state: state.into(),
            responsible: responsible.into(),
        }
    }
}

/// Action chosen from the main menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Create,
    Update,
    Close,
    Search,
    Show,
    AgingReport,
    Quit,
    /// Anything that is not a known menu code.
    Invalid(String),
}

impl MenuAction {
    /// Map a menu selection code (`1`..`7`) to an action.
    pub fn from_selection(selection: &str) -> Self {
        match selection.trim() {
            "1" => MenuAction::Create,
            "2" => MenuAction::Update,
            "3" => MenuAction::Close,
            "4" => MenuAction::Search,
            "5" => MenuAction::Show,
            "6" => MenuAction::AgingReport,
            "7" => MenuAction::Quit,
            other => MenuAction::Invalid(other.to_string()),
        }
    }
}

/// Tickets returned by one aging query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgingBucket {
    pub count: usize,
    pub tickets: Vec<Ticket>,
}

impl From<Vec<Ticket>> for AgingBucket {
    fn from(tickets: Vec<Ticket>) -> Self {
        Self {
            count: tickets.len(),
            tickets,
        }
    }
}

/// The TAR-3 aging report: stale NEW, stale ASSIGNED and stale tickets overall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgingReport {
    pub new: AgingBucket,
    pub assigned: AgingBucket,
    pub all: AgingBucket,
}

impl AgingReport {
    /// Look up a bucket by its report key: `new`, `assigned` or `all`.
    pub fn bucket(&self, key: &str) -> Option<&AgingBucket> {
        match key {
            "new" => Some(&self.new),
            "assigned" => Some(&self.assigned),
            "all" => Some(&self.all),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new.count == 0 && self.assigned.count == 0 && self.all.count == 0
    }
}

/// Outcome of an engine operation, handed to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Created(Ticket),
    Updated(Ticket),
    Closed(Ticket),
    /// A single ticket looked up by id.
    Found(Ticket),
    SearchResults {
        keyword: String,
        tickets: Vec<Ticket>,
    },
    KeywordNotFound(String),
    Aging(AgingReport),
    InvalidSelection(String),
    /// The operation was refused or failed; nothing was changed.
    Rejected(TicketError),
}
