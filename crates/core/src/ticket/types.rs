//! Core ticket data types.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

/// Lifecycle state of a ticket.
///
/// State machine flow:
/// ```text
/// New -> Assigned -> Analysis -> Solved -> InDelivery -> Closed
/// ```
///
/// Updates may move an open ticket to any of the intermediate states,
/// regardless of where it currently is. `Closed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum State {
    New,
    Assigned,
    Analysis,
    Solved,
    InDelivery,
    Closed,
}

impl State {
    /// All states, in lifecycle order.
    pub const ALL: [State; 6] = [
        State::New,
        State::Assigned,
        State::Analysis,
        State::Solved,
        State::InDelivery,
        State::Closed,
    ];

    /// Returns the literal value used for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::New => "new",
            State::Assigned => "assigned",
            State::Analysis => "analysis",
            State::Solved => "solved",
            State::InDelivery => "in_delivery",
            State::Closed => "closed",
        }
    }

    /// Parse an exact literal value. Case-sensitive.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "new" => Some(State::New),
            "assigned" => Some(State::Assigned),
            "analysis" => Some(State::Analysis),
            "solved" => Some(State::Solved),
            "in_delivery" => Some(State::InDelivery),
            "closed" => Some(State::Closed),
            _ => None,
        }
    }

    /// Returns true if `value` is the literal of some state.
    pub fn has_value(value: &str) -> bool {
        Self::from_value(value).is_some()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Closed)
    }

    /// Returns true if an update may move a ticket into this state.
    ///
    /// `New` is only reachable through creation and `Closed` only through close.
    pub fn is_update_target(&self) -> bool {
        matches!(
            self,
            State::Assigned | State::Analysis | State::Solved | State::InDelivery
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of support request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TicketType {
    /// Problem report.
    #[serde(rename = "PR")]
    ProblemReport,
    /// Information request.
    #[serde(rename = "IR")]
    InformationRequest,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::ProblemReport => "PR",
            TicketType::InformationRequest => "IR",
        }
    }

    /// Parse an exact literal value. Case-sensitive.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "PR" => Some(TicketType::ProblemReport),
            "IR" => Some(TicketType::InformationRequest),
            _ => None,
        }
    }

    pub fn has_value(value: &str) -> bool {
        Self::from_value(value).is_some()
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation tier currently handling a ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Responsible {
    L1,
    L2,
    L3,
}

impl Responsible {
    pub fn as_str(&self) -> &'static str {
        match self {
            Responsible::L1 => "L1",
            Responsible::L2 => "L2",
            Responsible::L3 => "L3",
        }
    }

    /// Parse an exact literal value. Case-sensitive.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "L1" => Some(Responsible::L1),
            "L2" => Some(Responsible::L2),
            "L3" => Some(Responsible::L3),
            _ => None,
        }
    }

    pub fn has_value(value: &str) -> bool {
        Self::from_value(value).is_some()
    }

    /// Only first-level support may close tickets.
    pub fn can_close(&self) -> bool {
        matches!(self, Responsible::L1)
    }
}

impl fmt::Display for Responsible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A support ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Case identifier, `Case-NNN`.
    pub id: String,

    /// Customer or reporter name.
    pub name: String,

    /// Free-text description of the request.
    pub details: String,

    #[serde(rename = "type")]
    pub ticket_type: TicketType,

    pub state: State,

    pub responsible: Responsible,

    /// When the ticket was created. Never changes afterwards.
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a ticket stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        details: impl Into<String>,
        ticket_type: TicketType,
        state: State,
        responsible: Responsible,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            details: details.into(),
            ticket_type,
            state,
            responsible,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp (e.g. when loading from storage).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Elapsed time since creation, evaluated now.
    pub fn age(&self) -> TimeDelta {
        Utc::now() - self.created_at
    }

    /// Whole days elapsed since creation (truncated).
    pub fn age_days(&self) -> i64 {
        self.age().num_days()
    }

    /// Returns true if the ticket is at least `days` whole days old.
    pub fn is_at_least_days_old(&self, days: i64) -> bool {
        self.age_days() >= days
    }

    /// Case-sensitive substring match over id, name, details and the literal
    /// values of type, state and responsible.
    pub fn contains(&self, keyword: &str) -> bool {
        self.id.contains(keyword)
            || self.name.contains(keyword)
            || self.details.contains(keyword)
            || self.ticket_type.as_str().contains(keyword)
            || self.state.as_str().contains(keyword)
            || self.responsible.as_str().contains(keyword)
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }
}
