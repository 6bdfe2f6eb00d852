//! Ticket lifecycle engine.
//!
//! The engine turns raw user input into validated ticket operations:
//! - **Validation**: ids, names, details and enum literals are checked before
//!   any store call is made
//! - **Delegation**: accepted operations are forwarded to the injected
//!   [`TicketStore`](crate::ticket::TicketStore)
//! - **Reporting**: every outcome, success or rejection, goes to the injected
//!   [`Presenter`]

mod presenter;
mod runner;
mod types;
mod validation;

pub use presenter::Presenter;
pub use runner::TicketEngine;
pub use types::{
    AgingBucket, AgingReport, CreateForm, MenuAction, Report, TicketError, UpdateForm,
};
pub use validation::{is_valid_id, is_valid_name, validate_create, validate_update};
