//! Presentation contract used by the engine.

use super::types::{CreateForm, MenuAction, Report, UpdateForm};

/// Front end the engine talks to: prompts for input and receives reports.
///
/// Prompts return `None` when the user cancels or input runs out; the engine
/// then skips the action.
pub trait Presenter {
    /// Show the main menu and return the chosen action.
    fn main_menu(&self) -> MenuAction;

    /// Ask for id, customer name, details and type of a new ticket.
    fn prompt_create(&self) -> Option<CreateForm>;

    /// Ask for id, target state and assignee of a ticket to update.
    fn prompt_update(&self) -> Option<UpdateForm>;

    /// Ask for the id of the ticket to close.
    fn prompt_close(&self) -> Option<String>;

    /// Ask for a search keyword.
    fn prompt_search(&self) -> Option<String>;

    /// Ask for the id of a ticket to display.
    fn prompt_show(&self) -> Option<String>;

    /// Present the outcome of an operation.
    fn report(&self, report: Report);
}
