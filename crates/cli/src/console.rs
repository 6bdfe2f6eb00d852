//! Line-oriented console front end.

use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::warn;

use tms_core::{
    AgingBucket, AgingReport, CreateForm, MenuAction, Presenter, Report, Ticket, TicketError,
    UpdateForm,
};

const MENU: &str = "
1. Create a ticket
2. Update a ticket
3. Close a ticket
4. Search keyword
5. Display issue
6. Get old tickets (TAR-3)
7. Quit
";

const TICKET_SEPARATOR: &str = "-----------------------";
const SECTION_SEPARATOR: &str = "=======================";

/// Console presenter reading answers line by line from `R` and writing to `W`.
///
/// End of input is treated as a cancelled prompt, and as Quit at the menu.
pub struct ConsolePresenter<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl ConsolePresenter<StdinLock<'static>, Stdout> {
    /// Presenter bound to the process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePresenter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Consume the presenter, returning the output sink.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn write(&self, text: &str) {
        let mut output = self.output.borrow_mut();
        if let Err(e) = output.write_all(text.as_bytes()).and_then(|_| output.flush()) {
            warn!("Failed to write to console: {}", e);
        }
    }

    /// Print `label` and read one line, without its line terminator.
    ///
    /// Only end of input yields `None`.
    fn ask(&self, label: &str) -> Option<String> {
        self.write(label);
        let mut line = Vec::new();
        match self.input.borrow_mut().read_until(b'\n', &mut line) {
            Ok(0) => None,
            // Undecodable bytes become U+FFFD and fail validation downstream
            Ok(_) => Some(
                String::from_utf8_lossy(&line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string(),
            ),
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Presenter for ConsolePresenter<R, W> {
    fn main_menu(&self) -> MenuAction {
        self.write(MENU);
        match self.ask("\nEnter your selection: ") {
            Some(selection) => MenuAction::from_selection(&selection),
            None => MenuAction::Quit,
        }
    }

    fn prompt_create(&self) -> Option<CreateForm> {
        let id = self.ask("Id: ")?;
        let name = self.ask("Customer name: ")?;
        let details = self.ask("Case description: ")?;
        let ticket_type = self.ask("Case type: ")?;
        Some(CreateForm::new(id, name, details, ticket_type))
    }

    fn prompt_update(&self) -> Option<UpdateForm> {
        let id = self.ask("Id: ")?;
        let state = self.ask("State: ")?;
        let responsible = self.ask("Assigned to: ")?;
        Some(UpdateForm::new(id, state, responsible))
    }

    fn prompt_close(&self) -> Option<String> {
        self.ask("Id: ")
    }

    fn prompt_search(&self) -> Option<String> {
        self.ask("Keyword: ")
    }

    fn prompt_show(&self) -> Option<String> {
        self.ask("Id: ")
    }

    fn report(&self, report: Report) {
        self.write(&render_report(&report));
    }
}

/// Multi-line description of one ticket.
pub fn render_ticket(ticket: &Ticket) -> String {
    format!(
        "Ticket id : {}\n\
         Ticket name : {}\n\
         Ticket details : {}\n\
         Ticket type : {}\n\
         Ticket date : {}\n\
         Ticket state : {}\n\
         Ticket responsible : {}\n",
        ticket.id,
        ticket.name,
        ticket.details,
        ticket.ticket_type,
        ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ticket.state,
        ticket.responsible,
    )
}

fn render_bucket(out: &mut String, title: &str, bucket: &AgingBucket, separator: &str) {
    out.push_str(&format!("{} {}:\n", bucket.count, title));
    for ticket in &bucket.tickets {
        out.push_str(&render_ticket(ticket));
        out.push_str(separator);
        out.push('\n');
    }
}

fn render_aging(report: &AgingReport) -> String {
    let mut out = String::new();
    render_bucket(&mut out, "old NEW tickets", &report.new, TICKET_SEPARATOR);
    render_bucket(&mut out, "old ASSIGNED tickets", &report.assigned, TICKET_SEPARATOR);
    render_bucket(&mut out, "old tickets", &report.all, SECTION_SEPARATOR);
    out
}

fn render_rejection(err: &TicketError) -> String {
    match err {
        TicketError::Store(_) => format!("Ticket store unavailable, nothing was changed ({})\n", err),
        _ => format!("{}\n", err),
    }
}

/// Text shown to the user for an engine report.
pub fn render_report(report: &Report) -> String {
    match report {
        Report::Created(ticket) => format!("Ticket created: {}\n", ticket.id),
        Report::Updated(ticket) => format!(
            "Assign ticket {} to {} to state {}\n",
            ticket.id, ticket.responsible, ticket.state
        ),
        Report::Closed(ticket) => format!("Close ticket {}\n", ticket.id),
        Report::Found(ticket) => render_ticket(ticket),
        Report::SearchResults { keyword, tickets } => {
            let mut out = format!("Searched keyword: {}\n", keyword);
            for ticket in tickets {
                out.push_str(&render_ticket(ticket));
                out.push_str(TICKET_SEPARATOR);
                out.push('\n');
            }
            out.push_str(&format!("Total tickets: {}\n{}\n", tickets.len(), SECTION_SEPARATOR));
            out
        }
        Report::KeywordNotFound(keyword) => format!("Keyword {} not found\n", keyword),
        Report::Aging(report) => render_aging(report),
        Report::InvalidSelection(_) => "Invalid selection\n".to_string(),
        Report::Rejected(err) => render_rejection(err),
    }
}
