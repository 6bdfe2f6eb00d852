//! Ticket engine implementation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::ticket::{Responsible, State, StoreError, Ticket, TicketStore};

use super::presenter::Presenter;
use super::types::{AgingReport, MenuAction, Report, TicketError};
use super::validation::{validate_create, validate_update};

/// The ticket engine: validates requests, drives the store and reports
/// outcomes through the presenter.
pub struct TicketEngine<P: Presenter> {
    ticket_store: Arc<dyn TicketStore>,
    presenter: P,
}

impl<P: Presenter> TicketEngine<P> {
    /// Create a new engine over the given store and front end.
    pub fn new(ticket_store: Arc<dyn TicketStore>, presenter: P) -> Self {
        Self {
            ticket_store,
            presenter,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn ticket_store(&self) -> &Arc<dyn TicketStore> {
        &self.ticket_store
    }

    /// Report a failed operation and hand the error back to the caller.
    fn reject<T>(&self, err: TicketError) -> Result<T, TicketError> {
        if err.is_store_failure() {
            error!("Ticket store failure: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }
        self.presenter.report(Report::Rejected(err.clone()));
        Err(err)
    }

    /// Fetch an open ticket, reporting unknown ids.
    fn fetch(&self, id: &str) -> Result<Ticket, TicketError> {
        match self.ticket_store.get(id) {
            Ok(Some(ticket)) => Ok(ticket),
            Ok(None) => self.reject(TicketError::NotFound(id.to_string())),
            Err(e) => self.reject(e.into()),
        }
    }

    /// Create a ticket from raw input.
    ///
    /// New tickets always start in `new`, assigned to L1.
    pub fn create(
        &self,
        id: &str,
        name: &str,
        details: &str,
        ticket_type: &str,
    ) -> Result<Ticket, TicketError> {
        let ticket_type = match validate_create(id, name, details, ticket_type) {
            Ok(t) => t,
            Err(e) => return self.reject(e),
        };

        match self.ticket_store.exists(id) {
            Ok(false) => {}
            Ok(true) => return self.reject(TicketError::AlreadyExists(id.to_string())),
            Err(e) => return self.reject(e.into()),
        }

        let ticket = Ticket::new(id, name, details, ticket_type, State::New, Responsible::L1);
        match self.ticket_store.create(&ticket) {
            Ok(true) => {}
            Ok(false) => return self.reject(TicketError::AlreadyExists(id.to_string())),
            Err(e) => return self.reject(e.into()),
        }

        info!("Created ticket {} ({})", ticket.id, ticket.ticket_type);
        self.presenter.report(Report::Created(ticket.clone()));
        Ok(ticket)
    }

    /// Move an open ticket to a new state and assignee.
    ///
    /// Any intermediate state is accepted regardless of the current one.
    pub fn update(&self, id: &str, state: &str, responsible: &str) -> Result<Ticket, TicketError> {
        let (state, responsible) = match validate_update(state, responsible) {
            Ok(parsed) => parsed,
            Err(e) => return self.reject(e),
        };

        let mut ticket = self.fetch(id)?;
        debug!(
            "Updating ticket {}: {}/{} -> {}/{}",
            id, ticket.state, ticket.responsible, state, responsible
        );
        ticket.state = state;
        ticket.responsible = responsible;

        match self.ticket_store.update(&ticket) {
            Ok(true) => {}
            Ok(false) => return self.reject(TicketError::NotFound(id.to_string())),
            Err(e) => return self.reject(e.into()),
        }

        info!("Assigned ticket {} to {} in state {}", id, responsible, state);
        self.presenter.report(Report::Updated(ticket.clone()));
        Ok(ticket)
    }

    /// Close an open ticket. Only tickets held by L1 can be closed.
    pub fn close(&self, id: &str) -> Result<Ticket, TicketError> {
        let mut ticket = self.fetch(id)?;
        if !ticket.responsible.can_close() {
            return self.reject(TicketError::NotL1 {
                id: id.to_string(),
                responsible: ticket.responsible,
            });
        }

        ticket.state = State::Closed;
        match self.ticket_store.close(&ticket) {
            Ok(true) => {}
            Ok(false) => return self.reject(TicketError::NotFound(id.to_string())),
            Err(e) => return self.reject(e.into()),
        }

        info!("Closed ticket {}", id);
        self.presenter.report(Report::Closed(ticket.clone()));
        Ok(ticket)
    }

    /// Search open tickets by keyword. Returns true if anything matched.
    pub fn search(&self, keyword: &str) -> Result<bool, TicketError> {
        let tickets = match self.ticket_store.search(keyword) {
            Ok(tickets) => tickets,
            Err(e) => return self.reject(e.into()),
        };

        debug!("Search {:?} matched {} tickets", keyword, tickets.len());
        if tickets.is_empty() {
            self.presenter
                .report(Report::KeywordNotFound(keyword.to_string()));
            return Ok(false);
        }

        self.presenter.report(Report::SearchResults {
            keyword: keyword.to_string(),
            tickets,
        });
        Ok(true)
    }

    /// Look up and display a single ticket.
    pub fn show(&self, id: &str) -> Result<Ticket, TicketError> {
        let ticket = self.fetch(id)?;
        self.presenter.report(Report::Found(ticket.clone()));
        Ok(ticket)
    }

    /// Build the TAR-3 aging report from the three aging queries.
    pub fn aging_report(&self) -> Result<AgingReport, TicketError> {
        self.query_aging().or_else(|e| self.reject(e.into()))
    }

    fn query_aging(&self) -> Result<AgingReport, StoreError> {
        Ok(AgingReport {
            new: self.ticket_store.old_new()?.into(),
            assigned: self.ticket_store.old_assigned()?.into(),
            all: self.ticket_store.old_all()?.into(),
        })
    }

    /// Run the interactive menu loop until the user quits.
    ///
    /// A failed action has already been reported to the presenter, so the
    /// loop logs it and carries on.
    pub fn run(&self) {
        info!("Ticket engine started");
        loop {
            let outcome = match self.presenter.main_menu() {
                MenuAction::Create => self.presenter.prompt_create().map_or(Ok(()), |form| {
                    self.create(&form.id, &form.name, &form.details, &form.ticket_type)
                        .map(drop)
                }),
                MenuAction::Update => self.presenter.prompt_update().map_or(Ok(()), |form| {
                    self.update(&form.id, &form.state, &form.responsible).map(drop)
                }),
                MenuAction::Close => self
                    .presenter
                    .prompt_close()
                    .map_or(Ok(()), |id| self.close(&id).map(drop)),
                MenuAction::Search => self
                    .presenter
                    .prompt_search()
                    .map_or(Ok(()), |keyword| self.search(&keyword).map(drop)),
                MenuAction::Show => self
                    .presenter
                    .prompt_show()
                    .map_or(Ok(()), |id| self.show(&id).map(drop)),
                MenuAction::AgingReport => self
                    .aging_report()
                    .map(|report| self.presenter.report(Report::Aging(report))),
                MenuAction::Quit => break,
                MenuAction::Invalid(selection) => {
                    debug!("Invalid menu selection {:?}", selection);
                    self.presenter.report(Report::InvalidSelection(selection));
                    Ok(())
                }
            };
            if let Err(e) = outcome {
                debug!("Menu action failed: {}", e);
            }
        }
        info!("Ticket engine stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTicketStore, RecordingPresenter};
    use crate::ticket::{InMemoryTicketStore, TicketType};
    use crate::engine::{CreateForm, UpdateForm};

    fn engine_with(store: Arc<dyn TicketStore>) -> TicketEngine<RecordingPresenter> {
        TicketEngine::new(store, RecordingPresenter::new())
    }

    fn create_test_engine() -> TicketEngine<RecordingPresenter> {
        engine_with(Arc::new(InMemoryTicketStore::new()))
    }

    #[test]
    fn test_create_sets_initial_state() {
        let engine = create_test_engine();

        let ticket = engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();

        assert_eq!(ticket.state, State::New);
        assert_eq!(ticket.responsible, Responsible::L1);
        assert_eq!(ticket.ticket_type, TicketType::ProblemReport);
        assert_eq!(
            engine.presenter().last_report(),
            Some(Report::Created(ticket.clone()))
        );
        assert_eq!(engine.ticket_store().get("Case-001").unwrap(), Some(ticket));
    }

    #[test]
    fn test_create_invalid_id_never_touches_store() {
        let store = Arc::new(MockTicketStore::new());
        let engine = engine_with(store.clone());

        for id in ["Case-1", "Case-", "CASE-001", "Case-0012"] {
            let result = engine.create(id, "Bob", "x", "PR");
            assert_eq!(result, Err(TicketError::InvalidId(id.to_string())));
        }
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_create_invalid_type() {
        let store = Arc::new(MockTicketStore::new());
        let engine = engine_with(store.clone());

        let result = engine.create("Case-002", "Bob", "details", "XX");

        assert_eq!(result, Err(TicketError::InvalidType("XX".to_string())));
        assert_eq!(
            engine.presenter().last_report(),
            Some(Report::Rejected(TicketError::InvalidType("XX".to_string())))
        );
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_create_duplicate_id() {
        let engine = create_test_engine();

        assert!(engine.create("Case-001", "Alice", "printer jam", "PR").is_ok());
        let second = engine.create("Case-001", "Alice", "printer jam", "PR");

        assert_eq!(second, Err(TicketError::AlreadyExists("Case-001".to_string())));
        assert_eq!(engine.ticket_store().search("Case-001").unwrap().len(), 1);
    }

    #[test]
    fn test_update_rejects_invalid_targets_without_mutation() {
        let store = Arc::new(MockTicketStore::new());
        let engine = engine_with(store.clone());
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();
        store.clear_calls();

        for state in ["new", "closed", "done", "Assigned"] {
            let result = engine.update("Case-001", state, "L2");
            assert_eq!(result, Err(TicketError::InvalidState(state.to_string())));
        }
        let result = engine.update("Case-001", "analysis", "L4");
        assert_eq!(result, Err(TicketError::InvalidResponsible("L4".to_string())));

        assert!(store.calls().is_empty());
        let stored = store.get("Case-001").unwrap().unwrap();
        assert_eq!(stored.state, State::New);
        assert_eq!(stored.responsible, Responsible::L1);
    }

    #[test]
    fn test_update_unknown_ticket() {
        let engine = create_test_engine();

        let result = engine.update("Case-404", "assigned", "L2");

        assert_eq!(result, Err(TicketError::NotFound("Case-404".to_string())));
    }

    #[test]
    fn test_update_ignores_current_state() {
        let engine = create_test_engine();
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();

        // Jump forward, then back
        engine.update("Case-001", "in_delivery", "L3").unwrap();
        let ticket = engine.update("Case-001", "assigned", "L2").unwrap();

        assert_eq!(ticket.state, State::Assigned);
        assert_eq!(ticket.responsible, Responsible::L2);
    }

    #[test]
    fn test_close_requires_l1() {
        let engine = create_test_engine();
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();
        engine.update("Case-001", "solved", "L2").unwrap();

        let result = engine.close("Case-001");

        assert_eq!(
            result,
            Err(TicketError::NotL1 {
                id: "Case-001".to_string(),
                responsible: Responsible::L2,
            })
        );
        let stored = engine.ticket_store().get("Case-001").unwrap().unwrap();
        assert_eq!(stored.state, State::Solved);
    }

    #[test]
    fn test_close_unknown_ticket() {
        let engine = create_test_engine();
        assert_eq!(
            engine.close("Case-404"),
            Err(TicketError::NotFound("Case-404".to_string()))
        );
    }

    #[test]
    fn test_closed_ticket_is_gone() {
        let engine = create_test_engine();
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();

        let closed = engine.close("Case-001").unwrap();
        assert_eq!(closed.state, State::Closed);
        assert_eq!(engine.presenter().last_report(), Some(Report::Closed(closed)));

        assert_eq!(
            engine.close("Case-001"),
            Err(TicketError::NotFound("Case-001".to_string()))
        );
        assert_eq!(
            engine.update("Case-001", "assigned", "L1"),
            Err(TicketError::NotFound("Case-001".to_string()))
        );
    }

    #[test]
    fn test_search_reports_matches() {
        let engine = create_test_engine();
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();
        engine.create("Case-002", "Bob", "password reset", "IR").unwrap();

        assert!(engine.search("jam").unwrap());
        match engine.presenter().last_report() {
            Some(Report::SearchResults { keyword, tickets }) => {
                assert_eq!(keyword, "jam");
                assert_eq!(tickets.len(), 1);
                assert_eq!(tickets[0].id, "Case-001");
            }
            other => panic!("unexpected report: {:?}", other),
        }

        assert!(engine.search("Case-00").unwrap());
    }

    #[test]
    fn test_search_not_found() {
        let engine = create_test_engine();
        engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();

        assert!(!engine.search("JAM").unwrap());
        assert_eq!(
            engine.presenter().last_report(),
            Some(Report::KeywordNotFound("JAM".to_string()))
        );
    }

    #[test]
    fn test_show() {
        let engine = create_test_engine();
        let created = engine.create("Case-001", "Alice", "printer jam", "PR").unwrap();

        assert_eq!(engine.show("Case-001").unwrap(), created);
        assert_eq!(engine.presenter().last_report(), Some(Report::Found(created)));

        assert!(engine.show("Case-002").is_err());
        assert_eq!(
            engine.presenter().last_report(),
            Some(Report::Rejected(TicketError::NotFound("Case-002".to_string())))
        );
    }

    #[test]
    fn test_aging_report_buckets() {
        let store = Arc::new(InMemoryTicketStore::new());
        store.create(&fixtures::aged_ticket("Case-001", State::New, 3)).unwrap();
        store.create(&fixtures::aged_ticket("Case-002", State::New, 1)).unwrap();
        store.create(&fixtures::aged_ticket("Case-003", State::Assigned, 12)).unwrap();
        store.create(&fixtures::aged_ticket("Case-004", State::Solved, 40)).unwrap();
        let engine = engine_with(store);

        let report = engine.aging_report().unwrap();

        assert_eq!(report.new.count, 1);
        assert_eq!(report.new.tickets[0].id, "Case-001");
        assert_eq!(report.assigned.count, 1);
        assert_eq!(report.assigned.tickets[0].id, "Case-003");
        assert_eq!(report.all.count, 1);
        assert_eq!(report.all.tickets[0].id, "Case-004");
    }

    #[test]
    fn test_store_failure_is_reported_not_panicking() {
        let store = Arc::new(MockTicketStore::new());
        store.fail_with(StoreError::Database("disk I/O error".to_string()));
        let engine = engine_with(store);

        let result = engine.create("Case-001", "Alice", "printer jam", "PR");
        assert!(matches!(result, Err(TicketError::Store(_))));
        assert!(matches!(
            engine.presenter().last_report(),
            Some(Report::Rejected(TicketError::Store(_)))
        ));

        assert!(matches!(engine.search("x"), Err(TicketError::Store(_))));
        assert!(matches!(engine.close("Case-001"), Err(TicketError::Store(_))));
        assert!(matches!(engine.aging_report(), Err(TicketError::Store(_))));
    }

    #[test]
    fn test_run_dispatches_menu_actions() {
        let presenter = RecordingPresenter::new();
        presenter.push_create(CreateForm::new("Case-001", "Alice", "printer jam", "PR"));
        presenter.push_update(UpdateForm::new("Case-001", "analysis", "L2"));
        presenter.push_id("Case-001");
        presenter.push_keyword("printer");
        presenter.push_menu([
            MenuAction::Create,
            MenuAction::Update,
            MenuAction::Close,
            MenuAction::Search,
            MenuAction::Invalid("9".to_string()),
            MenuAction::AgingReport,
            MenuAction::Quit,
            // Never reached
            MenuAction::Create,
        ]);
        let engine = TicketEngine::new(Arc::new(InMemoryTicketStore::new()), presenter);

        engine.run();

        let reports = engine.presenter().reports();
        assert_eq!(reports.len(), 6);
        assert!(matches!(reports[0], Report::Created(_)));
        assert!(matches!(reports[1], Report::Updated(_)));
        assert!(matches!(reports[2], Report::Rejected(TicketError::NotL1 { .. })));
        assert!(matches!(reports[3], Report::SearchResults { .. }));
        assert_eq!(reports[4], Report::InvalidSelection("9".to_string()));
        assert!(matches!(reports[5], Report::Aging(_)));
    }

    #[test]
    fn test_run_skips_cancelled_prompts() {
        let presenter = RecordingPresenter::new();
        presenter.push_menu([MenuAction::Create, MenuAction::Close, MenuAction::Show]);
        let engine = TicketEngine::new(Arc::new(InMemoryTicketStore::new()), presenter);

        // Prompts have no scripted input and the menu runs out: quits
        engine.run();

        assert!(engine.presenter().reports().is_empty());
    }

    #[test]
    fn test_run_continues_after_failed_actions() {
        let store = Arc::new(MockTicketStore::new());
        store.fail_with(StoreError::Poisoned);
        let presenter = RecordingPresenter::new();
        presenter.push_create(CreateForm::new("bad", "Alice", "printer jam", "PR"));
        presenter.push_id("Case-404");
        presenter.push_menu([
            MenuAction::Create,
            MenuAction::Show,
            MenuAction::AgingReport,
            MenuAction::Invalid("0".to_string()),
        ]);
        let engine = TicketEngine::new(store, presenter);

        engine.run();

        let reports = engine.presenter().reports();
        assert_eq!(reports.len(), 4);
        assert_eq!(
            reports[0],
            Report::Rejected(TicketError::InvalidId("bad".to_string()))
        );
        assert!(matches!(reports[1], Report::Rejected(TicketError::Store(_))));
        assert!(matches!(reports[2], Report::Rejected(TicketError::Store(_))));
        assert_eq!(reports[3], Report::InvalidSelection("0".to_string()));
    }
}
