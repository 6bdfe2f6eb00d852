//! Scripted presenter for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::{CreateForm, MenuAction, Presenter, Report, UpdateForm};

#[derive(Debug, Default)]
struct Script {
    menu: VecDeque<MenuAction>,
    creates: VecDeque<CreateForm>,
    updates: VecDeque<UpdateForm>,
    ids: VecDeque<String>,
    keywords: VecDeque<String>,
    reports: Vec<Report>,
}

/// Presenter that replays scripted input and records every report.
///
/// Provides controllable behavior for testing:
/// - Queue menu actions and prompt answers
/// - Inspect the reports the engine produced
///
/// When the menu script runs out the presenter answers [`MenuAction::Quit`],
/// and empty prompt queues answer `None`. Clones share the same script.
///
/// # Example
///
/// ```rust,ignore
/// use tms_core::testing::RecordingPresenter;
///
/// let presenter = RecordingPresenter::new();
/// presenter.push_menu([MenuAction::Search]);
/// presenter.push_keyword("printer");
///
/// let engine = TicketEngine::new(store, presenter.clone());
/// engine.run();
///
/// assert_eq!(presenter.reports().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    script: Arc<Mutex<Script>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue main menu selections.
    pub fn push_menu(&self, actions: impl IntoIterator<Item = MenuAction>) {
        self.script().menu.extend(actions);
    }

    /// Queue an answer for the create prompt.
    pub fn push_create(&self, form: CreateForm) {
        self.script().creates.push_back(form);
    }

    /// Queue an answer for the update prompt.
    pub fn push_update(&self, form: UpdateForm) {
        self.script().updates.push_back(form);
    }

    /// Queue an answer for the close and show prompts.
    pub fn push_id(&self, id: impl Into<String>) {
        self.script().ids.push_back(id.into());
    }

    /// Queue an answer for the search prompt.
    pub fn push_keyword(&self, keyword: impl Into<String>) {
        self.script().keywords.push_back(keyword.into());
    }

    /// All reports received so far, oldest first.
    pub fn reports(&self) -> Vec<Report> {
        self.script().reports.clone()
    }

    /// The most recent report.
    pub fn last_report(&self) -> Option<Report> {
        self.script().reports.last().cloned()
    }

    /// Forget recorded reports.
    pub fn clear_reports(&self) {
        self.script().reports.clear();
    }
}

impl Presenter for RecordingPresenter {
    fn main_menu(&self) -> MenuAction {
        self.script().menu.pop_front().unwrap_or(MenuAction::Quit)
    }

    fn prompt_create(&self) -> Option<CreateForm> {
        self.script().creates.pop_front()
    }

    fn prompt_update(&self) -> Option<UpdateForm> {
        self.script().updates.pop_front()
    }

    fn prompt_close(&self) -> Option<String> {
        self.script().ids.pop_front()
    }

    fn prompt_search(&self) -> Option<String> {
        self.script().keywords.pop_front()
    }

    fn prompt_show(&self) -> Option<String> {
        self.script().ids.pop_front()
    }

    fn report(&self, report: Report) {
        self.script().reports.push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_script_quits() {
        let presenter = RecordingPresenter::new();
        assert_eq!(presenter.main_menu(), MenuAction::Quit);
        assert!(presenter.prompt_create().is_none());
        assert!(presenter.prompt_search().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let presenter = RecordingPresenter::new();
        let handle = presenter.clone();

        presenter.report(Report::KeywordNotFound("x".to_string()));

        assert_eq!(handle.reports().len(), 1);
        handle.clear_reports();
        assert!(presenter.last_report().is_none());
    }

    #[test]
    fn test_ids_are_consumed_in_order() {
        let presenter = RecordingPresenter::new();
        presenter.push_id("Case-001");
        presenter.push_id("Case-002");

        assert_eq!(presenter.prompt_close().as_deref(), Some("Case-001"));
        assert_eq!(presenter.prompt_show().as_deref(), Some("Case-002"));
        assert!(presenter.prompt_close().is_none());
    }
}
