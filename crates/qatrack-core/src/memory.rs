//! In-process collaborator and capability doubles.
//!
//! [`InMemoryApi`] behaves like the HTTP collaborator: ids are `max + 1`
//! within their collection, deleting a heading drops its items, completing
//! archives the session and starts a fresh one from the default checklist.
//! Every call is recorded as an [`Endpoint`] before it is applied, so tests
//! can assert on exactly what would have gone over the wire.

use std::collections::{BTreeMap, VecDeque};

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::api::{Endpoint, SessionApi};
use crate::error::ApiError;
use crate::model::{
    Bug, BugId, Heading, HeadingId, HistoryEntry, HistoryId, Item, ItemId, Note, NoteId, Session,
};
use crate::sync::{Confirm, Notice, NoticeLevel, Pane, Surface};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct InMemoryApi {
    session: Session,
    history: Vec<HistoryEntry>,
    default_checklist: Vec<Heading>,
    requests: Vec<Endpoint>,
    failures: VecDeque<Option<ApiError>>,
    now: Option<NaiveDateTime>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `session` as the working state.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    /// Checklist restored after complete and reset.
    #[must_use]
    pub fn with_default_checklist(mut self, checklist: Vec<Heading>) -> Self {
        self.session.checklist.clone_from(&checklist);
        self.default_checklist = checklist;
        self
    }

    /// Pin the clock used for `created_at` stamps.
    pub fn set_now(&mut self, now: NaiveDateTime) {
        self.now = Some(now);
    }

    /// Make the next call fail with `err` (after it has been recorded).
    pub fn fail_next(&mut self, err: ApiError) {
        self.failures.push_back(Some(err));
    }

    /// Let the next call through ahead of any queued failure.
    pub fn pass_next(&mut self) {
        self.failures.push_back(None);
    }

    /// Server-side state, bypassing the API.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn requests(&self) -> &[Endpoint] {
        &self.requests
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    fn begin(&mut self, endpoint: Endpoint) -> Result<(), ApiError> {
        self.requests.push(endpoint);
        self.failures.pop_front().flatten().map_or(Ok(()), Err)
    }

    fn timestamp(&self) -> String {
        self.now
            .unwrap_or_else(|| Local::now().naive_local())
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    fn fresh_session(&self) -> Session {
        Session {
            checklist: self.default_checklist.clone(),
            ..Session::default()
        }
    }

    fn heading_mut(&mut self, id: HeadingId) -> Option<&mut Heading> {
        self.session.checklist.iter_mut().find(|h| h.id == id)
    }
}

fn next_id<T>(existing: &[T], id: impl Fn(&T) -> u64) -> u64 {
    existing.iter().map(id).max().unwrap_or(0) + 1
}

/// Server-side field checks mirror the client's so direct callers get a 400.
fn require(value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::Status(400))
    } else {
        Ok(trimmed.to_string())
    }
}

impl SessionApi for InMemoryApi {
    fn fetch_session(&mut self) -> Result<Session, ApiError> {
        self.begin(Endpoint::fetch_session())?;
        Ok(self.session.clone())
    }

    fn save_session_info(
        &mut self,
        website: &str,
        start_date: NaiveDate,
    ) -> Result<Session, ApiError> {
        self.begin(Endpoint::save_session_info(website, start_date))?;
        self.session.target_website = website.to_string();
        self.session.start_date = Some(start_date);
        Ok(self.session.clone())
    }

    fn complete_session(&mut self, end_date: NaiveDate) -> Result<(), ApiError> {
        self.begin(Endpoint::complete_session(end_date))?;
        if self.session.website().is_none() {
            return Err(ApiError::Status(400));
        }
        let completed_at = self.timestamp();
        let fresh = self.fresh_session();
        let archived = std::mem::replace(&mut self.session, fresh);
        let id = HistoryId(next_id(&self.history, |e| e.id.get()));
        self.history.push(HistoryEntry {
            id,
            target_website: archived.target_website,
            start_date: archived.start_date,
            end_date: Some(end_date),
            completed_at,
            checklist: archived.checklist,
            notes: archived.notes,
            bugs: archived.bugs,
        });
        Ok(())
    }

    fn reset_session(&mut self) -> Result<(), ApiError> {
        self.begin(Endpoint::reset_session())?;
        self.session = self.fresh_session();
        Ok(())
    }

    fn set_item_checked(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        checked: bool,
    ) -> Result<(), ApiError> {
        self.begin(Endpoint::set_item_checked(heading, item, checked))?;
        if let Some(found) = self.session.item_mut(heading, item) {
            found.checked = checked;
        }
        Ok(())
    }

    fn create_heading(&mut self, title: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::create_heading(title))?;
        let title = require(title)?;
        let id = HeadingId(next_id(&self.session.checklist, |h| h.id.get()));
        self.session.checklist.push(Heading {
            id,
            title,
            items: Vec::new(),
        });
        Ok(())
    }

    fn update_heading(&mut self, id: HeadingId, title: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::update_heading(id, title))?;
        let title = require(title)?;
        if let Some(heading) = self.heading_mut(id) {
            heading.title = title;
        }
        Ok(())
    }

    fn delete_heading(&mut self, id: HeadingId) -> Result<(), ApiError> {
        self.begin(Endpoint::delete_heading(id))?;
        self.session.checklist.retain(|h| h.id != id);
        Ok(())
    }

    fn create_item(&mut self, heading: HeadingId, text: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::create_item(heading, text))?;
        let text = require(text)?;
        // The collaborator answers 500 when the heading is gone.
        let target = self.heading_mut(heading).ok_or(ApiError::Status(500))?;
        let id = ItemId(next_id(&target.items, |i| i.id.get()));
        target.items.push(Item {
            id,
            text,
            checked: false,
        });
        Ok(())
    }

    fn update_item(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        text: &str,
    ) -> Result<(), ApiError> {
        self.begin(Endpoint::update_item(heading, item, text))?;
        let text = require(text)?;
        if let Some(found) = self.session.item_mut(heading, item) {
            found.text = text;
        }
        Ok(())
    }

    fn delete_item(&mut self, heading: HeadingId, item: ItemId) -> Result<(), ApiError> {
        self.begin(Endpoint::delete_item(heading, item))?;
        if let Some(target) = self.heading_mut(heading) {
            target.items.retain(|i| i.id != item);
        }
        Ok(())
    }

    fn create_note(&mut self, text: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::create_note(text))?;
        let text = require(text)?;
        let id = NoteId(next_id(&self.session.notes, |n| n.id.get()));
        let created_at = self.timestamp();
        self.session.notes.push(Note {
            id,
            text,
            created_at,
        });
        Ok(())
    }

    fn update_note(&mut self, id: NoteId, text: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::update_note(id, text))?;
        let text = require(text)?;
        if let Some(note) = self.session.notes.iter_mut().find(|n| n.id == id) {
            note.text = text;
        }
        Ok(())
    }

    fn delete_note(&mut self, id: NoteId) -> Result<(), ApiError> {
        self.begin(Endpoint::delete_note(id))?;
        self.session.notes.retain(|n| n.id != id);
        Ok(())
    }

    fn create_bug(&mut self, title: &str, description: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::create_bug(title, description))?;
        let title = require(title)?;
        let description = require(description)?;
        let id = BugId(next_id(&self.session.bugs, |b| b.id.get()));
        let created_at = self.timestamp();
        self.session.bugs.push(Bug {
            id,
            title,
            description,
            created_at,
        });
        Ok(())
    }

    fn update_bug(&mut self, id: BugId, title: &str, description: &str) -> Result<(), ApiError> {
        self.begin(Endpoint::update_bug(id, title, description))?;
        let title = require(title)?;
        let description = require(description)?;
        if let Some(bug) = self.session.bugs.iter_mut().find(|b| b.id == id) {
            bug.title = title;
            bug.description = description;
        }
        Ok(())
    }

    fn delete_bug(&mut self, id: BugId) -> Result<(), ApiError> {
        self.begin(Endpoint::delete_bug(id))?;
        self.session.bugs.retain(|b| b.id != id);
        Ok(())
    }

    fn list_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.begin(Endpoint::list_history())?;
        Ok(self.history.clone())
    }

    fn delete_history_entry(&mut self, id: HistoryId) -> Result<(), ApiError> {
        self.begin(Endpoint::delete_history_entry(id))?;
        self.history.retain(|entry| entry.id != id);
        Ok(())
    }
}

/// Confirmation double: answers from a script, then a fallback.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    fallback: bool,
    prompts: Vec<String>,
}

impl ScriptedConfirm {
    /// Answer every prompt with `answer`.
    #[must_use]
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    /// Answer prompts in order, then decline.
    #[must_use]
    pub fn answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}

/// Surface double that keeps every notice and the latest markup per pane.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    notices: Vec<Notice>,
    panes: BTreeMap<Pane, String>,
    renders: Vec<Pane>,
}

impl RecordingSurface {
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect()
    }

    /// Latest markup rendered into `pane`.
    #[must_use]
    pub fn pane(&self, pane: Pane) -> Option<&str> {
        self.panes.get(&pane).map(String::as_str)
    }

    /// Panes in the order they were rendered.
    #[must_use]
    pub fn renders(&self) -> &[Pane] {
        &self.renders
    }

    pub fn clear(&mut self) {
        self.notices.clear();
        self.renders.clear();
    }
}

impl Surface for RecordingSurface {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn render(&mut self, pane: Pane, markup: &str) {
        self.renders.push(pane);
        self.panes.insert(pane, markup.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;

    fn heading(id: u64, title: &str) -> Heading {
        Heading {
            id: HeadingId(id),
            title: title.into(),
            items: Vec::new(),
        }
    }

    #[test]
    fn ids_are_max_plus_one_not_count_plus_one() {
        let mut api = InMemoryApi::with_session(Session {
            checklist: vec![heading(4, "a"), heading(9, "b")],
            ..Session::default()
        });
        api.create_heading("c").expect("create succeeds");
        let ids: Vec<u64> = api.session().checklist.iter().map(|h| h.id.get()).collect();
        assert_eq!(ids, vec![4, 9, 10]);
    }

    #[test]
    fn item_ids_are_scoped_to_their_heading() {
        let mut api = InMemoryApi::with_session(Session {
            checklist: vec![heading(1, "a"), heading(2, "b")],
            ..Session::default()
        });
        api.create_item(HeadingId(1), "x").expect("create");
        api.create_item(HeadingId(2), "y").expect("create");
        assert_eq!(api.session().checklist[0].items[0].id, ItemId(1));
        assert_eq!(api.session().checklist[1].items[0].id, ItemId(1));
    }

    #[test]
    fn create_item_under_missing_heading_is_server_error() {
        let mut api = InMemoryApi::new();
        assert_eq!(
            api.create_item(HeadingId(42), "x"),
            Err(ApiError::Status(500))
        );
    }

    #[test]
    fn failures_are_recorded_then_returned() {
        let mut api = InMemoryApi::new();
        api.fail_next(ApiError::Status(503));
        assert_eq!(api.create_note("n"), Err(ApiError::Status(503)));
        assert!(api.session().notes.is_empty());
        assert_eq!(api.requests().len(), 1);
        assert_eq!(api.requests()[0].method, Method::Post);

        api.create_note("n").expect("next call succeeds");
        assert_eq!(api.session().notes.len(), 1);
    }

    #[test]
    fn complete_archives_and_restores_default_checklist() {
        let mut api = InMemoryApi::new().with_default_checklist(vec![heading(1, "Smoke")]);
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        api.save_session_info("example.com", day).expect("info");
        api.create_note("seen").expect("note");
        api.complete_session(day).expect("complete");

        assert_eq!(api.history().len(), 1);
        assert_eq!(api.history()[0].target_website, "example.com");
        assert_eq!(api.history()[0].notes.len(), 1);
        assert!(api.session().website().is_none());
        assert!(api.session().notes.is_empty());
        assert_eq!(api.session().checklist.len(), 1);
    }

    #[test]
    fn scripted_confirm_falls_back_after_script() {
        let mut confirm = ScriptedConfirm::answers([true]);
        assert!(confirm.confirm("first"));
        assert!(!confirm.confirm("second"));
        assert_eq!(confirm.prompts(), ["first", "second"]);
    }
}
