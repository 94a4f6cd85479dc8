//! The session synchronizer.
//!
//! Every mutation follows the same discipline:
//!
//! 1. validate input locally (no network call on failure),
//! 2. issue one collaborator call,
//! 3. on success, [`Synchronizer::refresh`] the whole snapshot and re-render,
//! 4. notify the surface of success or failure.
//!
//! The checked-state toggle is the one exception: it patches the local item
//! in place instead of refreshing.

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::action::{Action, saved_message};
use crate::api::SessionApi;
use crate::error::{ApiError, ErrorCode, SyncError};
use crate::modal::{ActiveModal, ModalForm};
use crate::model::{BugId, HeadingId, ItemId, NoteId, Session};
use crate::validate::{self, ValidationError};
use crate::view;

/// Interactive yes/no confirmation supplied by the interface layer.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Where notifications and rendered markup go.
pub trait Surface {
    fn notify(&mut self, notice: &Notice);
    fn render(&mut self, pane: Pane, markup: &str);
}

/// Views kept in step with the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pane {
    Checklist,
    Notes,
    Bugs,
}

impl Pane {
    pub const ALL: [Self; 3] = [Self::Checklist, Self::Notes, Self::Bugs];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checklist => "checklist",
            Self::Notes => "notes",
            Self::Bugs => "bugs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub code: Option<ErrorCode>,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub fn from_error(err: &SyncError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message(),
            code: Some(err.error_code()),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Result of an operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The collaborator accepted the call.
    Applied,
    /// The tester declined the confirmation; nothing was sent.
    Declined,
}

/// Owns the session snapshot and the editor state.
///
/// The snapshot is `None` until the first successful [`load`](Self::load).
/// After that it is always the last session the collaborator returned, or
/// that session with a single optimistic checked-state patch.
#[derive(Debug)]
pub struct Synchronizer<A, C, S> {
    api: A,
    confirm: C,
    surface: S,
    snapshot: Option<Session>,
    modal: ActiveModal,
}

impl<A: SessionApi, C: Confirm, S: Surface> Synchronizer<A, C, S> {
    pub const fn new(api: A, confirm: C, surface: S) -> Self {
        Self {
            api,
            confirm,
            surface,
            snapshot: None,
            modal: ActiveModal::Closed,
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> Option<&Session> {
        self.snapshot.as_ref()
    }

    /// Snapshot, or [`SyncError::NotLoaded`].
    pub const fn session(&self) -> Result<&Session, SyncError> {
        match &self.snapshot {
            Some(session) => Ok(session),
            None => Err(SyncError::NotLoaded),
        }
    }

    #[must_use]
    pub const fn active_modal(&self) -> ActiveModal {
        self.modal
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    pub const fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn confirmer(&self) -> &C {
        &self.confirm
    }

    pub fn into_parts(self) -> (A, C, S) {
        (self.api, self.confirm, self.surface)
    }

    // ── session lifecycle ───────────────────────────────────────────────────

    /// Fetch the full session and replace the snapshot.
    ///
    /// On failure the previous (possibly stale) snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the fetch fails.
    pub fn load(&mut self) -> Result<Outcome, SyncError> {
        match self.api.fetch_session() {
            Ok(session) => {
                self.replace_snapshot(session);
                Ok(Outcome::Applied)
            }
            Err(source) => Err(self.request_failed(Action::LoadSession, source)),
        }
    }

    /// Consistency step run after every write except the toggle.
    ///
    /// Currently a full reload.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the reload fails.
    pub fn refresh(&mut self) -> Result<Outcome, SyncError> {
        self.load()
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank website or missing
    /// date, and [`SyncError::Request`] when the write fails.
    pub fn save_session_info(
        &mut self,
        website: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Outcome, SyncError> {
        let website = self.check(validate::require_text(
            "target_website",
            website,
            "Please enter a target website.",
        ))?;
        let start_date = self.check(validate::require_date(
            "start_date",
            start_date,
            "Please select a start date.",
        ))?;

        match self.api.save_session_info(&website, start_date) {
            Ok(session) => {
                self.replace_snapshot(session);
                self.notify_success("Session info saved!");
                Ok(Outcome::Applied)
            }
            Err(source) => Err(self.request_failed(Action::SaveSessionInfo, source)),
        }
    }

    /// Archive the session server-side. `end_date` defaults to today.
    ///
    /// Website and start date must already be on the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotLoaded`] without a snapshot,
    /// [`SyncError::Validation`] when session info is missing, and
    /// [`SyncError::Request`] when the write fails.
    pub fn complete_session(&mut self, end_date: Option<NaiveDate>) -> Result<Outcome, SyncError> {
        let (website, start_date) = match &self.snapshot {
            Some(session) => (session.website().map(str::to_string), session.start_date),
            None => return Err(self.report(SyncError::NotLoaded)),
        };
        let website = self.check(website.ok_or_else(|| {
            missing_session_info("target_website", "Please enter a target website before completing.")
        }))?;
        self.check(start_date.ok_or_else(|| {
            missing_session_info("start_date", "Please select a start date before completing.")
        }))?;

        let end_date = end_date.unwrap_or_else(|| Local::now().date_naive());
        let prompt = format!(
            "Complete testing for \"{website}\"? This will save the session to history and reset the checklist."
        );
        if !self.confirm.confirm(&prompt) {
            debug!(action = %Action::CompleteSession, "declined");
            return Ok(Outcome::Declined);
        }

        if let Err(source) = self.api.complete_session(end_date) {
            return Err(self.request_failed(Action::CompleteSession, source));
        }
        info!(%website, %end_date, "session completed");
        self.notify_success("Session completed! View it in the History page.");
        self.refresh_after_write();
        Ok(Outcome::Applied)
    }

    /// Discard the working session server-side without archiving.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the write fails.
    pub fn reset_session(&mut self) -> Result<Outcome, SyncError> {
        if !self.confirmed(Action::ResetSession) {
            return Ok(Outcome::Declined);
        }
        if let Err(source) = self.api.reset_session() {
            return Err(self.request_failed(Action::ResetSession, source));
        }
        self.notify_success("Session reset successfully!");
        self.refresh_after_write();
        Ok(Outcome::Applied)
    }

    // ── checklist ───────────────────────────────────────────────────────────

    /// Set an item's checked state, then patch the local copy without a
    /// reload. Only the checklist pane is re-rendered.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the write fails; the snapshot is
    /// left untouched.
    pub fn toggle_item(
        &mut self,
        heading: HeadingId,
        item: ItemId,
        checked: bool,
    ) -> Result<Outcome, SyncError> {
        if let Err(source) = self.api.set_item_checked(heading, item, checked) {
            return Err(self.request_failed(Action::ToggleItem, source));
        }

        let local = self
            .snapshot
            .as_mut()
            .and_then(|session| session.item_mut(heading, item));
        if let Some(local) = local {
            local.checked = checked;
            self.render_pane(Pane::Checklist);
        } else {
            debug!(%heading, %item, "toggled item is not in the local snapshot");
        }

        self.notify_success(if checked { "Item checked." } else { "Item unchecked." });
        Ok(Outcome::Applied)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank title and
    /// [`SyncError::Request`] when the write fails.
    pub fn save_heading(
        &mut self,
        title: &str,
        existing: Option<HeadingId>,
    ) -> Result<Outcome, SyncError> {
        let title = self.check(validate::require_text(
            "title",
            title,
            "Please enter a heading title.",
        ))?;
        let success = saved_message("Heading", existing.is_some());
        let editor = existing.map_or(ActiveModal::CreatingHeading, ActiveModal::EditingHeading);
        self.commit(Action::SaveHeading, &success, Some(editor), |api| match existing {
            Some(id) => api.update_heading(id, &title),
            None => api.create_heading(&title),
        })
    }

    /// Delete a heading and, server-side, every item under it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the delete fails.
    pub fn delete_heading(&mut self, id: HeadingId) -> Result<Outcome, SyncError> {
        if !self.confirmed(Action::DeleteHeading) {
            return Ok(Outcome::Declined);
        }
        self.commit(Action::DeleteHeading, "Heading deleted!", None, |api| {
            api.delete_heading(id)
        })
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for blank text and
    /// [`SyncError::Request`] when the write fails.
    pub fn save_item(
        &mut self,
        heading: HeadingId,
        text: &str,
        existing: Option<ItemId>,
    ) -> Result<Outcome, SyncError> {
        let text = self.check(validate::require_text("text", text, "Please enter item text."))?;
        let success = saved_message("Item", existing.is_some());
        let editor = existing.map_or(ActiveModal::CreatingItem(heading), |item| {
            ActiveModal::EditingItem(heading, item)
        });
        self.commit(Action::SaveItem, &success, Some(editor), |api| match existing {
            Some(item) => api.update_item(heading, item, &text),
            None => api.create_item(heading, &text),
        })
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the delete fails.
    pub fn delete_item(&mut self, heading: HeadingId, item: ItemId) -> Result<Outcome, SyncError> {
        if !self.confirmed(Action::DeleteItem) {
            return Ok(Outcome::Declined);
        }
        self.commit(Action::DeleteItem, "Item deleted!", None, |api| {
            api.delete_item(heading, item)
        })
    }

    // ── notes and bugs ──────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for blank text and
    /// [`SyncError::Request`] when the write fails.
    pub fn save_note(&mut self, text: &str, existing: Option<NoteId>) -> Result<Outcome, SyncError> {
        let text = self.check(validate::require_text("text", text, "Please enter note text."))?;
        let success = saved_message("Note", existing.is_some());
        let editor = existing.map_or(ActiveModal::CreatingNote, ActiveModal::EditingNote);
        self.commit(Action::SaveNote, &success, Some(editor), |api| match existing {
            Some(id) => api.update_note(id, &text),
            None => api.create_note(&text),
        })
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the delete fails.
    pub fn delete_note(&mut self, id: NoteId) -> Result<Outcome, SyncError> {
        if !self.confirmed(Action::DeleteNote) {
            return Ok(Outcome::Declined);
        }
        self.commit(Action::DeleteNote, "Note deleted!", None, |api| {
            api.delete_note(id)
        })
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank title or description
    /// and [`SyncError::Request`] when the write fails.
    pub fn save_bug(
        &mut self,
        title: &str,
        description: &str,
        existing: Option<BugId>,
    ) -> Result<Outcome, SyncError> {
        let title = self.check(validate::require_text("title", title, "Please enter a bug title."))?;
        let description = self.check(validate::require_text(
            "description",
            description,
            "Please enter a bug description.",
        ))?;
        let success = saved_message("Bug", existing.is_some());
        let editor = existing.map_or(ActiveModal::CreatingBug, ActiveModal::EditingBug);
        self.commit(Action::SaveBug, &success, Some(editor), |api| match existing {
            Some(id) => api.update_bug(id, &title, &description),
            None => api.create_bug(&title, &description),
        })
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the delete fails.
    pub fn delete_bug(&mut self, id: BugId) -> Result<Outcome, SyncError> {
        if !self.confirmed(Action::DeleteBug) {
            return Ok(Outcome::Declined);
        }
        self.commit(Action::DeleteBug, "Bug deleted!", None, |api| api.delete_bug(id))
    }

    // ── editors ─────────────────────────────────────────────────────────────

    /// Open the heading editor; `Some(id)` pre-populates from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownEntity`] when editing an id that is not in
    /// the snapshot.
    pub fn open_heading_modal(
        &mut self,
        existing: Option<HeadingId>,
    ) -> Result<ModalForm, SyncError> {
        let (modal, form) = match existing {
            None => {
                let modal = ActiveModal::CreatingHeading;
                (modal, ModalForm::blank(modal))
            }
            Some(id) => {
                let title = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.heading(id))
                    .map(|h| h.title.clone());
                let title = self.found(title, "heading", id)?;
                let modal = ActiveModal::EditingHeading(id);
                (modal, ModalForm::filled(modal, &title, None))
            }
        };
        self.modal = modal;
        Ok(form)
    }

    /// Open the item editor under `heading`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownEntity`] when editing an id that is not in
    /// the snapshot.
    pub fn open_item_modal(
        &mut self,
        heading: HeadingId,
        existing: Option<ItemId>,
    ) -> Result<ModalForm, SyncError> {
        let (modal, form) = match existing {
            None => {
                let modal = ActiveModal::CreatingItem(heading);
                (modal, ModalForm::blank(modal))
            }
            Some(item) => {
                let text = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.item(heading, item))
                    .map(|i| i.text.clone());
                let text = self.found(text, "item", format!("{heading}/{item}"))?;
                let modal = ActiveModal::EditingItem(heading, item);
                (modal, ModalForm::filled(modal, &text, None))
            }
        };
        self.modal = modal;
        Ok(form)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::UnknownEntity`] when editing an id that is not in
    /// the snapshot.
    pub fn open_note_modal(&mut self, existing: Option<NoteId>) -> Result<ModalForm, SyncError> {
        let (modal, form) = match existing {
            None => {
                let modal = ActiveModal::CreatingNote;
                (modal, ModalForm::blank(modal))
            }
            Some(id) => {
                let text = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.note(id))
                    .map(|n| n.text.clone());
                let text = self.found(text, "note", id)?;
                let modal = ActiveModal::EditingNote(id);
                (modal, ModalForm::filled(modal, &text, None))
            }
        };
        self.modal = modal;
        Ok(form)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::UnknownEntity`] when editing an id that is not in
    /// the snapshot.
    pub fn open_bug_modal(&mut self, existing: Option<BugId>) -> Result<ModalForm, SyncError> {
        let (modal, form) = match existing {
            None => {
                let modal = ActiveModal::CreatingBug;
                (modal, ModalForm::blank(modal))
            }
            Some(id) => {
                let fields = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.bug(id))
                    .map(|b| (b.title.clone(), b.description.clone()));
                let (title, description) = self.found(fields, "bug", id)?;
                let modal = ActiveModal::EditingBug(id);
                (modal, ModalForm::filled(modal, &title, Some(&description)))
            }
        };
        self.modal = modal;
        Ok(form)
    }

    /// Close whatever editor is open without saving.
    pub fn cancel_modal(&mut self) {
        self.modal = ActiveModal::Closed;
    }

    /// Save the open editor. The editor closes only when the save succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ModalClosed`] when no editor is open, otherwise
    /// whatever the matching save returns.
    pub fn submit_modal(&mut self, form: &ModalForm) -> Result<Outcome, SyncError> {
        let description = form.description.as_deref().unwrap_or_default();
        match self.modal {
            ActiveModal::Closed => Err(self.report(SyncError::ModalClosed)),
            ActiveModal::CreatingHeading => self.save_heading(&form.text, None),
            ActiveModal::EditingHeading(id) => self.save_heading(&form.text, Some(id)),
            ActiveModal::CreatingItem(heading) => self.save_item(heading, &form.text, None),
            ActiveModal::EditingItem(heading, item) => {
                self.save_item(heading, &form.text, Some(item))
            }
            ActiveModal::CreatingNote => self.save_note(&form.text, None),
            ActiveModal::EditingNote(id) => self.save_note(&form.text, Some(id)),
            ActiveModal::CreatingBug => self.save_bug(&form.text, description, None),
            ActiveModal::EditingBug(id) => self.save_bug(&form.text, description, Some(id)),
        }
    }

    // ── internals ───────────────────────────────────────────────────────────

    /// Issue a write, then refresh and notify.
    ///
    /// `editor` is the modal this write saves; it closes only if it is the
    /// one currently open.
    fn commit(
        &mut self,
        action: Action,
        success: &str,
        editor: Option<ActiveModal>,
        call: impl FnOnce(&mut A) -> Result<(), ApiError>,
    ) -> Result<Outcome, SyncError> {
        if let Err(source) = call(&mut self.api) {
            return Err(self.request_failed(action, source));
        }
        debug!(%action, "write accepted");
        if editor.is_some_and(|editor| editor == self.modal) {
            self.modal = ActiveModal::Closed;
        }
        self.refresh_after_write();
        self.notify_success(success);
        Ok(Outcome::Applied)
    }

    /// The write already succeeded, so a failed reload only leaves the
    /// snapshot stale. `load` has notified the surface.
    fn refresh_after_write(&mut self) {
        if let Err(err) = self.refresh() {
            warn!(%err, "refresh after write failed; snapshot is stale");
        }
    }

    fn confirmed(&mut self, action: Action) -> bool {
        let Some(prompt) = action.confirmation() else {
            return true;
        };
        let accepted = self.confirm.confirm(prompt);
        if !accepted {
            debug!(%action, "declined");
        }
        accepted
    }

    fn replace_snapshot(&mut self, session: Session) {
        info!(
            headings = session.checklist.len(),
            notes = session.notes.len(),
            bugs = session.bugs.len(),
            "session snapshot replaced"
        );
        self.snapshot = Some(session);
        for pane in Pane::ALL {
            self.render_pane(pane);
        }
    }

    fn render_pane(&mut self, pane: Pane) {
        if let Some(session) = &self.snapshot {
            let markup = view::render_pane(pane, session);
            self.surface.render(pane, &markup);
        }
    }

    fn notify_success(&mut self, message: &str) {
        self.surface.notify(&Notice::success(message));
    }

    fn report(&mut self, err: SyncError) -> SyncError {
        self.surface.notify(&Notice::from_error(&err));
        err
    }

    fn check<T>(&mut self, result: Result<T, ValidationError>) -> Result<T, SyncError> {
        result.map_err(|err| {
            debug!(field = err.field, "validation failed");
            self.report(SyncError::Validation(err))
        })
    }

    fn request_failed(&mut self, action: Action, source: ApiError) -> SyncError {
        warn!(%action, error = %source, "collaborator call failed");
        self.report(SyncError::Request { action, source })
    }

    fn found<T>(
        &mut self,
        value: Option<T>,
        kind: &'static str,
        id: impl ToString,
    ) -> Result<T, SyncError> {
        value.ok_or_else(|| {
            self.report(SyncError::UnknownEntity {
                kind,
                id: id.to_string(),
            })
        })
    }
}

fn missing_session_info(field: &'static str, message: &str) -> ValidationError {
    let code = ErrorCode::MissingSessionInfo;
    let err = ValidationError::new(field, message, code);
    match code.hint() {
        Some(hint) => err.with_suggestion(hint),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, Method};
    use crate::memory::{InMemoryApi, RecordingSurface, ScriptedConfirm};
    use crate::model::{Heading, Item};

    type TestSync = Synchronizer<InMemoryApi, ScriptedConfirm, RecordingSurface>;

    fn seeded() -> Session {
        Session {
            checklist: vec![Heading {
                id: HeadingId(3),
                title: "Login".into(),
                items: vec![Item { id: ItemId(7), text: "valid password".into(), checked: false }],
            }],
            ..Session::default()
        }
    }

    fn sync_with(session: Session, confirm: ScriptedConfirm) -> TestSync {
        let mut sync = Synchronizer::new(
            InMemoryApi::with_session(session),
            confirm,
            RecordingSurface::default(),
        );
        sync.load().expect("initial load");
        sync.api_mut().clear_requests();
        sync
    }

    #[test]
    fn load_failure_keeps_stale_snapshot() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        sync.api_mut().fail_next(ApiError::Status(500));

        let err = sync.load().expect_err("load must fail");
        assert!(matches!(err, SyncError::Request { action: Action::LoadSession, .. }));
        assert_eq!(sync.snapshot(), Some(&seeded()));
        assert_eq!(
            sync.surface().last_notice().map(|n| n.message.as_str()),
            Some("Failed to load session. Please refresh the page.")
        );
    }

    #[test]
    fn toggle_patches_locally_without_reload() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        let outcome = sync
            .toggle_item(HeadingId(3), ItemId(7), true)
            .expect("toggle succeeds");

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            sync.api().requests(),
            [Endpoint::set_item_checked(HeadingId(3), ItemId(7), true)]
        );
        let item = sync.snapshot().and_then(|s| s.item(HeadingId(3), ItemId(7)));
        assert_eq!(item.map(|i| i.checked), Some(true));
        assert_eq!(sync.surface().renders().last(), Some(&Pane::Checklist));
    }

    #[test]
    fn failed_toggle_leaves_snapshot_untouched() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        sync.api_mut().fail_next(ApiError::Transport("reset".into()));

        let err = sync
            .toggle_item(HeadingId(3), ItemId(7), true)
            .expect_err("toggle fails");
        assert_eq!(err.user_message(), "Failed to update item. Please try again.");
        let item = sync.snapshot().and_then(|s| s.item(HeadingId(3), ItemId(7)));
        assert_eq!(item.map(|i| i.checked), Some(false));
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(false));
        let outcome = sync.delete_heading(HeadingId(3)).expect("no error");

        assert_eq!(outcome, Outcome::Declined);
        assert!(sync.api().requests().is_empty());
        assert!(sync.surface().notices().is_empty());
        assert_eq!(
            sync.confirmer().prompts(),
            ["Are you sure you want to delete this heading and all its items?"]
        );
    }

    #[test]
    fn save_issues_write_then_full_reload() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        sync.save_item(HeadingId(3), "  wrong password ", None)
            .expect("save succeeds");

        let requests = sync.api().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], Endpoint::create_item(HeadingId(3), "wrong password"));
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(requests[1].path, "/api/session");
        assert_eq!(
            sync.surface().last_notice().map(|n| n.message.as_str()),
            Some("Item added!")
        );
    }

    #[test]
    fn failed_refresh_after_write_still_reports_success() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        sync.api_mut().pass_next();
        sync.api_mut().fail_next(ApiError::Status(502));

        let outcome = sync.save_note("first", None).expect("write succeeded");
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(sync.api().session().notes.len(), 1);
        // Stale until the next successful load.
        assert!(sync.snapshot().is_some_and(|s| s.notes.is_empty()));

        let messages: Vec<&str> = sync
            .surface()
            .notices()
            .iter()
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(
            messages,
            ["Failed to load session. Please refresh the page.", "Note added!"]
        );
    }

    #[test]
    fn complete_requires_loaded_snapshot() {
        let mut sync = Synchronizer::new(
            InMemoryApi::new(),
            ScriptedConfirm::always(true),
            RecordingSurface::default(),
        );
        let err = sync.complete_session(None).expect_err("not loaded");
        assert!(matches!(err, SyncError::NotLoaded));
        assert!(sync.api().requests().is_empty());
    }

    #[test]
    fn submit_without_open_editor_is_rejected() {
        let mut sync = sync_with(seeded(), ScriptedConfirm::always(true));
        let err = sync
            .submit_modal(&ModalForm::default())
            .expect_err("nothing open");
        assert!(matches!(err, SyncError::ModalClosed));
        assert!(sync.api().requests().is_empty());
    }

    #[test]
    fn closure_can_act_as_confirm() {
        let mut asked = 0;
        let mut confirm = |_: &str| {
            asked += 1;
            true
        };
        assert!(confirm.confirm("sure?"));
        assert_eq!(asked, 1);
    }
}
