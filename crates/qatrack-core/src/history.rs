//! Browsing and pruning archived sessions.
//!
//! Same discipline as the synchronizer: confirm destructive calls, reload
//! the whole list after a write, report through the [`Surface`].

use tracing::{info, warn};

use crate::action::Action;
use crate::api::SessionApi;
use crate::error::{ApiError, SyncError};
use crate::model::{HistoryEntry, HistoryId};
use crate::sync::{Confirm, Notice, Outcome, Surface};

#[derive(Debug)]
pub struct History<A, C, S> {
    api: A,
    confirm: C,
    surface: S,
    entries: Vec<HistoryEntry>,
}

impl<A: SessionApi, C: Confirm, S: Surface> History<A, C, S> {
    pub const fn new(api: A, confirm: C, surface: S) -> Self {
        Self {
            api,
            confirm,
            surface,
            entries: Vec::new(),
        }
    }

    /// Entries from the last successful load, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, id: HistoryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_parts(self) -> (A, C, S) {
        (self.api, self.confirm, self.surface)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the fetch fails.
    pub fn load(&mut self) -> Result<Outcome, SyncError> {
        match self.api.list_history() {
            Ok(entries) => {
                info!(entries = entries.len(), "history loaded");
                self.entries = entries;
                Ok(Outcome::Applied)
            }
            Err(source) => Err(self.request_failed(Action::LoadHistory, source)),
        }
    }

    /// Delete one archived session, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Request`] when the delete or reload fails.
    pub fn delete(&mut self, id: HistoryId) -> Result<Outcome, SyncError> {
        let action = Action::DeleteHistoryEntry;
        if let Some(prompt) = action.confirmation()
            && !self.confirm.confirm(prompt)
        {
            return Ok(Outcome::Declined);
        }
        if let Err(source) = self.api.delete_history_entry(id) {
            return Err(self.request_failed(action, source));
        }
        if let Err(err) = self.load() {
            warn!(%err, "reload after history delete failed");
        }
        self.surface.notify(&Notice::success("History entry deleted!"));
        Ok(Outcome::Applied)
    }

    fn request_failed(&mut self, action: Action, source: ApiError) -> SyncError {
        warn!(%action, error = %source, "collaborator call failed");
        let err = SyncError::Request { action, source };
        self.surface.notify(&Notice::from_error(&err));
        err
    }
}
