//! User-facing actions and the messages surfaced for each.

use std::fmt;

/// Every operation the synchronizer (or history browser) can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LoadSession,
    SaveSessionInfo,
    ToggleItem,
    SaveHeading,
    DeleteHeading,
    SaveItem,
    DeleteItem,
    SaveNote,
    DeleteNote,
    SaveBug,
    DeleteBug,
    CompleteSession,
    ResetSession,
    LoadHistory,
    DeleteHistoryEntry,
}

impl Action {
    const fn as_str(self) -> &'static str {
        match self {
            Self::LoadSession => "load session",
            Self::SaveSessionInfo => "save session info",
            Self::ToggleItem => "update item",
            Self::SaveHeading => "save heading",
            Self::DeleteHeading => "delete heading",
            Self::SaveItem => "save item",
            Self::DeleteItem => "delete item",
            Self::SaveNote => "save note",
            Self::DeleteNote => "delete note",
            Self::SaveBug => "save bug",
            Self::DeleteBug => "delete bug",
            Self::CompleteSession => "complete session",
            Self::ResetSession => "reset session",
            Self::LoadHistory => "load history",
            Self::DeleteHistoryEntry => "delete history entry",
        }
    }

    /// Notification shown when the collaborator call behind this action fails.
    #[must_use]
    pub fn failure_message(self) -> String {
        match self {
            Self::LoadSession => "Failed to load session. Please refresh the page.".to_string(),
            Self::LoadHistory => "Failed to load history. Please try again.".to_string(),
            other => format!("Failed to {}. Please try again.", other.as_str()),
        }
    }

    /// Confirmation prompt for destructive actions, if the action needs one.
    ///
    /// `CompleteSession` is excluded because its prompt names the website.
    #[must_use]
    pub const fn confirmation(self) -> Option<&'static str> {
        match self {
            Self::DeleteHeading => {
                Some("Are you sure you want to delete this heading and all its items?")
            }
            Self::DeleteItem => Some("Are you sure you want to delete this item?"),
            Self::DeleteNote => Some("Are you sure you want to delete this note?"),
            Self::DeleteBug => Some("Are you sure you want to delete this bug?"),
            Self::DeleteHistoryEntry => {
                Some("Are you sure you want to delete this history entry?")
            }
            Self::ResetSession => Some(
                "Are you sure you want to reset the session? All current data will be lost unless you complete it first.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success message for a save, depending on whether it created or updated.
#[must_use]
pub fn saved_message(entity: &str, updated: bool) -> String {
    if updated {
        format!("{entity} updated!")
    } else {
        format!("{entity} added!")
    }
}
