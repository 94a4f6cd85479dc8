//! Editor ("modal") state.
//!
//! A single [`ActiveModal`] value replaces per-entity "currently editing"
//! markers, so inconsistent combinations cannot be represented and at most
//! one editor is open at a time across all entity types.

use crate::model::{BugId, HeadingId, ItemId, NoteId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveModal {
    #[default]
    Closed,
    CreatingHeading,
    EditingHeading(HeadingId),
    CreatingItem(HeadingId),
    EditingItem(HeadingId, ItemId),
    CreatingNote,
    EditingNote(NoteId),
    CreatingBug,
    EditingBug(BugId),
}

impl ActiveModal {
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Title shown at the top of the editor.
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Closed => "",
            Self::CreatingHeading => "Add Heading",
            Self::EditingHeading(_) => "Edit Heading",
            Self::CreatingItem(_) => "Add Sub-item",
            Self::EditingItem(..) => "Edit Sub-item",
            Self::CreatingNote => "Add Note",
            Self::EditingNote(_) => "Edit Note",
            Self::CreatingBug => "Add Bug",
            Self::EditingBug(_) => "Edit Bug",
        }
    }

    /// Whether the editor carries a second (description) field.
    #[must_use]
    pub const fn has_description(self) -> bool {
        matches!(self, Self::CreatingBug | Self::EditingBug(_))
    }
}

/// Field values of an open editor.
///
/// `text` holds the heading title, item text, note text or bug title.
/// `description` is only used by bug editors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalForm {
    pub caption: &'static str,
    pub text: String,
    pub description: Option<String>,
}

impl ModalForm {
    /// Blank form for a create editor.
    #[must_use]
    pub fn blank(modal: ActiveModal) -> Self {
        Self {
            caption: modal.caption(),
            text: String::new(),
            description: modal.has_description().then(String::new),
        }
    }

    /// Form pre-populated from an existing entity.
    #[must_use]
    pub fn filled(modal: ActiveModal, text: &str, description: Option<&str>) -> Self {
        Self {
            caption: modal.caption(),
            text: text.to_string(),
            description: description.map(str::to_string),
        }
    }
}
