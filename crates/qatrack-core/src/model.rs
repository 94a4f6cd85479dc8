//! Session data model as exchanged with the collaborator.
//!
//! Identities are always assigned by the collaborator. The local side only
//! ever reads them back, so the newtypes expose no way to mint a fresh one
//! other than wrapping a raw server value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw value as sent on the wire.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches('#').parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Heading identity, unique within a session.
    HeadingId
);
entity_id!(
    /// Item identity, unique within its heading only.
    ItemId
);
entity_id!(
    /// Note identity.
    NoteId
);
entity_id!(
    /// Bug identity.
    BugId
);
entity_id!(
    /// Archived session identity.
    HistoryId
);

/// The single active working set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub target_website: String,
    #[serde(default, with = "date_or_empty")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub checklist: Vec<Heading>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub bugs: Vec<Bug>,
}

impl Session {
    /// Website, or `None` while it is still blank.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        let site = self.target_website.trim();
        (!site.is_empty()).then_some(site)
    }

    #[must_use]
    pub fn heading(&self, id: HeadingId) -> Option<&Heading> {
        self.checklist.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn item(&self, heading: HeadingId, item: ItemId) -> Option<&Item> {
        self.heading(heading)?.items.iter().find(|i| i.id == item)
    }

    /// Mutable lookup used only by the optimistic checked-state patch.
    pub fn item_mut(&mut self, heading: HeadingId, item: ItemId) -> Option<&mut Item> {
        self.checklist
            .iter_mut()
            .find(|h| h.id == heading)?
            .items
            .iter_mut()
            .find(|i| i.id == item)
    }

    #[must_use]
    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn bug(&self, id: BugId) -> Option<&Bug> {
        self.bugs.iter().find(|b| b.id == id)
    }

    /// `(checked, total)` across every heading.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        progress_of(&self.checklist)
    }
}

/// A named grouping of checklist items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub id: HeadingId,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Heading {
    /// `(checked, total)` for this heading.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|i| i.checked).count();
        (done, self.items.len())
    }
}

/// A checkable sub-task under exactly one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Server-assigned, displayed verbatim.
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub id: BugId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
}

/// A completed session as archived by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    #[serde(default)]
    pub target_website: String,
    #[serde(default, with = "date_or_empty")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: String,
    #[serde(default)]
    pub checklist: Vec<Heading>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub bugs: Vec<Bug>,
}

impl HistoryEntry {
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        progress_of(&self.checklist)
    }
}

fn progress_of(checklist: &[Heading]) -> (usize, usize) {
    checklist
        .iter()
        .map(Heading::progress)
        .fold((0, 0), |(d, t), (hd, ht)| (d + hd, t + ht))
}

/// Wire format for optional calendar dates: `"YYYY-MM-DD"`, with `""` (or
/// `null`) meaning unset.
pub mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.collect_str(&d.format(FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
