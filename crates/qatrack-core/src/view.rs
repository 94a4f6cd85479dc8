//! Markup rendering for the checklist, notes and bugs panes.
//!
//! Everything here is a pure function of a [`Session`]. Free text always goes
//! through [`escape_markup`].

use std::fmt::Write;

use chrono::{DateTime, NaiveDateTime};

use crate::model::{Bug, Heading, Note, Session};
use crate::sync::Pane;

pub const EMPTY_CHECKLIST: &str = "No checklist items yet. Add a heading to get started.";
pub const EMPTY_HEADING: &str = "No items yet. Add a sub-item to get started.";
pub const EMPTY_NOTES: &str = "No notes yet. Add a note to create one.";
pub const EMPTY_BUGS: &str = "No bugs reported yet.";

const BADGE_FORMAT: &str = "%b %-d";
const LONG_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

/// Escape `& < > " '` so user text displays verbatim.
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// A heading with its display number (1-based, server order).
#[derive(Debug, Clone, Copy)]
pub struct NumberedHeading<'a> {
    pub number: usize,
    pub heading: &'a Heading,
}

/// Headings numbered by position; ids play no part.
pub fn numbered_headings(session: &Session) -> impl Iterator<Item = NumberedHeading<'_>> {
    session
        .checklist
        .iter()
        .enumerate()
        .map(|(idx, heading)| NumberedHeading {
            number: idx + 1,
            heading,
        })
}

/// Parse a server timestamp (`YYYY-MM-DD HH:MM:SS`, ISO-8601 or RFC 3339).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Short badge such as `Jan 5`; the raw text when unparsable.
#[must_use]
pub fn bug_badge(created_at: &str) -> String {
    parse_timestamp(created_at).map_or_else(
        || created_at.to_string(),
        |ts| ts.format(BADGE_FORMAT).to_string(),
    )
}

/// Long form such as `January 5, 2024 at 3:04 PM`; the raw text when
/// unparsable.
#[must_use]
pub fn bug_timestamp(created_at: &str) -> String {
    parse_timestamp(created_at).map_or_else(
        || created_at.to_string(),
        |ts| ts.format(LONG_FORMAT).to_string(),
    )
}

fn empty_state(out: &mut String, message: &str) {
    let _ = write!(out, "<div class=\"empty-state\"><p>{message}</p></div>");
}

#[must_use]
pub fn render_checklist(session: &Session) -> String {
    let mut out = String::new();
    if session.checklist.is_empty() {
        empty_state(&mut out, EMPTY_CHECKLIST);
        return out;
    }

    for NumberedHeading { number, heading } in numbered_headings(session) {
        let (done, total) = heading.progress();
        let _ = write!(
            out,
            "<div class=\"checklist-heading\" data-heading-id=\"{id}\">\
             <div class=\"heading-title\"><span class=\"heading-number\">{number}.</span> {title} \
             <span class=\"heading-progress\">{done}/{total}</span></div>\
             <div class=\"heading-items\">",
            id = heading.id,
            title = escape_markup(&heading.title),
        );
        if heading.items.is_empty() {
            let _ = write!(out, "<p class=\"heading-empty\">{EMPTY_HEADING}</p>");
        }
        for item in &heading.items {
            let (checked_attr, checked_class) = if item.checked {
                (" checked", " checked")
            } else {
                ("", "")
            };
            let _ = write!(
                out,
                "<div class=\"checklist-item\" data-item-id=\"{id}\">\
                 <input type=\"checkbox\"{checked_attr}>\
                 <span class=\"item-text{checked_class}\">{text}</span></div>",
                id = item.id,
                text = escape_markup(&item.text),
            );
        }
        out.push_str("</div></div>");
    }
    out
}

fn render_note(out: &mut String, note: &Note) {
    let _ = write!(
        out,
        "<div class=\"note-item\" data-note-id=\"{id}\">\
         <div class=\"note-text\">{text}</div>\
         <div class=\"note-footer\"><span class=\"note-time\">{time}</span></div></div>",
        id = note.id,
        text = escape_markup(&note.text),
        time = escape_markup(&note.created_at),
    );
}

#[must_use]
pub fn render_notes(session: &Session) -> String {
    let mut out = String::new();
    if session.notes.is_empty() {
        empty_state(&mut out, EMPTY_NOTES);
        return out;
    }
    for note in &session.notes {
        render_note(&mut out, note);
    }
    out
}

fn render_bug(out: &mut String, bug: &Bug) {
    let _ = write!(
        out,
        "<div class=\"bug-item\" data-bug-id=\"{id}\">\
         <div class=\"bug-header\"><span class=\"bug-badge\">{badge}</span> \
         <span class=\"bug-title\">{title}</span></div>\
         <div class=\"bug-description\">{description}</div>\
         <div class=\"bug-footer\"><span class=\"bug-time\">{time}</span></div></div>",
        id = bug.id,
        badge = escape_markup(&bug_badge(&bug.created_at)),
        title = escape_markup(&bug.title),
        description = escape_markup(&bug.description),
        time = escape_markup(&bug_timestamp(&bug.created_at)),
    );
}

#[must_use]
pub fn render_bugs(session: &Session) -> String {
    let mut out = String::new();
    if session.bugs.is_empty() {
        empty_state(&mut out, EMPTY_BUGS);
        return out;
    }
    for bug in &session.bugs {
        render_bug(&mut out, bug);
    }
    out
}

#[must_use]
pub fn render_pane(pane: Pane, session: &Session) -> String {
    match pane {
        Pane::Checklist => render_checklist(session),
        Pane::Notes => render_notes(session),
        Pane::Bugs => render_bugs(session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BugId, HeadingId, Item, ItemId, NoteId};

    fn sample() -> Session {
        Session {
            checklist: vec![
                Heading {
                    id: HeadingId(7),
                    title: "Forms <input>".into(),
                    items: vec![
                        Item { id: ItemId(1), text: "Submit \"empty\"".into(), checked: true },
                        Item { id: ItemId(2), text: "Tab order".into(), checked: false },
                    ],
                },
                Heading { id: HeadingId(2), title: "Auth".into(), items: vec![] },
            ],
            notes: vec![Note {
                id: NoteId(1),
                text: "a & b".into(),
                created_at: "2024-01-05 15:04:00".into(),
            }],
            bugs: vec![Bug {
                id: BugId(1),
                title: "<script>alert(1)</script>".into(),
                description: "it's broken".into(),
                created_at: "2024-01-05 15:04:00".into(),
            }],
            ..Session::default()
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_markup(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn headings_are_numbered_by_position_not_id() {
        let markup = render_checklist(&sample());
        let first = markup.find("<span class=\"heading-number\">1.</span> Forms").expect("1.");
        let second = markup.find("<span class=\"heading-number\">2.</span> Auth").expect("2.");
        assert!(first < second);
        assert!(markup.contains("data-heading-id=\"7\""));
        assert!(!markup.contains("7."));
    }

    #[test]
    fn checklist_escapes_and_marks_checked_items() {
        let markup = render_checklist(&sample());
        assert!(markup.contains("Forms &lt;input&gt;"));
        assert!(markup.contains("<span class=\"item-text checked\">Submit &quot;empty&quot;</span>"));
        assert!(markup.contains("<span class=\"item-text\">Tab order</span>"));
        assert!(markup.contains("<span class=\"heading-progress\">1/2</span>"));
        assert!(markup.contains(EMPTY_HEADING));
    }

    #[test]
    fn notes_show_raw_timestamp() {
        let markup = render_notes(&sample());
        assert!(markup.contains("a &amp; b"));
        assert!(markup.contains("<span class=\"note-time\">2024-01-05 15:04:00</span>"));
    }

    #[test]
    fn bugs_show_derived_dates_and_escaped_text() {
        let markup = render_bugs(&sample());
        assert!(markup.contains("<span class=\"bug-badge\">Jan 5</span>"));
        assert!(markup.contains("January 5, 2024 at 3:04 PM"));
        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("it&#39;s broken"));
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-01-05 15:04:00").is_some());
        assert!(parse_timestamp("2024-01-05T15:04:00.123").is_some());
        assert!(parse_timestamp("2024-01-05T15:04:00+02:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(bug_badge("yesterday"), "yesterday");
        assert_eq!(bug_timestamp("2024-11-30 09:05:00"), "November 30, 2024 at 9:05 AM");
    }

    #[test]
    fn empty_session_renders_empty_states_only() {
        let session = Session::default();
        let checklist = render_pane(Pane::Checklist, &session);
        let notes = render_pane(Pane::Notes, &session);
        let bugs = render_pane(Pane::Bugs, &session);

        assert!(checklist.contains(EMPTY_CHECKLIST));
        assert!(notes.contains(EMPTY_NOTES));
        assert!(bugs.contains(EMPTY_BUGS));
        for markup in [&checklist, &notes, &bugs] {
            assert!(markup.starts_with("<div class=\"empty-state\">"));
            assert!(!markup.contains("data-"));
        }
    }
}
