//! `qat show`, `qat render`, `qat info`, `qat complete`, `qat reset`.

use std::io::{self, Write};

use clap::{Args, Subcommand};
use qatrack_core::model::{Bug, Heading, Note, Session};
use qatrack_core::validate;
use qatrack_core::view::{self, EMPTY_BUGS, EMPTY_CHECKLIST, EMPTY_HEADING, EMPTY_NOTES};
use qatrack_core::Pane;
use qatrack_core::theme::Theme;
use serde::Serialize;

use super::{Context, finish};
use crate::output::{pretty_kv, pretty_section, pretty_title, render_mode};

#[derive(Subcommand, Debug)]
pub enum InfoCommand {
    /// Record the target website and start date.
    Set {
        /// Website under test.
        #[arg(long)]
        website: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// End date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub end_date: Option<String>,
}

pub fn run_show(ctx: &Context) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    finish(sync.load())?;
    let session = sync.session().map_err(super::reported)?;
    let theme = ctx.theme;
    render_mode(ctx.output, session, write_text, |s, w| write_pretty(s, theme, w))
}

#[derive(Debug, Serialize)]
struct RenderedPanes<'a> {
    checklist: &'a str,
    notes: &'a str,
    bugs: &'a str,
}

pub fn run_render(ctx: &Context) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    finish(sync.load())?;
    let surface = sync.surface();
    let panes = RenderedPanes {
        checklist: surface.pane(Pane::Checklist).unwrap_or_default(),
        notes: surface.pane(Pane::Notes).unwrap_or_default(),
        bugs: surface.pane(Pane::Bugs).unwrap_or_default(),
    };
    render_mode(ctx.output, &panes, write_panes, write_panes)
}

fn write_panes(panes: &RenderedPanes<'_>, w: &mut dyn Write) -> io::Result<()> {
    for (pane, markup) in [
        (Pane::Checklist, panes.checklist),
        (Pane::Notes, panes.notes),
        (Pane::Bugs, panes.bugs),
    ] {
        writeln!(w, "<!-- {} -->", pane.as_str())?;
        writeln!(w, "{markup}")?;
    }
    Ok(())
}

pub fn run_info(ctx: &Context, command: &InfoCommand) -> anyhow::Result<()> {
    let InfoCommand::Set { website, date } = command;
    let date = validate::parse_date("start_date", date).map_err(|err| ctx.reject(&err))?;
    let mut sync = ctx.synchronizer();
    finish(sync.save_session_info(website, date))
}

pub fn run_complete(ctx: &Context, args: &CompleteArgs) -> anyhow::Result<()> {
    let end_date = match args.end_date.as_deref() {
        Some(raw) => validate::parse_date("end_date", raw).map_err(|err| ctx.reject(&err))?,
        None => None,
    };
    let mut sync = ctx.synchronizer();
    finish(sync.load())?;
    finish(sync.complete_session(end_date))
}

pub fn run_reset(ctx: &Context) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    finish(sync.reset_session())
}

fn progress(done: usize, total: usize) -> String {
    format!("{done}/{total}")
}

fn write_text(session: &Session, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "website\t{}", session.target_website)?;
    let start = session
        .start_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    writeln!(w, "start\t{start}")?;
    for numbered in view::numbered_headings(session) {
        let heading = numbered.heading;
        let (done, total) = heading.progress();
        writeln!(
            w,
            "heading\t{}\t{}\t{}\t{}",
            heading.id,
            numbered.number,
            progress(done, total),
            heading.title
        )?;
        for item in &heading.items {
            let mark = if item.checked { "x" } else { " " };
            writeln!(w, "item\t{}\t{}\t[{mark}]\t{}", heading.id, item.id, item.text)?;
        }
    }
    for note in &session.notes {
        writeln!(w, "note\t{}\t{}\t{}", note.id, note.created_at, note.text)?;
    }
    for bug in &session.bugs {
        writeln!(w, "bug\t{}\t{}\t{}", bug.id, view::bug_badge(&bug.created_at), bug.title)?;
    }
    Ok(())
}

fn write_pretty(session: &Session, theme: Theme, w: &mut dyn Write) -> io::Result<()> {
    pretty_title(w, theme, "Session")?;
    pretty_kv(w, "Website", session.website().unwrap_or("(not set)"))?;
    pretty_kv(
        w,
        "Start date",
        session
            .start_date
            .map_or_else(|| "(not set)".to_string(), |d| d.to_string()),
    )?;
    let (done, total) = session.progress();
    pretty_kv(w, "Progress", progress(done, total))?;
    writeln!(w)?;

    pretty_section(w, "Checklist")?;
    if session.checklist.is_empty() {
        writeln!(w, "{EMPTY_CHECKLIST}")?;
    }
    for numbered in view::numbered_headings(session) {
        write_heading(w, numbered.number, numbered.heading)?;
    }
    writeln!(w)?;

    pretty_section(w, "Notes")?;
    if session.notes.is_empty() {
        writeln!(w, "{EMPTY_NOTES}")?;
    }
    for note in &session.notes {
        write_note(w, note)?;
    }
    writeln!(w)?;

    pretty_section(w, "Bugs")?;
    if session.bugs.is_empty() {
        writeln!(w, "{EMPTY_BUGS}")?;
    }
    for bug in &session.bugs {
        write_bug(w, bug)?;
    }
    Ok(())
}

fn write_heading(w: &mut dyn Write, number: usize, heading: &Heading) -> io::Result<()> {
    let (done, total) = heading.progress();
    writeln!(
        w,
        "{number}. {}  ({})  #{}",
        heading.title,
        progress(done, total),
        heading.id
    )?;
    if heading.items.is_empty() {
        writeln!(w, "   {EMPTY_HEADING}")?;
    }
    for item in &heading.items {
        let mark = if item.checked { "x" } else { " " };
        writeln!(w, "   [{mark}] {}  #{}", item.text, item.id)?;
    }
    Ok(())
}

fn write_note(w: &mut dyn Write, note: &Note) -> io::Result<()> {
    writeln!(w, "#{} {}", note.id, note.text)?;
    writeln!(w, "   {}", note.created_at)
}

fn write_bug(w: &mut dyn Write, bug: &Bug) -> io::Result<()> {
    writeln!(w, "#{} [{}] {}", bug.id, view::bug_badge(&bug.created_at), bug.title)?;
    writeln!(w, "   {}", bug.description)?;
    writeln!(w, "   Reported {}", view::bug_timestamp(&bug.created_at))
}
