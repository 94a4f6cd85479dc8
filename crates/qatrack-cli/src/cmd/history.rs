//! `qat history`: archived sessions.

use std::io::{self, Write};

use clap::Subcommand;
use qatrack_core::model::{HistoryEntry, HistoryId};
use qatrack_core::theme::Theme;

use super::{Context, finish};
use crate::output::{pretty_kv, pretty_rule, pretty_title, render_mode};

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List completed sessions.
    List,
    /// Delete a completed session from history.
    Rm { id: HistoryId },
}

pub fn run_history(ctx: &Context, command: &HistoryCommand) -> anyhow::Result<()> {
    let mut history = ctx.history();
    match command {
        HistoryCommand::List => {
            finish(history.load())?;
            let theme = ctx.theme;
            render_mode(ctx.output, history.entries(), write_text, |entries, w| {
                write_pretty(entries, theme, w)
            })
        }
        HistoryCommand::Rm { id } => finish(history.delete(*id)),
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn write_text(entries: &[HistoryEntry], w: &mut dyn Write) -> io::Result<()> {
    for entry in entries {
        let (done, total) = entry.progress();
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{done}/{total}\t{}",
            entry.id,
            entry.target_website,
            date_or_dash(entry.start_date),
            date_or_dash(entry.end_date),
            entry.completed_at
        )?;
    }
    Ok(())
}

fn write_pretty(entries: &[HistoryEntry], theme: Theme, w: &mut dyn Write) -> io::Result<()> {
    pretty_title(w, theme, "History")?;
    if entries.is_empty() {
        writeln!(w, "No completed sessions yet.")?;
        return Ok(());
    }
    for entry in entries {
        let (done, total) = entry.progress();
        writeln!(w, "#{} {}", entry.id, entry.target_website)?;
        pretty_kv(
            w,
            "Dates",
            format!(
                "{} to {}",
                date_or_dash(entry.start_date),
                date_or_dash(entry.end_date)
            ),
        )?;
        pretty_kv(w, "Completed", &entry.completed_at)?;
        pretty_kv(w, "Checked", format!("{done}/{total}"))?;
        pretty_kv(
            w,
            "Findings",
            format!("{} notes, {} bugs", entry.notes.len(), entry.bugs.len()),
        )?;
        pretty_rule(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry() -> HistoryEntry {
        HistoryEntry {
            id: HistoryId(3),
            target_website: "shop.example".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: None,
            completed_at: "2024-03-08 17:00:00".into(),
            checklist: Vec::new(),
            notes: Vec::new(),
            bugs: Vec::new(),
        }
    }

    #[test]
    fn text_row_uses_dash_for_missing_dates() {
        let mut buf = Vec::new();
        write_text(&[entry()], &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "3\tshop.example\t2024-03-01\t-\t0/0\t2024-03-08 17:00:00\n");
    }

    #[test]
    fn pretty_empty_history() {
        let mut buf = Vec::new();
        write_pretty(&[], Theme::Light, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("☀️ History\n"));
        assert!(text.contains("No completed sessions yet."));
    }
}
