//! Terminal implementations of the synchronizer's capabilities.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use qatrack_core::{Confirm, Notice, NoticeLevel, Pane, Surface};
use tracing::warn;

use crate::output::{CliError, OutputMode, render_error, render_success};

/// `y/N` prompt on stderr, answered from stdin.
///
/// With `--yes` every prompt is accepted without reading. End of input
/// counts as "no".
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints notices as they arrive and keeps the latest markup per pane.
#[derive(Debug)]
pub struct TerminalSurface {
    mode: OutputMode,
    panes: BTreeMap<Pane, String>,
}

impl TerminalSurface {
    pub const fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            panes: BTreeMap::new(),
        }
    }

    /// Latest markup rendered into `pane`.
    pub fn pane(&self, pane: Pane) -> Option<&str> {
        self.panes.get(&pane).map(String::as_str)
    }
}

impl Surface for TerminalSurface {
    fn notify(&mut self, notice: &Notice) {
        let written = match notice.level {
            NoticeLevel::Success => render_success(self.mode, &notice.message),
            NoticeLevel::Error => {
                let error = match notice.code {
                    Some(code) => CliError::with_code(&notice.message, code),
                    None => CliError::new(&notice.message),
                };
                render_error(self.mode, &error)
            }
        };
        if let Err(err) = written {
            warn!(error = %err, "failed to write notice");
        }
    }

    fn render(&mut self, pane: Pane, markup: &str) {
        self.panes.insert(pane, markup.to_string());
    }
}

/// Ask for a field value on stderr, showing the current value.
///
/// An empty answer keeps `current`.
pub fn prompt_line(label: &str, current: &str) -> anyhow::Result<String> {
    eprint!("{label} [{current}]: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        Ok(current.to_string())
    } else {
        Ok(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers_are_case_insensitive() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn assume_yes_skips_the_prompt() {
        let mut confirm = TerminalConfirm::new(true);
        assert!(confirm.confirm("Delete everything?"));
    }

    #[test]
    fn surface_keeps_latest_markup_per_pane() {
        let mut surface = TerminalSurface::new(OutputMode::Text);
        surface.render(Pane::Notes, "<p>old</p>");
        surface.render(Pane::Notes, "<p>new</p>");
        assert_eq!(surface.pane(Pane::Notes), Some("<p>new</p>"));
        assert_eq!(surface.pane(Pane::Bugs), None);
    }
}
