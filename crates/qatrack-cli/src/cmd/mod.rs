pub mod bug;
pub mod completions;
pub mod heading;
pub mod history;
pub mod item;
pub mod note;
pub mod session;
pub mod theme;

use std::fmt;

use qatrack_core::api::HttpApi;
use qatrack_core::error::SyncError;
use qatrack_core::history::History;
use qatrack_core::theme::Theme;
use qatrack_core::validate::ValidationError;
use qatrack_core::{Outcome, Synchronizer};
use tracing::{debug, info};

use crate::output::{CliError, OutputMode, render_error};
use crate::terminal::{TerminalConfirm, TerminalSurface};

pub type TerminalSync = Synchronizer<HttpApi, TerminalConfirm, TerminalSurface>;
pub type TerminalHistory = History<HttpApi, TerminalConfirm, TerminalSurface>;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub base_url: String,
    pub assume_yes: bool,
    /// Saved display theme; heads pretty output.
    pub theme: Theme,
}

impl Context {
    pub fn synchronizer(&self) -> TerminalSync {
        Synchronizer::new(
            HttpApi::new(&self.base_url),
            TerminalConfirm::new(self.assume_yes),
            TerminalSurface::new(self.output),
        )
    }

    pub fn history(&self) -> TerminalHistory {
        History::new(
            HttpApi::new(&self.base_url),
            TerminalConfirm::new(self.assume_yes),
            TerminalSurface::new(self.output),
        )
    }

    /// Report a failure the core never saw (argument parsing, config).
    pub fn report(&self, error: &CliError) -> anyhow::Error {
        if let Err(err) = render_error(self.output, error) {
            debug!(error = %err, "failed to write error");
        }
        anyhow::Error::new(Reported)
    }

    pub fn reject(&self, err: &ValidationError) -> anyhow::Error {
        self.report(&CliError::from(err))
    }
}

/// Marker: the failure has already been shown, exit non-zero quietly.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// The core notifies the surface itself, so the error only needs tagging.
pub fn reported(err: SyncError) -> anyhow::Error {
    debug!(code = %err.error_code(), error = %err, "command failed");
    anyhow::Error::new(err).context(Reported)
}

pub fn finish(result: Result<Outcome, SyncError>) -> anyhow::Result<()> {
    match result {
        Ok(Outcome::Applied) => Ok(()),
        Ok(Outcome::Declined) => {
            info!("declined, nothing sent");
            Ok(())
        }
        Err(err) => Err(reported(err)),
    }
}

/// Prompted value for an edit, or the flag value when one was given.
pub fn field_or_prompt(
    flag: Option<&str>,
    label: &str,
    current: &str,
) -> anyhow::Result<String> {
    match flag {
        Some(value) => Ok(value.to_string()),
        None => crate::terminal::prompt_line(label, current),
    }
}
