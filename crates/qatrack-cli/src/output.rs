//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or
//! stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `ui.output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use qatrack_core::config::{self, ClientConfig};
use qatrack_core::error::ErrorCode;
use qatrack_core::theme::Theme;
use qatrack_core::validate::ValidationError;
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Section heading carrying the theme badge, for the top of a pretty view.
pub fn pretty_title(w: &mut dyn Write, theme: Theme, heading: &str) -> io::Result<()> {
    pretty_section(w, &format!("{} {heading}", theme.badge()))
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Plain text lines for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Resolve the output mode from flags, environment, config and TTY.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_config: &ClientConfig,
) -> OutputMode {
    format_flag
        .unwrap_or_else(|| OutputMode::from_name(config::output_from_env(json_flag, user_config)))
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error carrying the code's hint as its suggestion.
    pub fn with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&ValidationError> for CliError {
    fn from(err: &ValidationError) -> Self {
        Self {
            message: err.message.clone(),
            suggestion: err.suggestion.clone(),
            error_code: Some(err.code.code().to_string()),
        }
    }
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize + ?Sized>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Write an error in the requested format.
pub fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(w, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(w, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

/// Write a success message in the requested format.
pub fn write_success(w: &mut dyn Write, mode: OutputMode, message: &str) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "ok": true,
                "message": message,
            });
            serde_json::to_writer_pretty(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty => writeln!(w, "✓ {message}")?,
        OutputMode::Text => writeln!(w, "ok: {message}")?,
    }
    Ok(())
}

/// Render a success message to stdout.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_success(&mut out, mode, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("write succeeds");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn title_carries_theme_badge() {
        let text = written(|w| Ok(pretty_title(w, Theme::Dark, "Session")?));
        assert!(text.starts_with("🌙 Session\n"));
        let text = written(|w| Ok(pretty_title(w, Theme::Light, "History")?));
        assert!(text.starts_with("☀️ History\n"));
    }

    #[test]
    fn format_flag_wins_over_config() {
        let mut cfg = ClientConfig::default();
        cfg.ui.output = Some("json".into());
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), true, &cfg),
            OutputMode::Text
        );
    }

    #[test]
    fn json_flag_selects_json() {
        let mode = resolve_output_mode(None, true, &ClientConfig::default());
        assert!(mode.is_json());
    }

    #[test]
    fn validation_error_keeps_its_suggestion() {
        let err = ValidationError::new("start_date", "Please select a start date.", ErrorCode::MissingField)
            .with_suggestion("Use YYYY-MM-DD.");
        let cli = CliError::from(&err);
        assert_eq!(cli.message, "Please select a start date.");
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert_eq!(cli.suggestion.as_deref(), Some("Use YYYY-MM-DD."));
    }

    #[test]
    fn coded_error_pulls_hint() {
        let cli = CliError::with_code("Failed to load session.", ErrorCode::TransportFailed);
        assert_eq!(cli.error_code.as_deref(), Some("E2002"));
        assert!(cli.suggestion.is_some());
        assert!(CliError::new("plain").error_code.is_none());
    }

    #[test]
    fn json_error_is_wrapped() {
        let err = CliError::with_code("Please enter note text.", ErrorCode::MissingField);
        let text = written(|w| write_error(w, OutputMode::Json, &err));
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["error"]["message"], "Please enter note text.");
        assert_eq!(value["error"]["error_code"], "E1001");
        assert!(value["error"].get("suggestion").is_none());
    }

    #[test]
    fn human_error_shows_suggestion() {
        let err = CliError::with_code("Failed to load session.", ErrorCode::TransportFailed);
        let text = written(|w| write_error(w, OutputMode::Pretty, &err));
        assert!(text.starts_with("error: Failed to load session."));
        assert!(text.contains("  suggestion: Check that the server is running"));
    }

    #[test]
    fn success_formats_per_mode() {
        assert_eq!(
            written(|w| write_success(w, OutputMode::Pretty, "Note added!")),
            "✓ Note added!\n"
        );
        assert_eq!(
            written(|w| write_success(w, OutputMode::Text, "Note added!")),
            "ok: Note added!\n"
        );
        let json = written(|w| write_success(w, OutputMode::Json, "Note added!"));
        assert!(json.contains("\"ok\": true"));
    }
}
