//! `qat theme`: display preference stored in the user config.

use std::io::Write;

use clap::Subcommand;
use qatrack_core::config::{self, ClientConfig};
use qatrack_core::error::ErrorCode;
use qatrack_core::theme::Theme;
use serde::Serialize;
use tracing::info;

use super::Context;
use crate::output::{CliError, render_mode};

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Print the current theme.
    Show,
    /// Switch between light and dark.
    Toggle,
    /// Set the theme explicitly.
    Set { theme: Theme },
}

#[derive(Debug, Serialize)]
struct ThemeReport {
    theme: Theme,
    icon: &'static str,
}

pub fn run_theme(ctx: &Context, command: &ThemeCommand) -> anyhow::Result<()> {
    let mut user_config = config::load_config().map_err(|err| {
        ctx.report(&CliError::with_code(
            format!("{err:#}"),
            ErrorCode::ConfigParseError,
        ))
    })?;

    let theme = match command {
        ThemeCommand::Show => user_config.ui.theme,
        ThemeCommand::Toggle => {
            let next = user_config.ui.theme.toggled();
            store(ctx, &mut user_config, next)?
        }
        ThemeCommand::Set { theme } => store(ctx, &mut user_config, *theme)?,
    };

    let report = ThemeReport {
        theme,
        icon: theme.icon(),
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}", r.theme),
        |r, w| writeln!(w, "Theme: {} {}", r.theme, r.icon),
    )
}

fn store(ctx: &Context, user_config: &mut ClientConfig, theme: Theme) -> anyhow::Result<Theme> {
    user_config.ui.theme = theme;
    let path = config::save_config(user_config).map_err(|err| {
        ctx.report(&CliError::with_code(
            format!("{err:#}"),
            ErrorCode::ConfigWriteFailed,
        ))
    })?;
    info!(%theme, path = %path.display(), "theme saved");
    Ok(theme)
}
