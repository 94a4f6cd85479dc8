#![forbid(unsafe_code)]

mod cmd;
mod output;
mod terminal;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use qatrack_core::config;
use std::env;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "qatrack: QA session checklist tracker",
    long_about = None
)]
struct Cli {
    /// Log debug detail (requests, snapshot reloads) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Collaborator base URL (overrides QAT_SERVER and the config file).
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Session",
        about = "Show the current session",
        after_help = "EXAMPLES:\n    # Show checklist, notes and bugs\n    qat show\n\n    # Emit machine-readable output\n    qat show --json"
    )]
    Show,

    #[command(
        next_help_heading = "Session",
        about = "Print rendered markup for every pane"
    )]
    Render,

    #[command(next_help_heading = "Session", about = "Set target website and start date")]
    Info {
        #[command(subcommand)]
        command: cmd::session::InfoCommand,
    },

    #[command(
        next_help_heading = "Session",
        about = "Archive the session to history",
        after_help = "EXAMPLES:\n    # Complete with today's date\n    qat complete\n\n    # Complete with an explicit end date, no prompt\n    qat complete --end-date 2024-03-08 --yes"
    )]
    Complete(cmd::session::CompleteArgs),

    #[command(next_help_heading = "Session", about = "Discard the session without archiving")]
    Reset,

    #[command(next_help_heading = "Checklist", about = "Manage checklist headings")]
    Heading {
        #[command(subcommand)]
        command: cmd::heading::HeadingCommand,
    },

    #[command(
        next_help_heading = "Checklist",
        about = "Manage checklist items",
        after_help = "EXAMPLES:\n    # Add an item under heading 3\n    qat item add 3 \"Valid password logs in\"\n\n    # Check it off\n    qat item check 3 1"
    )]
    Item {
        #[command(subcommand)]
        command: cmd::item::ItemCommand,
    },

    #[command(next_help_heading = "Findings", about = "Manage notes")]
    Note {
        #[command(subcommand)]
        command: cmd::note::NoteCommand,
    },

    #[command(next_help_heading = "Findings", about = "Manage bug reports")]
    Bug {
        #[command(subcommand)]
        command: cmd::bug::BugCommand,
    },

    #[command(next_help_heading = "History", about = "Browse archived sessions")]
    History {
        #[command(subcommand)]
        command: cmd::history::HistoryCommand,
    },

    #[command(next_help_heading = "Preferences", about = "Show or change the display theme")]
    Theme {
        #[command(subcommand)]
        command: cmd::theme::ThemeCommand,
    },

    #[command(
        next_help_heading = "Preferences",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    qat completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

const DEFAULT_FILTER: &str = "qatrack=info,qat=info,warn";
const DEBUG_FILTER: &str = "qatrack=debug,qat=debug,info";

/// `--verbose` wins over `QAT_LOG`, which wins over `DEBUG`.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(DEBUG_FILTER);
    }
    EnvFilter::try_from_env("QAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            DEBUG_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

fn init_tracing(verbose: bool) {
    let filter = log_filter(verbose);

    let format = env::var("QAT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "starting");

    let user_config = config::load_config().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable config file");
        config::ClientConfig::default()
    });
    let ctx = cmd::Context {
        output: output::resolve_output_mode(cli.format, cli.json, &user_config),
        base_url: config::base_url_from_env(cli.server.as_deref(), &user_config),
        assume_yes: cli.yes,
        theme: user_config.ui.theme,
    };

    let command_result = match cli.command {
        Commands::Show => cmd::session::run_show(&ctx),
        Commands::Render => cmd::session::run_render(&ctx),
        Commands::Info { command } => cmd::session::run_info(&ctx, &command),
        Commands::Complete(args) => cmd::session::run_complete(&ctx, &args),
        Commands::Reset => cmd::session::run_reset(&ctx),
        Commands::Heading { command } => cmd::heading::run_heading(&ctx, &command),
        Commands::Item { command } => cmd::item::run_item(&ctx, &command),
        Commands::Note { command } => cmd::note::run_note(&ctx, &command),
        Commands::Bug { command } => cmd::bug::run_bug(&ctx, &command),
        Commands::History { command } => cmd::history::run_history(&ctx, &command),
        Commands::Theme { command } => cmd::theme::run_theme(&ctx, &command),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    match command_result {
        // Already shown to the tester through the surface.
        Err(err) if err.downcast_ref::<cmd::Reported>().is_some() => std::process::exit(1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qatrack_core::model::{HeadingId, ItemId};

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from(["qat", "--server", "http://qa:8080", "--yes", "reset"]);
        assert_eq!(cli.server.as_deref(), Some("http://qa:8080"));
        assert!(cli.yes);
        assert!(matches!(cli.command, Commands::Reset));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["qat", "show", "--format", "text", "-y"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(cli.yes);
    }

    #[test]
    fn verbose_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["qat", "show", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn default_filter_covers_the_binary_target() {
        assert!(DEFAULT_FILTER.contains("qat=info"));
        assert!(DEBUG_FILTER.contains("qat=debug"));
        assert!(DEBUG_FILTER.contains("qatrack=debug"));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["qat", "history", "list", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn item_check_parses_ids() {
        let cli = Cli::parse_from(["qat", "item", "check", "3", "#7"]);
        match cli.command {
            Commands::Item {
                command: cmd::item::ItemCommand::Check { heading, item },
            } => {
                assert_eq!(heading, HeadingId(3));
                assert_eq!(item, ItemId(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        assert!(Cli::try_parse_from(["qat", "heading", "rm", "login"]).is_err());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["qat", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["qat", "show"],
            vec!["qat", "render"],
            vec!["qat", "info", "set", "--website", "example.com", "--date", "2024-01-01"],
            vec!["qat", "complete", "--end-date", "2024-01-09"],
            vec!["qat", "reset"],
            vec!["qat", "heading", "add", "Login"],
            vec!["qat", "heading", "edit", "1", "--title", "Auth"],
            vec!["qat", "heading", "rm", "1"],
            vec!["qat", "item", "add", "1", "Valid password"],
            vec!["qat", "item", "edit", "1", "2"],
            vec!["qat", "item", "rm", "1", "2"],
            vec!["qat", "item", "uncheck", "1", "2"],
            vec!["qat", "note", "add", "Slow on 3G"],
            vec!["qat", "note", "edit", "4", "--text", "Slow on 2G"],
            vec!["qat", "note", "rm", "4"],
            vec!["qat", "bug", "add", "Crash", "--description", "On submit"],
            vec!["qat", "bug", "edit", "2", "--title", "Crash on submit"],
            vec!["qat", "bug", "rm", "2"],
            vec!["qat", "history", "list"],
            vec!["qat", "history", "rm", "1"],
            vec!["qat", "theme", "show"],
            vec!["qat", "theme", "toggle"],
            vec!["qat", "theme", "set", "dark"],
            vec!["qat", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }
}
