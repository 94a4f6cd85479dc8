//! `qat heading`: add, rename or remove checklist headings.

use clap::Subcommand;
use qatrack_core::model::HeadingId;

use super::{Context, finish, reported};
use crate::terminal::prompt_line;

#[derive(Subcommand, Debug)]
pub enum HeadingCommand {
    /// Append a heading to the checklist.
    Add {
        /// Heading title.
        title: String,
    },
    /// Rename a heading; prompts with the current title when --title is omitted.
    Edit {
        id: HeadingId,

        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a heading and every item under it.
    Rm { id: HeadingId },
}

pub fn run_heading(ctx: &Context, command: &HeadingCommand) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    match command {
        HeadingCommand::Add { title } => finish(sync.save_heading(title, None)),
        HeadingCommand::Edit {
            id,
            title: Some(title),
        } => finish(sync.save_heading(title, Some(*id))),
        HeadingCommand::Edit { id, title: None } => {
            finish(sync.load())?;
            let mut form = sync.open_heading_modal(Some(*id)).map_err(reported)?;
            form.text = prompt_line(form.caption, &form.text)?;
            finish(sync.submit_modal(&form))
        }
        HeadingCommand::Rm { id } => finish(sync.delete_heading(*id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: HeadingCommand,
    }

    #[test]
    fn edit_title_is_optional() {
        let w = Wrapper::parse_from(["test", "edit", "3"]);
        assert!(matches!(
            w.command,
            HeadingCommand::Edit { id: HeadingId(3), title: None }
        ));
    }

    #[test]
    fn add_keeps_title_verbatim() {
        let w = Wrapper::parse_from(["test", "add", "  Login Flow "]);
        match w.command {
            HeadingCommand::Add { title } => assert_eq!(title, "  Login Flow "),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
