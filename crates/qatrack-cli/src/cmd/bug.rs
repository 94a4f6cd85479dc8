//! `qat bug`: bug reports found during the session.

use clap::Subcommand;
use qatrack_core::model::BugId;

use super::{Context, field_or_prompt, finish, reported};

#[derive(Subcommand, Debug)]
pub enum BugCommand {
    /// Report a bug.
    Add {
        title: String,

        #[arg(short, long)]
        description: String,
    },
    /// Change a bug; prompts for whichever field is omitted.
    Edit {
        id: BugId,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a bug.
    Rm { id: BugId },
}

pub fn run_bug(ctx: &Context, command: &BugCommand) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    match command {
        BugCommand::Add { title, description } => finish(sync.save_bug(title, description, None)),
        BugCommand::Edit {
            id,
            title: Some(title),
            description: Some(description),
        } => finish(sync.save_bug(title, description, Some(*id))),
        BugCommand::Edit {
            id,
            title,
            description,
        } => {
            finish(sync.load())?;
            let mut form = sync.open_bug_modal(Some(*id)).map_err(reported)?;
            form.text = field_or_prompt(title.as_deref(), "Title", &form.text)?;
            let current = form.description.take().unwrap_or_default();
            form.description = Some(field_or_prompt(
                description.as_deref(),
                "Description",
                &current,
            )?);
            finish(sync.submit_modal(&form))
        }
        BugCommand::Rm { id } => finish(sync.delete_bug(*id)),
    }
}
