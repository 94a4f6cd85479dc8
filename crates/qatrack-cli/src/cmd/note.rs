//! `qat note`: free-form session notes.

use clap::Subcommand;
use qatrack_core::model::NoteId;

use super::{Context, finish, reported};
use crate::terminal::prompt_line;

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Add a note.
    Add { text: String },
    /// Change a note; prompts with the current text when --text is omitted.
    Edit {
        id: NoteId,

        #[arg(long)]
        text: Option<String>,
    },
    /// Delete a note.
    Rm { id: NoteId },
}

pub fn run_note(ctx: &Context, command: &NoteCommand) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    match command {
        NoteCommand::Add { text } => finish(sync.save_note(text, None)),
        NoteCommand::Edit {
            id,
            text: Some(text),
        } => finish(sync.save_note(text, Some(*id))),
        NoteCommand::Edit { id, text: None } => {
            finish(sync.load())?;
            let mut form = sync.open_note_modal(Some(*id)).map_err(reported)?;
            form.text = prompt_line(form.caption, &form.text)?;
            finish(sync.submit_modal(&form))
        }
        NoteCommand::Rm { id } => finish(sync.delete_note(*id)),
    }
}
