//! `qat item`: manage and check off checklist items.

use clap::Subcommand;
use qatrack_core::model::{HeadingId, ItemId};

use super::{Context, finish, reported};
use crate::terminal::prompt_line;

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Add an item under a heading.
    Add { heading: HeadingId, text: String },
    /// Change an item's text; prompts with the current text when --text is omitted.
    Edit {
        heading: HeadingId,
        item: ItemId,

        #[arg(long)]
        text: Option<String>,
    },
    /// Delete an item.
    Rm { heading: HeadingId, item: ItemId },
    /// Mark an item as tested.
    Check { heading: HeadingId, item: ItemId },
    /// Clear an item's tested mark.
    Uncheck { heading: HeadingId, item: ItemId },
}

pub fn run_item(ctx: &Context, command: &ItemCommand) -> anyhow::Result<()> {
    let mut sync = ctx.synchronizer();
    match command {
        ItemCommand::Add { heading, text } => finish(sync.save_item(*heading, text, None)),
        ItemCommand::Edit {
            heading,
            item,
            text: Some(text),
        } => finish(sync.save_item(*heading, text, Some(*item))),
        ItemCommand::Edit {
            heading,
            item,
            text: None,
        } => {
            finish(sync.load())?;
            let mut form = sync
                .open_item_modal(*heading, Some(*item))
                .map_err(reported)?;
            form.text = prompt_line(form.caption, &form.text)?;
            finish(sync.submit_modal(&form))
        }
        ItemCommand::Rm { heading, item } => finish(sync.delete_item(*heading, *item)),
        ItemCommand::Check { heading, item } => {
            finish(sync.load())?;
            finish(sync.toggle_item(*heading, *item, true))
        }
        ItemCommand::Uncheck { heading, item } => {
            finish(sync.load())?;
            finish(sync.toggle_item(*heading, *item, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: ItemCommand,
    }

    #[test]
    fn ids_accept_hash_prefix() {
        let w = Wrapper::parse_from(["test", "uncheck", "#2", "#5"]);
        assert!(matches!(
            w.command,
            ItemCommand::Uncheck { heading: HeadingId(2), item: ItemId(5) }
        ));
    }

    #[test]
    fn add_requires_text() {
        assert!(Wrapper::try_parse_from(["test", "add", "2"]).is_err());
    }
}
