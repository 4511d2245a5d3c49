use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::ItemId;

#[derive(Parser)]
#[command(name = "tick", about = concat!("[x] tick v", env!("CARGO_PKG_VERSION"), " - a checklist you can drag around"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Checklist file (default: $TICK_FILE, else $XDG_DATA_HOME/tick/list.json)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/tick/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the list in display order
    List,
    /// Add an item (bottom of the active list, or after another item)
    Add(AddArgs),
    /// Check an item off
    Check(IdArgs),
    /// Mark an item active again
    Uncheck(IdArgs),
    /// Replace an item's text
    Edit(EditArgs),
    /// Delete an item (edit mode only)
    Rm(IdArgs),
    /// Move items as a block to a slot among the active items (edit mode
    /// only; checked items come back unchecked)
    Mv(MvArgs),
    /// Paste text from stdin into an item; extra lines become new items
    Paste(PasteArgs),
    /// Switch between edit mode and check mode
    EditMode(EditModeArgs),
    /// Clear the list back to one blank item
    Reset(ResetArgs),
}

#[derive(Args)]
pub struct IdArgs {
    /// Item ID
    pub id: ItemId,
}

#[derive(Args)]
pub struct AddArgs {
    /// Item text
    pub text: String,
    /// Insert directly after this item ID
    #[arg(long)]
    pub after: Option<ItemId>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Item ID
    pub id: ItemId,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Item IDs, moved in their current relative order
    #[arg(required = true)]
    pub ids: Vec<ItemId>,
    /// Slot among the remaining active items (0 = top)
    #[arg(long)]
    pub to: usize,
}

#[derive(Args)]
pub struct PasteArgs {
    /// Item ID
    pub id: ItemId,
    /// Character position to paste at (default: end of text)
    #[arg(long)]
    pub cursor: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args)]
pub struct EditModeArgs {
    pub state: Toggle,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}
