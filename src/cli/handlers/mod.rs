use std::io::Read;
use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::edit::drag::DragCommit;
use crate::edit::session::Session;
use crate::io::config_io;
use crate::io::logging;
use crate::io::store::{JsonFileStore, Store};
use crate::model::{Config, Document, ItemId};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the TUI (no subcommand) or a one-shot command
pub fn dispatch(cli: Cli) -> CmdResult {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config_io::default_config_path);
    let config = config_io::read_config(&config_path)?;
    let data_path = cli.file.clone().unwrap_or_else(config_io::default_data_path);

    let Some(command) = cli.command else {
        let log_path = config
            .ui
            .log_file
            .clone()
            .unwrap_or_else(|| logging::default_log_path(&data_path));
        let _log_guard = match logging::init_file_logging(&log_path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("warning: logging disabled ({}): {}", log_path.display(), e);
                None
            }
        };
        return crate::tui::run(&data_path, &config);
    };

    if let Err(e) = logging::init_stderr_logging() {
        eprintln!("warning: logging disabled: {}", e);
    }
    let json = cli.json;
    let mut session = load_session(data_path, &config)?;

    match command {
        Commands::List => cmd_list(&session, json),
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Check(args) => cmd_set_checked(&mut session, args.id, true),
        Commands::Uncheck(args) => cmd_set_checked(&mut session, args.id, false),
        Commands::Edit(args) => cmd_edit(&mut session, args),
        Commands::Rm(args) => cmd_rm(&mut session, args),
        Commands::Mv(args) => cmd_mv(&mut session, args),
        Commands::Paste(args) => cmd_paste(&mut session, args, json),
        Commands::EditMode(args) => cmd_edit_mode(&mut session, args),
        Commands::Reset(args) => cmd_reset(&mut session, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open the checklist for a one-shot command. Unlike the TUI, a file that
/// can't be read is an error: the command would otherwise overwrite it.
fn load_session(
    path: PathBuf,
    config: &Config,
) -> Result<Session<JsonFileStore>, Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(path);
    let doc = store
        .load()?
        .map(Document::normalize)
        .unwrap_or_default();
    Ok(Session::with_document(store, doc, config))
}

fn require_item(session: &Session<JsonFileStore>, id: ItemId) -> CmdResult {
    if session.document().contains(id) {
        Ok(())
    } else {
        Err(format!("no item with id {}", id).into())
    }
}

/// Surface a failed save as the command's error
fn saved(session: &mut Session<JsonFileStore>) -> CmdResult {
    match session.take_save_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &Session<JsonFileStore>, json: bool) -> CmdResult {
    let doc = session.document();
    if json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(doc))?);
    } else {
        for line in format_list(doc) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_add(session: &mut Session<JsonFileStore>, args: AddArgs, json: bool) -> CmdResult {
    let id = match args.after {
        Some(after) => {
            require_item(session, after)?;
            let id = session
                .insert_after(after)
                .ok_or_else(|| format!("could not insert after {}", after))?;
            session.set_text(id, &args.text);
            session.end_typing();
            id
        }
        None => session
            .append(&args.text)
            .ok_or("no item id left to assign")?,
    };
    saved(session)?;
    if json {
        println!("{}", serde_json::to_string(&IdJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_set_checked(session: &mut Session<JsonFileStore>, id: ItemId, checked: bool) -> CmdResult {
    require_item(session, id)?;
    session.set_checked(id, checked);
    saved(session)
}

fn cmd_edit(session: &mut Session<JsonFileStore>, args: EditArgs) -> CmdResult {
    require_item(session, args.id)?;
    session.set_text(args.id, &args.text);
    session.end_typing();
    saved(session)
}

fn cmd_rm(session: &mut Session<JsonFileStore>, args: IdArgs) -> CmdResult {
    require_item(session, args.id)?;
    if !session.document().edit {
        return Err("deleting needs edit mode (tick edit-mode on)".into());
    }
    session.delete(args.id);
    saved(session)
}

fn cmd_mv(session: &mut Session<JsonFileStore>, args: MvArgs) -> CmdResult {
    for id in &args.ids {
        require_item(session, *id)?;
    }
    if !session.document().edit {
        return Err("moving needs edit mode (tick edit-mode on)".into());
    }
    session.commit_drag(&DragCommit {
        ids: args.ids,
        slot: args.to,
    });
    saved(session)
}

fn cmd_paste(session: &mut Session<JsonFileStore>, args: PasteArgs, json: bool) -> CmdResult {
    require_item(session, args.id)?;
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    // A trailing newline from the shell is not an extra line
    let text = text.strip_suffix('\n').unwrap_or(&text);
    let text = text.strip_suffix('\r').unwrap_or(text);

    let cursor = args.cursor.unwrap_or_else(|| {
        session
            .document()
            .get(args.id)
            .map_or(0, |item| item.text.chars().count())
    });
    session.paste(args.id, cursor, text);
    session.end_typing();
    saved(session)?;

    if let Some(focus) = session.take_focus() {
        if json {
            println!("{}", serde_json::to_string(&IdJson { id: focus })?);
        } else {
            println!("{}", focus);
        }
    }
    Ok(())
}

fn cmd_edit_mode(session: &mut Session<JsonFileStore>, args: EditModeArgs) -> CmdResult {
    session.set_edit_mode(args.state == Toggle::On);
    saved(session)
}

fn cmd_reset(session: &mut Session<JsonFileStore>, args: ResetArgs) -> CmdResult {
    if !args.yes {
        return Err("reset clears every item; pass --yes to confirm".into());
    }
    session.reset();
    saved(session)
}
