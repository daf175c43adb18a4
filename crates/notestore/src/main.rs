//! `notes` - CLI for notestore
//!
//! This binary opens the note store described by the configuration, applies
//! one command to it, and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::Parser;

use notestore::cli::{
    report_change, AddCommand, Cli, Command, ConfigCommand, EditCommand, ListCommand, MoveCommand,
    RemoveCommand,
};
use notestore::{init_logging, Config, Error, Note, NoteStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration, then let flags override it
    let mut config = Config::load_from(cli.config.clone())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::Edit(cmd) => handle_edit(&config, cmd),
        Command::Remove(cmd) => handle_remove(&config, cmd),
        Command::Move(cmd) => handle_move(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<NoteStore> {
    let mut store = NoteStore::from_config(config)
        .with_context(|| format!("cannot open notes at {}", config.notes_path().display()))?;
    store.subscribe(report_change);
    Ok(store)
}

fn handle_list(config: &Config, cmd: &ListCommand) -> Result<()> {
    let store = open_store(config)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(store.notes())?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    for (index, note) in store.notes().iter().enumerate() {
        println!("{index:>3}  {}", note.title);
        if !note.description.is_empty() {
            println!("     {}", note.description);
        }
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: AddCommand) -> Result<()> {
    let mut store = open_store(config)?;
    let note = Note::new(cmd.title, cmd.description);
    let id = note.id;

    store.create(note).context("failed to add note")?;
    println!("Added note {id}");
    Ok(())
}

fn handle_edit(config: &Config, cmd: EditCommand) -> Result<()> {
    if cmd.title.is_none() && cmd.description.is_none() {
        bail!("nothing to change; pass --title and/or --description");
    }

    let mut store = open_store(config)?;
    let current = store
        .get(cmd.index)
        .cloned()
        .ok_or_else(|| Error::index_out_of_range(cmd.index, store.len()))?;

    let title = cmd.title.unwrap_or_else(|| current.title.clone());
    let description = cmd.description.unwrap_or_else(|| current.description.clone());

    store
        .update(current.edited(title, description), cmd.index)
        .context("failed to edit note")?;
    println!("Updated note {}", cmd.index);
    Ok(())
}

fn handle_remove(config: &Config, cmd: RemoveCommand) -> Result<()> {
    let mut store = open_store(config)?;
    let removed = store.delete(cmd.indices).context("failed to remove notes")?;

    for note in &removed {
        println!("Removed \"{}\"", note.title);
    }
    Ok(())
}

fn handle_move(config: &Config, cmd: MoveCommand) -> Result<()> {
    let mut store = open_store(config)?;
    let count = cmd.indices.len();

    store
        .move_items(cmd.indices, cmd.to)
        .context("failed to move notes")?;
    println!("Moved {count} note(s) to position {}", cmd.to);
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let stats = store.stats();

    if json {
        let status = serde_json::json!({
            "notes_path": store.path(),
            "note_count": stats.note_count,
            "file_size_bytes": stats.file_size_bytes,
            "failure_policy": store.policy(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("notes status");
        println!("------------");
        println!("Notes file:     {}", store.path().display());
        println!("Notes:          {}", stats.note_count);
        println!("File size:      {} bytes", stats.file_size_bytes);
        println!("Failure policy: {}", store.policy());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Notes path:     {}", config.notes_path().display());
                println!("  Pretty JSON:    {}", config.storage.pretty);
                println!();
                println!("[Failure]");
                println!("  Policy:         {}", config.failure_policy());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { config_file } => {
            let path = config_file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
