//! Command-line interface for notestore.
//!
//! This module provides the CLI structure for the `notes` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

pub use commands::{
    AddCommand, ConfigCommand, EditCommand, ListCommand, MoveCommand, RemoveCommand,
    StatusCommand,
};

use crate::config::{Config, FailurePolicy};
use crate::logging::Verbosity;
use crate::note::Note;

/// notes - Keep a short list of notes in a local file
///
/// Notes are listed newest first. Every change rewrites the notes file.
#[derive(Debug, Parser)]
#[command(name = "notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the notes file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Fail on unreadable or unwritable notes files instead of carrying on
    #[arg(long, global = true)]
    pub strict: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List notes with their positions
    List(ListCommand),

    /// Add a note at the top of the list
    Add(AddCommand),

    /// Change the title or description of a note
    Edit(EditCommand),

    /// Remove notes by position
    Remove(RemoveCommand),

    /// Move notes to a new position
    Move(MoveCommand),

    /// Show where notes are stored and how many there are
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(file) = &self.file {
            config.storage.notes_path = Some(file.clone());
        }
        if self.strict {
            config.failure.policy = FailurePolicy::Strict;
        }
    }
}

/// Observer the binary subscribes to every store it opens.
pub fn report_change(notes: &[Note]) {
    debug!("Note list changed, now {} notes", notes.len());
}
