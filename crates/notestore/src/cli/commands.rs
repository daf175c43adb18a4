//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Note title
    pub title: String,

    /// Note description
    #[arg(default_value = "")]
    pub description: String,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Position of the note to edit (as shown by `list`)
    pub index: usize,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Positions of the notes to remove
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<usize>,
}

/// Move command arguments.
#[derive(Debug, Args)]
pub struct MoveCommand {
    /// Positions of the notes to move
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<usize>,

    /// Position the first moved note ends up at
    #[arg(short, long)]
    pub to: usize,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(value_name = "FILE")]
        config_file: Option<PathBuf>,
    },
}
