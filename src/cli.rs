//! Command-line interface definition for Scribe
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for notes, chat, settings, and saved excerpts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scribe - local notes and an AI chat assistant
///
/// Keeps titled notes and chat sessions in a local database and talks to an
/// OpenAI-compatible completion endpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "scribe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/scribe.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the databases (overrides config and SCRIBE_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Scribe
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage notes
    Notes {
        /// Notes subcommand
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Chat with the assistant
    Chat {
        /// Chat subcommand
        #[command(subcommand)]
        command: ChatCommand,
    },

    /// Show or change the chat credential and model
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Manage saved assistant replies
    Excerpts {
        /// Excerpts subcommand
        #[command(subcommand)]
        command: ExcerptsCommand,
    },
}

/// Notes subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum NotesCommand {
    /// List all notes sorted by title
    List,

    /// Show a single note
    Show {
        /// Title of the note
        title: String,
    },

    /// Create a note, or update one when --previous is given
    Save {
        /// Note title
        #[arg(short, long)]
        title: String,

        /// Note body
        #[arg(short, long, default_value = "")]
        body: String,

        /// Title the note was loaded under (renames it when different)
        #[arg(short, long)]
        previous: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Title of the note
        title: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Chat subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatCommand {
    /// Send one message in the most recent session
    Send {
        /// Message text
        message: String,
    },

    /// Start an interactive chat
    Repl,

    /// Start a new session
    New,

    /// List sessions, newest first
    Sessions,

    /// Show a session transcript (defaults to the most recent)
    Show {
        /// Session id
        id: Option<String>,
    },

    /// Delete every session
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current model and whether an API key is stored
    Show,

    /// Store the API key and optionally the model
    Set {
        /// API key for the completion endpoint
        #[arg(long)]
        api_key: String,

        /// Model identifier, e.g. google/gemma-3-27b-it:free
        #[arg(short, long)]
        model: Option<String>,
    },
}

/// Excerpt subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ExcerptsCommand {
    /// List saved excerpts, newest first
    List,

    /// Show a saved excerpt
    Show {
        /// Excerpt id
        id: String,
    },

    /// Save text as an excerpt (defaults to the latest assistant reply)
    Save {
        /// Text to save instead of the latest reply
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a saved excerpt
    Delete {
        /// Excerpt id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/scribe.yaml".to_string()),
            verbose: false,
            data_dir: None,
            command: Commands::Notes {
                command: NotesCommand::List,
            },
        }
    }
}
