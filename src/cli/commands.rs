use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::config_io::{CONFIG_ENV, FILE_ENV};

#[derive(Parser)]
#[command(
    name = "todo",
    about = concat!("todo v", env!("CARGO_PKG_VERSION"), " - a small task tracker with remote sync"),
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Task document to use (default: todos.json in the working directory)
    #[arg(short = 'f', long = "file", global = true, env = FILE_ENV)]
    pub file: Option<PathBuf>,

    /// Config file (default: <config dir>/todos/config.toml)
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new todo
    #[command(visible_alias = "a")]
    Add(AddArgs),
    /// List all todos
    #[command(visible_alias = "l")]
    List(ListArgs),
    /// Mark a todo as completed
    #[command(visible_alias = "c")]
    Complete(IdArgs),
    /// Delete a todo
    #[command(visible_alias = "d")]
    Delete(IdArgs),
    /// Edit a todo's title and description
    #[command(visible_alias = "e")]
    Edit(EditArgs),
    /// Save todos to a server
    #[command(visible_alias = "s")]
    Save(RemoteArgs),
    /// Load todos from a server, replacing the local list
    #[command(visible_alias = "ld")]
    Load(RemoteArgs),
    /// Merge with a server (local wins) and push the result back
    Sync(RemoteArgs),
    /// Upload todos to Google Drive
    #[command(visible_alias = "up")]
    Upload,
    /// Download todos from Google Drive, replacing the local list
    #[command(visible_alias = "down")]
    Download,
    /// Show this help message
    #[command(visible_alias = "h")]
    Help,
}

// ---------------------------------------------------------------------------
// Local command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Todo title
    pub title: String,
    /// Optional description (remaining words are joined)
    #[arg(trailing_var_arg = true)]
    pub description: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Ids are taken as text so a bad value gets a friendly message instead
/// of a usage error
#[derive(Args)]
pub struct IdArgs {
    /// Todo ID
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Todo ID
    pub id: String,
    /// New title
    pub title: String,
    /// New description (remaining words are joined; omitted clears it)
    #[arg(trailing_var_arg = true)]
    pub description: Vec<String>,
}

// ---------------------------------------------------------------------------
// Remote command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RemoteArgs {
    /// Server base URL, or "-" for [remote].url from the config file
    pub url: String,
    /// Basic-auth username
    pub user: Option<String>,
    /// Basic-auth password
    pub pass: Option<String>,
}

impl AddArgs {
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }
}

impl EditArgs {
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }
}
