use std::path::PathBuf;

use clap::Parser;
use todos::io::config_io::{CONFIG_ENV, FILE_ENV};

/// Terminal UI for the todo list
#[derive(Parser)]
#[command(name = "todo-tui", version)]
struct TuiArgs {
    /// Task document to use (default: todos.json in the working directory)
    #[arg(short = 'f', long = "file", env = FILE_ENV)]
    file: Option<PathBuf>,

    /// Config file (default: <config dir>/todos/config.toml)
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

fn main() {
    let args = TuiArgs::parse();
    if let Err(e) = todos::tui::run(args.file.as_deref(), args.config.as_deref()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
