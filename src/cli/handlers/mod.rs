mod remote;

use std::error::Error;

use clap::CommandFactory;
use clap::error::ErrorKind;

use crate::cli::commands::*;
use crate::cli::output::Printer;
use crate::io::config_io;
use crate::io::store::TaskStore;
use crate::model::config::Config;
use crate::ops::repository::{RepoError, Repository};
use crate::ops::task_ops::{CompleteOutcome, NewTask, TaskError};

/// Everything a command needs
pub struct Context {
    pub repo: Repository,
    pub config: Config,
    pub out: Printer,
}

impl Context {
    pub fn open(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let config = config_io::load_config(cli.config.as_deref())?;
        let path = config_io::resolve_task_file(cli.file.as_deref(), &config);
        tracing::debug!(path = %path.display(), "using task file");
        Ok(Context {
            repo: Repository::open(TaskStore::new(path)),
            config,
            out: Printer::detect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Report a command-line parse failure. Returns the exit code: usage
/// problems never fail the process.
pub fn report_parse_error(err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::InvalidSubcommand => {
            let _ = err.print();
            println!();
            print_help();
        }
        _ => {
            let _ = err.print();
        }
    }
    0
}

pub fn print_help() {
    let _ = Cli::command().print_long_help();
}

/// Run a parsed command line. Errors are reserved for failures to write
/// the task document (or to read config); everything else is reported
/// inline and returns Ok.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let command = match cli.command {
        None | Some(Commands::Help) => {
            print_help();
            return Ok(());
        }
        Some(ref cmd) => cmd,
    };

    let mut ctx = Context::open(&cli)?;
    match command {
        Commands::Add(args) => cmd_add(&mut ctx, args),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Complete(args) => cmd_complete(&mut ctx, args),
        Commands::Delete(args) => cmd_delete(&mut ctx, args),
        Commands::Edit(args) => cmd_edit(&mut ctx, args),
        Commands::Save(args) => remote::cmd_save(&mut ctx, args),
        Commands::Load(args) => remote::cmd_load(&mut ctx, args),
        Commands::Sync(args) => remote::cmd_sync(&mut ctx, args),
        Commands::Upload => remote::cmd_upload(&mut ctx),
        Commands::Download => remote::cmd_download(&mut ctx),
        Commands::Help => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub const INVALID_ID: &str = "Invalid ID. Please provide a number.";

/// Parse a positive numeric id, printing the usual complaint otherwise
fn parse_id(text: &str) -> Option<u64> {
    match text.trim().parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("{}", INVALID_ID);
            None
        }
    }
}

pub fn task_error_message(err: &TaskError) -> String {
    match err {
        TaskError::EmptyTitle => "Title cannot be empty".to_string(),
        TaskError::NotFound(id) => format!("Todo #{} not found", id),
        TaskError::IdsExhausted => "No more todo ids available".to_string(),
    }
}

/// Print domain errors; pass store failures up so the process exits 1
fn report(ctx: &Context, err: RepoError) -> Result<(), Box<dyn Error>> {
    match err {
        RepoError::Task(e) => {
            ctx.out.error(&task_error_message(&e));
            Ok(())
        }
        RepoError::Store(e) => Err(Box::new(e)),
    }
}

// ---------------------------------------------------------------------------
// Local commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: &AddArgs) -> Result<(), Box<dyn Error>> {
    let new = NewTask::titled(args.title.as_str()).with_description(args.description_text());
    match ctx.repo.add(new) {
        Ok(id) => {
            let title = ctx.repo.find(id).map(|t| t.title.clone()).unwrap_or_default();
            ctx.out.success(&format!("Added todo #{}: {}", id, title));
            Ok(())
        }
        Err(e) => report(ctx, e),
    }
}

fn cmd_list(ctx: &Context, args: &ListArgs) -> Result<(), Box<dyn Error>> {
    if args.json {
        let json = serde_json::to_string_pretty(&crate::cli::output::list_json(ctx.repo.list()))?;
        println!("{}", json);
        return Ok(());
    }
    for line in ctx.out.task_table(ctx.repo.list()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_complete(ctx: &mut Context, args: &IdArgs) -> Result<(), Box<dyn Error>> {
    let Some(id) = parse_id(&args.id) else {
        return Ok(());
    };
    match ctx.repo.complete(id) {
        Ok(CompleteOutcome::Completed) => {
            let title = ctx.repo.find(id).map(|t| t.title.clone()).unwrap_or_default();
            ctx.out.success(&format!("Completed todo #{}: {}", id, title));
            Ok(())
        }
        Ok(CompleteOutcome::AlreadyCompleted) => {
            ctx.out.warning(&format!("Todo #{} is already completed", id));
            Ok(())
        }
        Err(e) => report(ctx, e),
    }
}

fn cmd_delete(ctx: &mut Context, args: &IdArgs) -> Result<(), Box<dyn Error>> {
    let Some(id) = parse_id(&args.id) else {
        return Ok(());
    };
    match ctx.repo.delete(id) {
        Ok(task) => {
            ctx.out.success(&format!("Deleted todo #{}: {}", id, task.title));
            Ok(())
        }
        Err(e) => report(ctx, e),
    }
}

fn cmd_edit(ctx: &mut Context, args: &EditArgs) -> Result<(), Box<dyn Error>> {
    let Some(id) = parse_id(&args.id) else {
        return Ok(());
    };
    let old_title = ctx.repo.find(id).map(|t| t.title.clone());
    let description = args.description_text();
    match ctx.repo.edit(id, &args.title, Some(&description)) {
        Ok(()) => {
            let new_title = ctx.repo.find(id).map(|t| t.title.clone()).unwrap_or_default();
            ctx.out.success(&format!(
                "Updated todo #{}: {} → {}",
                id,
                old_title.unwrap_or_default(),
                new_title
            ));
            Ok(())
        }
        Err(e) => report(ctx, e),
    }
}
