use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "TODO_LOG";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// CLI logging: stderr, warnings only unless `verbose`.
///
/// stdout stays reserved for command output so `todo list --json` can be piped.
pub fn init_cli_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .without_time()
        .with_target(false)
        .try_init();
}

/// TUI logging: the terminal belongs to ratatui, so logs go to a file.
///
/// Returns `None` when the log file cannot be opened or a subscriber is
/// already installed. The returned guard flushes buffered entries when
/// dropped; hold it until shutdown.
pub fn init_file_logging(log_path: Option<&Path>, level: &str) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("todo-tui.log");
    let log_path = log_path.unwrap_or(&default_path);

    let log_dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", log_path.display(), e);
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter(level))
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn unopenable_log_path_disables_file_logging() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file.txt");
        fs::write(&blocker, "not a directory").unwrap();

        let guard = init_file_logging(Some(&blocker.join("sub").join("todo.log")), "info");
        assert!(guard.is_none());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
