pub mod drive;
pub mod http;
pub mod oauth;

use crate::io::store::StoreError;
use crate::model::task::TaskList;
use crate::ops::merge::MergeReport;
use crate::ops::repository::Repository;

/// Error type for remote transfers
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not parse remote tasks: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

/// Somewhere a whole task list can be fetched from and stored to.
pub trait RemoteStore {
    /// Human-readable location, for messages
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<TaskList, SyncError>;
    fn store(&self, list: &TaskList) -> Result<(), SyncError>;
}

/// What `sync` ended up doing
#[derive(Debug)]
pub enum SyncOutcome {
    /// Fetched, merged, saved locally and pushed back
    Merged(MergeReport),
    /// The fetch failed, so only the local list was pushed
    PushedOnly { fetch_error: SyncError, pushed: usize },
}

/// Upload the local list. Returns the number of tasks sent.
pub fn push(repo: &Repository, remote: &dyn RemoteStore) -> Result<usize, SyncError> {
    remote.store(repo.list())?;
    tracing::info!(remote = %remote.describe(), tasks = repo.list().len(), "pushed tasks");
    Ok(repo.list().len())
}

/// Replace the local list with the remote one. Returns the number received.
pub fn pull(repo: &mut Repository, remote: &dyn RemoteStore) -> Result<usize, SyncError> {
    let list = remote.fetch()?;
    let count = list.len();
    repo.replace(list)?;
    tracing::info!(remote = %remote.describe(), tasks = count, "pulled tasks");
    Ok(count)
}

/// Whether a failed fetch means "nothing usable over there" rather than
/// "something is over there that we could not read". Only the former may be
/// overwritten by a push.
fn fetch_failure_allows_push(err: &SyncError) -> bool {
    matches!(
        err,
        SyncError::Transport(_) | SyncError::Status { .. } | SyncError::NotFound(_)
    )
}

/// Fetch, merge (local wins), save locally, push the result back. An
/// unreachable or missing remote degrades to a plain push of the unmodified
/// local list. A remote that answered with an unreadable document is left
/// untouched and the error is returned.
pub fn sync(repo: &mut Repository, remote: &dyn RemoteStore) -> Result<SyncOutcome, SyncError> {
    let fetched = match remote.fetch() {
        Ok(list) => list,
        Err(fetch_error) if !fetch_failure_allows_push(&fetch_error) => {
            tracing::warn!(
                remote = %remote.describe(),
                error = %fetch_error,
                "fetch failed; leaving remote untouched"
            );
            return Err(fetch_error);
        }
        Err(fetch_error) => {
            tracing::warn!(
                remote = %remote.describe(),
                error = %fetch_error,
                "fetch failed; pushing local tasks instead"
            );
            let pushed = push(repo, remote)?;
            return Ok(SyncOutcome::PushedOnly {
                fetch_error,
                pushed,
            });
        }
    };

    let report = repo.merge_with(&fetched)?;
    remote.store(repo.list())?;
    tracing::info!(
        remote = %remote.describe(),
        local = report.local,
        remote_only = report.remote_only,
        shadowed = report.shadowed,
        "synced tasks"
    );
    Ok(SyncOutcome::Merged(report))
}
