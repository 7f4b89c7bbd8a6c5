use crate::io::store::{StoreError, TaskStore};
use crate::model::task::{Task, TaskList};
use crate::ops::merge::{MergeReport, merge_with_report};
use crate::ops::task_ops::{self, CompleteOutcome, NewTask, TaskError};

/// Error type for persisted task operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The in-memory task list paired with its document.
///
/// Every mutating method saves before returning. If the operation is
/// rejected, or the save fails, the in-memory list is left as it was, so
/// memory and disk never disagree.
#[derive(Debug)]
pub struct Repository {
    store: TaskStore,
    list: TaskList,
}

impl Repository {
    pub fn new(store: TaskStore, list: TaskList) -> Self {
        Repository { store, list }
    }

    /// Open with the startup fallback policy (missing or corrupt -> empty)
    pub fn open(store: TaskStore) -> Self {
        let list = store.load_or_default();
        Repository { store, list }
    }

    /// Open, surfacing a corrupt or unreadable document as an error
    pub fn open_strict(store: TaskStore) -> Result<Self, StoreError> {
        let list = store.load()?;
        Ok(Repository { store, list })
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn tasks(&self) -> &[Task] {
        &self.list.todos
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        task_ops::find_task(&self.list, id)
    }

    /// Run `op` on a scratch copy; commit it only once it is on disk.
    fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut TaskList) -> Result<T, TaskError>,
    ) -> Result<T, RepoError> {
        let mut next = self.list.clone();
        let out = op(&mut next)?;
        self.store.save(&next)?;
        self.list = next;
        Ok(out)
    }

    pub fn add(&mut self, new: NewTask) -> Result<u64, RepoError> {
        let id = self.apply(|list| task_ops::add_task(list, new))?;
        tracing::info!(id, "added task");
        Ok(id)
    }

    pub fn edit(&mut self, id: u64, title: &str, description: Option<&str>) -> Result<(), RepoError> {
        self.apply(|list| task_ops::edit_task(list, id, title, description))?;
        tracing::info!(id, "edited task");
        Ok(())
    }

    pub fn toggle(&mut self, id: u64) -> Result<bool, RepoError> {
        let completed = self.apply(|list| task_ops::toggle_complete(list, id))?;
        tracing::info!(id, completed, "toggled task");
        Ok(completed)
    }

    /// One-way completion. Nothing is written when already completed.
    pub fn complete(&mut self, id: u64) -> Result<CompleteOutcome, RepoError> {
        let done = self.find(id).ok_or(TaskError::NotFound(id))?.completed;
        if done {
            return Ok(CompleteOutcome::AlreadyCompleted);
        }
        let outcome = self.apply(|list| task_ops::complete_task(list, id))?;
        tracing::info!(id, "completed task");
        Ok(outcome)
    }

    pub fn delete(&mut self, id: u64) -> Result<Task, RepoError> {
        let removed = self.apply(|list| task_ops::delete_task(list, id))?;
        tracing::info!(id, "deleted task");
        Ok(removed)
    }

    pub fn sort(&mut self) -> Result<(), RepoError> {
        self.apply(|list| {
            task_ops::sort_tasks(list);
            Ok(())
        })
    }

    /// Replace everything with `list` (pull)
    pub fn replace(&mut self, list: TaskList) -> Result<(), StoreError> {
        self.store.save(&list)?;
        self.list = list;
        Ok(())
    }

    /// Merge `remote` into the local list, local wins (sync)
    pub fn merge_with(&mut self, remote: &TaskList) -> Result<MergeReport, StoreError> {
        let (merged, report) = merge_with_report(&self.list, remote);
        self.store.save(&merged)?;
        self.list = merged;
        Ok(report)
    }
}
