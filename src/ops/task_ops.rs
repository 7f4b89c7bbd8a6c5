use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::task::{Priority, Task, TaskList};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("todo #{0} not found")]
    NotFound(u64),
    #[error("no todo ids left")]
    IdsExhausted,
}

/// Fields collected for a new task. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Result of the CLI's one-way `complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed,
    AlreadyCompleted,
}

/// Trimmed title, or `EmptyTitle` if nothing is left
pub fn validate_title(title: &str) -> Result<&str, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        Err(TaskError::EmptyTitle)
    } else {
        Ok(title)
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task(list: &TaskList, id: u64) -> Option<&Task> {
    list.todos.iter().find(|t| t.id == id)
}

pub fn find_task_mut(list: &mut TaskList, id: u64) -> Option<&mut Task> {
    list.todos.iter_mut().find(|t| t.id == id)
}

fn position(list: &TaskList, id: u64) -> Result<usize, TaskError> {
    list.todos
        .iter()
        .position(|t| t.id == id)
        .ok_or(TaskError::NotFound(id))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a task and return its id
pub fn add_task(list: &mut TaskList, new: NewTask) -> Result<u64, TaskError> {
    add_task_at(list, new, Utc::now())
}

pub fn add_task_at(list: &mut TaskList, new: NewTask, now: DateTime<Utc>) -> Result<u64, TaskError> {
    let title = validate_title(&new.title)?;
    let id = fresh_id(list)?;
    let next_id = id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
    let mut task = Task::new(id, title, now);
    task.description = new.description.trim().to_string();
    task.priority = new.priority;
    task.category = new.category.trim().to_string();
    task.due_date = new.due_date;
    list.todos.push(task);
    list.next_id = next_id;
    Ok(id)
}

/// The counter, unless a loaded document left it at or below an existing id
fn fresh_id(list: &TaskList) -> Result<u64, TaskError> {
    match list.max_id() {
        Some(max) => Ok(max
            .checked_add(1)
            .ok_or(TaskError::IdsExhausted)?
            .max(list.next_id)),
        None => Ok(list.next_id),
    }
}

/// Change a task's title, and its description when one is given.
pub fn edit_task(
    list: &mut TaskList,
    id: u64,
    title: &str,
    description: Option<&str>,
) -> Result<(), TaskError> {
    let title = validate_title(title)?;
    let task = find_task_mut(list, id).ok_or(TaskError::NotFound(id))?;
    task.title = title.to_string();
    if let Some(desc) = description {
        task.description = desc.trim().to_string();
    }
    Ok(())
}

/// Flip completion. Returns the new `completed` value.
pub fn toggle_complete(list: &mut TaskList, id: u64) -> Result<bool, TaskError> {
    toggle_complete_at(list, id, Utc::now())
}

pub fn toggle_complete_at(list: &mut TaskList, id: u64, now: DateTime<Utc>) -> Result<bool, TaskError> {
    let task = find_task_mut(list, id).ok_or(TaskError::NotFound(id))?;
    set_completed(task, !task.completed, now);
    Ok(task.completed)
}

/// Mark done without toggling back
pub fn complete_task(list: &mut TaskList, id: u64) -> Result<CompleteOutcome, TaskError> {
    complete_task_at(list, id, Utc::now())
}

pub fn complete_task_at(
    list: &mut TaskList,
    id: u64,
    now: DateTime<Utc>,
) -> Result<CompleteOutcome, TaskError> {
    let task = find_task_mut(list, id).ok_or(TaskError::NotFound(id))?;
    if task.completed {
        return Ok(CompleteOutcome::AlreadyCompleted);
    }
    set_completed(task, true, now);
    Ok(CompleteOutcome::Completed)
}

/// Completion bookkeeping: `completed_at` is only ever set while completed
fn set_completed(task: &mut Task, completed: bool, now: DateTime<Utc>) {
    if task.completed == completed {
        return;
    }
    task.completed = completed;
    task.completed_at = if completed { Some(now) } else { None };
}

/// Remove a task and hand it back. Its id is never reissued.
pub fn delete_task(list: &mut TaskList, id: u64) -> Result<Task, TaskError> {
    let idx = position(list, id)?;
    Ok(list.todos.remove(idx))
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Incomplete first, then priority high to low, then dated before undated
/// (earliest due first), then newest first.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn sort_tasks(list: &mut TaskList) {
    list.todos.sort_by(compare_tasks);
}
