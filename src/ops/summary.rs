use indexmap::IndexMap;
use regex::Regex;

use crate::model::task::{Priority, Task, TaskList};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn task_counts(list: &TaskList) -> ListStats {
    let mut stats = ListStats::default();
    for task in &list.todos {
        stats.total += 1;
        if task.completed {
            stats.completed += 1;
        } else {
            stats.pending += 1;
        }
        match task.priority {
            Priority::High => stats.high += 1,
            Priority::Medium => stats.medium += 1,
            Priority::Low => stats.low += 1,
        }
    }
    stats
}

/// Tasks per category, in first-seen order. Uncategorized tasks are skipped.
pub fn category_counts(list: &TaskList) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for task in &list.todos {
        if !task.category.is_empty() {
            *counts.entry(task.category.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// One-line category summary for the status row
pub fn category_summary(list: &TaskList) -> Option<String> {
    let counts = category_counts(list);
    if counts.is_empty() {
        return None;
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(cat, n)| format!("{}: {} {}", cat, n, if *n == 1 { "todo" } else { "todos" }))
        .collect();
    Some(format!("Categories: {}", parts.join(", ")))
}

/// Compile a user filter: case-insensitive regex, or a literal match if the
/// pattern isn't valid regex.
pub fn filter_regex(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", pattern))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
        .ok()
}

/// Whether a task matches a filter on title, description or category
pub fn task_matches(task: &Task, re: &Regex) -> bool {
    re.is_match(&task.title) || re.is_match(&task.description) || re.is_match(&task.category)
}
