use std::collections::HashSet;

use crate::model::task::TaskList;

/// Counts describing what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Tasks kept from the local side
    pub local: usize,
    /// Remote tasks appended because their id was new
    pub remote_only: usize,
    /// Remote tasks dropped because the local side had the same id
    pub shadowed: usize,
}

impl MergeReport {
    pub fn total(&self) -> usize {
        self.local + self.remote_only
    }
}

/// Union by id. Local tasks come first in their original order, then remote
/// tasks with unseen ids in remote order. On an id collision the local copy
/// wins outright; there is no field-level merge.
pub fn merge(local: &TaskList, remote: &TaskList) -> TaskList {
    merge_with_report(local, remote).0
}

pub fn merge_with_report(local: &TaskList, remote: &TaskList) -> (TaskList, MergeReport) {
    let mut seen: HashSet<u64> = HashSet::with_capacity(local.len() + remote.len());
    let mut todos = Vec::with_capacity(local.len() + remote.len());
    let mut report = MergeReport::default();

    for task in &local.todos {
        if seen.insert(task.id) {
            todos.push(task.clone());
            report.local += 1;
        }
    }
    for task in &remote.todos {
        if seen.insert(task.id) {
            todos.push(task.clone());
            report.remote_only += 1;
        } else {
            report.shadowed += 1;
        }
    }

    // A remote document may carry a counter behind its own ids
    let above_max = todos.iter().map(|t| t.id.saturating_add(1)).max().unwrap_or(1);
    let next_id = local.next_id.max(remote.next_id).max(above_max);

    (TaskList { todos, next_id }, report)
}
