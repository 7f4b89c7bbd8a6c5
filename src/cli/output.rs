use std::io::IsTerminal;

use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;
use serde::Serialize;

use crate::model::task::{Task, TaskList};
use crate::ops::summary::task_counts;
use crate::util::unicode::pad_to_width;

// ---------------------------------------------------------------------------
// Styled status lines
// ---------------------------------------------------------------------------

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Progress,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✅",
            Tone::Error => "❌",
            Tone::Warning => "⚠️ ",
            Tone::Info => "ℹ️ ",
            Tone::Progress => "🔄",
        }
    }
}

/// Formats CLI output, with or without ANSI styling
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Printer {
    /// Color only when stdout is a terminal and NO_COLOR is unset
    pub fn detect() -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Printer { color }
    }

    pub fn plain() -> Self {
        Printer { color: false }
    }

    pub fn status_line(&self, tone: Tone, message: &str) -> String {
        let text = format!("{} {}", tone.icon(), message);
        if !self.color {
            return text;
        }
        let styled = match tone {
            Tone::Success => text.green(),
            Tone::Error => text.red(),
            Tone::Warning => text.yellow(),
            Tone::Info => text.blue(),
            Tone::Progress => text.cyan(),
        };
        styled.bold().to_string()
    }

    pub fn say(&self, tone: Tone, message: &str) {
        println!("{}", self.status_line(tone, message));
    }

    pub fn success(&self, message: &str) {
        self.say(Tone::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.say(Tone::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.say(Tone::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.say(Tone::Info, message);
    }

    pub fn progress(&self, message: &str) {
        self.say(Tone::Progress, message);
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dim().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// The `list` table, header to summary
    pub fn task_table(&self, list: &TaskList) -> Vec<String> {
        let mut lines = vec![self.heading("📝 Your Todos"), String::new()];

        if list.is_empty() {
            lines.extend(boxed("No todos found. Add one with 'todo add <title>'"));
            lines.push(String::new());
            return lines;
        }

        lines.push(format!(
            "{} {} {} {} {} {}",
            pad_to_width("ID", ID_W),
            pad_to_width("ST", ST_W),
            pad_to_width("TITLE", TITLE_W),
            pad_to_width("DESCRIPTION", DESC_W),
            pad_to_width("STATUS", STATUS_W),
            "DATE"
        ));
        lines.push("-".repeat(RULE_W));
        for task in &list.todos {
            lines.push(task_row(task));
        }

        let stats = task_counts(list);
        lines.push(String::new());
        lines.push(self.dim(&format!(
            "📊 Summary: {} total, {} completed, {} pending",
            stats.total, stats.completed, stats.pending
        )));
        lines.push(String::new());
        lines
    }
}

// ---------------------------------------------------------------------------
// Table layout
// ---------------------------------------------------------------------------

const ID_W: usize = 3;
const ST_W: usize = 2;
const TITLE_W: usize = 30;
const DESC_W: usize = 50;
const STATUS_W: usize = 15;
const RULE_W: usize = 125;

fn format_time(t: &DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One table row. The date column shows completion time once completed.
pub fn task_row(task: &Task) -> String {
    let (icon, status) = if task.completed {
        ("✅", "Completed")
    } else {
        ("⏳", "Pending")
    };
    let when = match (task.completed, task.completed_at.as_ref()) {
        (true, Some(done)) => format_time(done),
        _ => format_time(&task.created_at),
    };
    format!(
        "{} {} {} {} {} {}",
        pad_to_width(&task.id.to_string(), ID_W),
        pad_to_width(icon, ST_W),
        pad_to_width(&task.title, TITLE_W),
        pad_to_width(&task.description, DESC_W),
        pad_to_width(status, STATUS_W),
        when
    )
}

/// Single message in a box drawing frame
fn boxed(text: &str) -> Vec<String> {
    let inner = crate::util::unicode::display_width(text) + 2;
    vec![
        format!("┌{}┐", "─".repeat(inner)),
        format!("│ {} │", text),
        format!("└{}┘", "─".repeat(inner)),
    ]
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub todos: &'a [Task],
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

pub fn list_json(list: &TaskList) -> ListJson<'_> {
    let stats = task_counts(list);
    ListJson {
        todos: &list.todos,
        total: stats.total,
        completed: stats.completed,
        pending: stats.pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: u64, title: &str) -> Task {
        Task::new(id, title, Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap())
    }

    #[test]
    fn plain_status_lines() {
        let p = Printer::plain();
        assert_eq!(p.status_line(Tone::Success, "Added todo #1: x"), "✅ Added todo #1: x");
        assert_eq!(p.status_line(Tone::Error, "Todo #9 not found"), "❌ Todo #9 not found");
    }

    #[test]
    fn colored_lines_carry_escape_codes() {
        let p = Printer { color: true };
        let line = p.status_line(Tone::Error, "boom");
        assert!(line.contains("\u{1b}["));
        assert!(line.contains("boom"));
    }

    #[test]
    fn empty_table_has_hint() {
        let lines = Printer::plain().task_table(&TaskList::default());
        assert!(lines.iter().any(|l| l.contains("No todos found")));
        assert!(!lines.iter().any(|l| l.contains("Summary")));
    }

    #[test]
    fn table_rows_and_summary() {
        let mut list = TaskList {
            todos: vec![task(1, "Buy milk"), task(2, &"x".repeat(40))],
            next_id: 3,
        };
        list.todos[0].completed = true;
        let lines = Printer::plain().task_table(&list);
        assert!(lines[2].starts_with("ID  ST TITLE"));
        let row = lines.iter().find(|l| l.contains("Buy milk")).unwrap();
        assert!(row.contains("Completed"));
        let long = lines.iter().find(|l| l.starts_with("2 ")).unwrap();
        assert!(long.contains(&format!("{}...", "x".repeat(27))));
        assert!(lines.iter().any(|l| l == "📊 Summary: 2 total, 1 completed, 1 pending"));
    }

    #[test]
    fn completed_row_shows_completion_time() {
        let mut t = task(1, "a");
        t.completed = true;
        t.completed_at = Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 0).unwrap());
        assert!(task_row(&t).contains("2030-01-0"));
    }

    #[test]
    fn json_counts() {
        let mut list = TaskList {
            todos: vec![task(1, "a"), task(2, "b")],
            next_id: 3,
        };
        list.todos[1].completed = true;
        let value = serde_json::to_value(list_json(&list)).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["completed"], 1);
        assert_eq!(value["todos"][0]["title"], "a");
    }
}
