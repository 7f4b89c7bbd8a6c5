use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task priority, lowest first so the derived ordering matches urgency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority name. Accepts the short forms shown in the UI.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "l" | "1" => Some(Priority::Low),
            "medium" | "med" | "m" | "2" => Some(Priority::Medium),
            "high" | "h" | "3" => Some(Priority::High),
            _ => None,
        }
    }
}

impl From<String> for Priority {
    /// Anything unrecognized (including the empty string) is low
    fn from(s: String) -> Self {
        Priority::parse(&s).unwrap_or_default()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(
        default,
        deserialize_with = "deserialize_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A fresh, incomplete task with default metadata
    pub fn new(id: u64, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            title: title.into(),
            description: String::new(),
            completed: false,
            created_at,
            priority: Priority::Low,
            category: String::new(),
            due_date: None,
            completed_at: None,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// How the due date reads relative to `today`. Completed tasks are never
    /// overdue or due soon.
    pub fn due_status(&self, today: NaiveDate) -> Option<DueStatus> {
        let due = self.due_date?;
        if self.completed {
            return Some(DueStatus::Later(due));
        }
        if due < today {
            Some(DueStatus::Overdue(due))
        } else if due <= today + Days::new(1) {
            Some(DueStatus::Soon(due))
        } else {
            Some(DueStatus::Later(due))
        }
    }
}

/// Due-date urgency for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue(NaiveDate),
    /// Today or tomorrow
    Soon(NaiveDate),
    Later(NaiveDate),
}

/// The whole persisted collection: tasks in display order plus the id counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub todos: Vec<Task>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList {
            todos: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl TaskList {
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.todos.iter().any(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Largest id present, if any
    pub fn max_id(&self) -> Option<u64> {
        self.todos.iter().map(|t| t.id).max()
    }
}

/// Due dates are written as `YYYY-MM-DD`, but older documents stored a full
/// RFC 3339 timestamp. Accept both and keep only the date.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(serde::de::Error::custom)
}
