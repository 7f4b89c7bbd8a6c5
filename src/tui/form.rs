//! Add/edit form state machines.
//!
//! Pure state: nothing here touches the repository. The app turns a
//! `FormOutcome::Commit` into exactly one repository call.

use chrono::NaiveDate;

use crate::model::task::Priority;
use crate::ops::task_ops::NewTask;

use super::text_input::TextInput;

/// Steps of the add form, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Title,
    Description,
    Category,
    Priority,
    DueDate,
}

impl FormStep {
    pub fn next(self) -> Option<FormStep> {
        match self {
            FormStep::Title => Some(FormStep::Description),
            FormStep::Description => Some(FormStep::Category),
            FormStep::Category => Some(FormStep::Priority),
            FormStep::Priority => Some(FormStep::DueDate),
            FormStep::DueDate => None,
        }
    }

    pub fn prev(self) -> Option<FormStep> {
        match self {
            FormStep::Title => None,
            FormStep::Description => Some(FormStep::Title),
            FormStep::Category => Some(FormStep::Description),
            FormStep::Priority => Some(FormStep::Category),
            FormStep::DueDate => Some(FormStep::Priority),
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            FormStep::Title => "➕ Add New Todo",
            FormStep::Description => "📝 Add Description",
            FormStep::Category => "📁 Add Category",
            FormStep::Priority => "🎯 Select Priority",
            FormStep::DueDate => "📅 Set Due Date",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            FormStep::Title => "Press Enter to continue, Esc to cancel",
            FormStep::Description | FormStep::Category => "Press Enter to continue, Esc to go back",
            FormStep::Priority => "Press 1-3 to select priority, Enter to keep, Esc to go back",
            FormStep::DueDate => "Enter a date as YYYY-MM-DD, or leave empty. Enter to save, Esc to go back",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormStep::Title => "What needs to be done?",
            FormStep::Description => "Description (optional)",
            FormStep::Category => "Category (optional)",
            FormStep::Priority => "",
            FormStep::DueDate => "YYYY-MM-DD (optional)",
        }
    }

    /// Whether the step edits text (priority is chosen with keys)
    pub fn has_text(self) -> bool {
        self != FormStep::Priority
    }
}

/// Every field collected so far, kept across back/forward moves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub due_date_text: String,
}

impl TaskDraft {
    fn field_mut(&mut self, step: FormStep) -> Option<&mut String> {
        match step {
            FormStep::Title => Some(&mut self.title),
            FormStep::Description => Some(&mut self.description),
            FormStep::Category => Some(&mut self.category),
            FormStep::DueDate => Some(&mut self.due_date_text),
            FormStep::Priority => None,
        }
    }

    fn field(&self, step: FormStep) -> &str {
        match step {
            FormStep::Title => &self.title,
            FormStep::Description => &self.description,
            FormStep::Category => &self.category,
            FormStep::DueDate => &self.due_date_text,
            FormStep::Priority => "",
        }
    }
}

/// Result of feeding the form a confirm or back action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<T> {
    /// Still open (moved, or showing an error)
    Stay,
    Commit(T),
    Cancel,
}

pub const EMPTY_TITLE: &str = "Title cannot be empty";
pub const BAD_DATE: &str = "Invalid date, use YYYY-MM-DD";

/// Empty means no due date
pub fn parse_due_date(text: &str) -> Result<Option<NaiveDate>, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| BAD_DATE)
}

/// The multi-step add form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    step: FormStep,
    draft: TaskDraft,
    /// Edit buffer for the current text step
    pub input: TextInput,
    pub error: Option<&'static str>,
}

impl Default for AddForm {
    fn default() -> Self {
        AddForm {
            step: FormStep::Title,
            draft: TaskDraft::default(),
            input: TextInput::default(),
            error: None,
        }
    }
}

impl AddForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn priority(&self) -> Priority {
        self.draft.priority
    }

    /// Copy the edit buffer into the draft
    fn store_input(&mut self) {
        let value = self.input.value().to_string();
        if let Some(field) = self.draft.field_mut(self.step) {
            *field = value;
        }
    }

    fn enter(&mut self, step: FormStep) {
        self.step = step;
        self.input = TextInput::with_value(self.draft.field(step));
        self.error = None;
    }

    /// Enter: validate the current step and move on. From the last step,
    /// commit the finished task.
    pub fn advance(&mut self) -> FormOutcome<NewTask> {
        self.store_input();
        match self.step {
            FormStep::Title if self.draft.title.trim().is_empty() => {
                self.error = Some(EMPTY_TITLE);
                return FormOutcome::Stay;
            }
            FormStep::DueDate => {
                return match parse_due_date(&self.draft.due_date_text) {
                    Ok(due_date) => FormOutcome::Commit(NewTask {
                        title: self.draft.title.clone(),
                        description: self.draft.description.clone(),
                        priority: self.draft.priority,
                        category: self.draft.category.clone(),
                        due_date,
                    }),
                    Err(msg) => {
                        self.error = Some(msg);
                        FormOutcome::Stay
                    }
                };
            }
            _ => {}
        }
        if let Some(next) = self.step.next() {
            self.enter(next);
        }
        FormOutcome::Stay
    }

    /// Esc: previous step, keeping every field. Cancels from the first step.
    pub fn back(&mut self) -> FormOutcome<NewTask> {
        self.store_input();
        match self.step.prev() {
            Some(prev) => {
                self.enter(prev);
                FormOutcome::Stay
            }
            None => FormOutcome::Cancel,
        }
    }

    /// Priority keys 1/2/3: choose and advance. Ignored on other steps.
    pub fn choose_priority(&mut self, priority: Priority) -> FormOutcome<NewTask> {
        if self.step != FormStep::Priority {
            return FormOutcome::Stay;
        }
        self.draft.priority = priority;
        self.advance()
    }
}

/// Single-screen title editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub id: u64,
    pub input: TextInput,
    pub error: Option<&'static str>,
}

impl EditForm {
    pub fn new(id: u64, title: &str) -> Self {
        EditForm {
            id,
            input: TextInput::with_value(title),
            error: None,
        }
    }

    /// Enter: commit the trimmed title, or stay open with an error
    pub fn submit(&mut self) -> FormOutcome<String> {
        let title = self.input.value().trim();
        if title.is_empty() {
            self.error = Some(EMPTY_TITLE);
            return FormOutcome::Stay;
        }
        FormOutcome::Commit(title.to_string())
    }
}
