use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io;
use crate::io::logging;
use crate::io::store::TaskStore;
use crate::model::task::Task;
use crate::ops::repository::{RepoError, Repository};
use crate::ops::summary::{category_summary, filter_regex, task_matches};
use crate::ops::task_ops::{NewTask, TaskError};

use super::form::{AddForm, EditForm};
use super::input;
use super::render;
use super::text_input::TextInput;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a filter pattern
    Filter,
    /// Multi-step add form (`App::add_form`)
    Add,
    /// Title editor (`App::edit_form`)
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

/// The last status message, shown until replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

/// Main application state
pub struct App {
    pub repo: Repository,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Cursor index into `visible()`
    pub cursor: usize,
    /// First visible task row
    pub scroll_offset: usize,
    /// Help overlay visible
    pub show_help: bool,
    pub add_form: Option<AddForm>,
    pub edit_form: Option<EditForm>,
    /// Filter prompt buffer while in Filter mode
    pub filter_input: TextInput,
    /// Applied filter pattern
    pub filter: Option<String>,
    pub message: Option<Message>,
    /// Fixed clock for tests
    pub pinned_now: Option<DateTime<Utc>>,
}

impl App {
    pub fn new(repo: Repository, theme: Theme) -> Self {
        App {
            repo,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            cursor: 0,
            scroll_offset: 0,
            show_help: false,
            add_form: None,
            edit_form: None,
            filter_input: TextInput::default(),
            filter: None,
            message: None,
            pinned_now: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    /// Today's date in local time (what due dates are compared against)
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }

    pub fn filter_regex(&self) -> Option<Regex> {
        self.filter.as_deref().and_then(filter_regex)
    }

    /// Indices into the task list of the tasks that pass the filter
    pub fn visible(&self) -> Vec<usize> {
        let re = self.filter_regex();
        self.repo
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| re.as_ref().is_none_or(|re| task_matches(t, re)))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let idx = *self.visible().get(self.cursor)?;
        self.repo.tasks().get(idx)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn set_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            kind,
        });
    }

    fn report(&mut self, err: RepoError) {
        let text = match &err {
            RepoError::Task(TaskError::EmptyTitle) => "Title cannot be empty".to_string(),
            RepoError::Task(TaskError::NotFound(id)) => format!("Todo #{} not found", id),
            RepoError::Task(TaskError::IdsExhausted) => "No more todo ids available".to_string(),
            RepoError::Store(e) => format!("Could not save: {}", e),
        };
        tracing::warn!(error = %err, "operation failed");
        self.set_message(MessageKind::Error, text);
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn cursor_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_to_bottom(&mut self) {
        self.cursor = self.visible().len().saturating_sub(1);
    }

    /// Put the cursor on the task with `id`, if it is visible
    fn select_id(&mut self, id: u64) {
        let tasks = self.repo.tasks();
        if let Some(pos) = self.visible().iter().position(|&i| tasks[i].id == id) {
            self.cursor = pos;
        }
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    pub fn start_add(&mut self) {
        self.add_form = Some(AddForm::new());
        self.mode = Mode::Add;
    }

    pub fn start_edit(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_message(MessageKind::Info, "Nothing to edit");
            return;
        };
        self.edit_form = Some(EditForm::new(task.id, &task.title));
        self.mode = Mode::Edit;
    }

    /// Leave any form and return to the list
    pub fn close_form(&mut self) {
        self.add_form = None;
        self.edit_form = None;
        self.mode = Mode::Navigate;
    }

    /// Save the finished add form. A failed write keeps the form open with
    /// its draft so the user can retry.
    pub fn commit_add(&mut self, new: NewTask) {
        match self.repo.add(new) {
            Ok(id) => {
                self.close_form();
                let title = self.repo.find(id).map(|t| t.title.clone()).unwrap_or_default();
                self.set_message(MessageKind::Success, format!("Added: {}", title));
                self.select_id(id);
            }
            Err(e @ RepoError::Store(_)) => self.report(e),
            Err(e) => {
                self.close_form();
                self.report(e);
            }
        }
    }

    pub fn commit_edit(&mut self, id: u64, title: &str) {
        match self.repo.edit(id, title, None) {
            Ok(()) => {
                self.close_form();
                self.set_message(MessageKind::Success, format!("Updated: {}", title));
            }
            Err(e @ RepoError::Store(_)) => self.report(e),
            Err(e) => {
                self.close_form();
                self.report(e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // List actions
    // -----------------------------------------------------------------------

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.repo.delete(id) {
            Ok(task) => {
                self.set_message(MessageKind::Success, format!("Deleted: {}", task.title));
                self.clamp_cursor();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.repo.toggle(id) {
            Ok(completed) => {
                let status = if completed { "completed" } else { "pending" };
                let title = self.repo.find(id).map(|t| t.title.clone()).unwrap_or_default();
                self.set_message(MessageKind::Success, format!("Marked as {}: {}", status, title));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn sort(&mut self) {
        let selected = self.selected_task().map(|t| t.id);
        match self.repo.sort() {
            Ok(()) => {
                self.set_message(MessageKind::Info, "Todos sorted by priority and due date");
                if let Some(id) = selected {
                    self.select_id(id);
                }
            }
            Err(e) => self.report(e),
        }
    }

    pub fn show_categories(&mut self) {
        let text = category_summary(self.repo.list()).unwrap_or_else(|| "No categories found".into());
        self.set_message(MessageKind::Info, text);
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    pub fn start_filter(&mut self) {
        self.filter_input = TextInput::with_value(self.filter.clone().unwrap_or_default());
        self.mode = Mode::Filter;
    }

    pub fn apply_filter(&mut self) {
        let pattern = self.filter_input.value().trim().to_string();
        self.filter = if pattern.is_empty() { None } else { Some(pattern) };
        self.mode = Mode::Navigate;
        self.cursor = 0;
        self.scroll_offset = 0;
        if self.filter.is_some() {
            let n = self.visible().len();
            self.set_message(MessageKind::Info, format!("{} matching", n));
        }
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.filter_input.clear();
        self.mode = Mode::Navigate;
        self.clamp_cursor();
    }
}

/// Run the TUI application
pub fn run(file: Option<&Path>, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(config_path)?;
    let level = config.ui.log_level.as_deref().unwrap_or("info");
    let _log_guard = logging::init_file_logging(config.ui.log_file.as_deref(), level);

    let path = config_io::resolve_task_file(file, &config);
    tracing::info!(path = %path.display(), "starting tui");
    let repo = Repository::open(TaskStore::new(path));
    let mut app = App::new(repo, Theme::from_config(&config.ui));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
