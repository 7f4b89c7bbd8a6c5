use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::TaskStore;
use crate::model::task::TaskList;
use crate::ops::repository::Repository;
use crate::ops::task_ops::NewTask;
use crate::tui::app::App;
use crate::tui::theme::Theme;

pub const TERM_W: u16 = 80;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a fresh file in a temp dir, one pending task per title.
/// The clock is pinned to 2025-05-10 noon UTC.
pub fn app_with_tasks(titles: &[&str]) -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let store = TaskStore::new(dir.path().join("todos.json"));
    let mut repo = Repository::new(store, TaskList::default());
    for title in titles {
        repo.add(NewTask::titled(*title)).unwrap();
    }
    let mut app = App::new(repo, Theme::default());
    app.pinned_now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).single();
    (dir, app)
}

/// Render the whole screen
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| super::render(frame, app))
}
