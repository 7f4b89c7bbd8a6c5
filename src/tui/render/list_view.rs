use chrono::NaiveDate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::{DueStatus, Priority, Task};
use crate::tui::app::App;
use crate::tui::theme::Theme;

use super::push_highlighted_spans;

/// Screen rows per task: title line plus detail line
const ROWS_PER_TASK: usize = 2;

pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴 HIGH",
        Priority::Medium => "🟡 MED",
        Priority::Low => "🟢 LOW",
    }
}

/// Due-date label, e.g. "⚠️ Overdue (May 9)"
pub fn due_label(status: DueStatus) -> String {
    let fmt = |d: NaiveDate| d.format("%b %-d").to_string();
    match status {
        DueStatus::Overdue(d) => format!("⚠️ Overdue ({})", fmt(d)),
        DueStatus::Soon(d) => format!("⏰ Due soon ({})", fmt(d)),
        DueStatus::Later(d) => format!("📅 Due {}", fmt(d)),
    }
}

/// Keep the cursor inside the visible window
fn adjust_scroll(app: &mut App, visible_tasks: usize) {
    if visible_tasks == 0 {
        app.scroll_offset = 0;
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_tasks {
        app.scroll_offset = app.cursor + 1 - visible_tasks;
    }
}

pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let visible = app.visible();

    if visible.is_empty() {
        let text = match &app.filter {
            Some(pattern) => format!("  No todos match /{}", pattern),
            None => "  No todos yet. Press 'a' to add one.".to_string(),
        };
        let line = Line::from(Span::styled(text, Style::default().fg(app.theme.dim).bg(bg)));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    app.clamp_cursor();
    let per_page = (area.height as usize / ROWS_PER_TASK).max(1);
    adjust_scroll(app, per_page);

    let today = app.today();
    let filter_re = app.filter_regex();
    let mut lines: Vec<Line> = Vec::new();
    for (row, &idx) in visible.iter().enumerate().skip(app.scroll_offset).take(per_page) {
        let task = &app.repo.tasks()[idx];
        let selected = row == app.cursor;
        let (title, detail) = task_lines(task, &app.theme, selected, today, filter_re.as_ref());
        lines.push(title);
        lines.push(detail);
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn task_lines<'a>(
    task: &Task,
    theme: &Theme,
    selected: bool,
    today: NaiveDate,
    filter_re: Option<&regex::Regex>,
) -> (Line<'a>, Line<'a>) {
    let bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().bg(bg);

    // Title line
    let marker = if selected { "▌ " } else { "  " };
    let title_style = if task.completed {
        base.fg(theme.completed).add_modifier(Modifier::CROSSED_OUT)
    } else {
        base.fg(theme.pending)
    };
    let match_style = title_style.fg(theme.text_bright).add_modifier(Modifier::UNDERLINED);
    let mut title = vec![
        Span::styled(marker, base.fg(theme.highlight)),
        Span::styled(format!("#{} ", task.id), base.fg(theme.dim)),
    ];
    push_highlighted_spans(&mut title, &task.title, title_style, match_style, filter_re);

    // Detail line: priority | status | category | due | description
    let sep = || Span::styled(" | ", base.fg(theme.dim));
    let mut detail = vec![
        Span::styled("    ", base),
        Span::styled(priority_badge(task.priority), base.fg(theme.priority_color(task.priority))),
        sep(),
        Span::styled(
            if task.completed { "✅ Completed" } else { "⏳ Pending" },
            base.fg(theme.text),
        ),
    ];
    if !task.category.is_empty() {
        detail.push(sep());
        detail.push(Span::styled(format!("📁 {}", task.category), base.fg(theme.text)));
    }
    if let Some(status) = task.due_status(today) {
        let color = match status {
            DueStatus::Overdue(_) | DueStatus::Soon(_) => theme.warning,
            DueStatus::Later(_) => theme.info,
        };
        detail.push(sep());
        detail.push(Span::styled(due_label(status), base.fg(color)));
    }
    detail.push(sep());
    if task.description.is_empty() {
        detail.push(Span::styled("No description", base.fg(theme.dim)));
    } else {
        detail.push(Span::styled(task.description.clone(), base.fg(theme.text)));
    }

    (Line::from(title).style(base), Line::from(detail).style(base))
}
