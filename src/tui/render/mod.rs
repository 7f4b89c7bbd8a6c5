pub mod form_view;
pub mod help_overlay;
pub mod list_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use regex::Regex;

use crate::ops::summary::task_counts;
use crate::tui::app::{App, Mode};

pub const LIST_HELP: &str =
    "Press 'a' to add, 'e' to edit, 'd' to delete, 'space' to toggle, 's' to sort, 'c' for categories, '/' to filter, '?' for help, 'q' to quit";

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title bar | content | status row | help line
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + spacer
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
            Constraint::Length(1), // help line
        ])
        .split(area);

    render_title_bar(frame, app, chunks[0]);

    match app.mode {
        Mode::Add | Mode::Edit => form_view::render_form_view(frame, app, chunks[1]),
        Mode::Navigate | Mode::Filter => list_view::render_list_view(frame, app, chunks[1]),
    }

    status_row::render_status_row(frame, app, chunks[2]);
    render_help_line(frame, app, chunks[3]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let stats = task_counts(app.repo.list());
    let spans = vec![
        Span::styled(
            " Todo List ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} total, {} completed, {} pending", stats.total, stats.completed, stats.pending),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        Rect { height: 1, ..area },
    );
}

fn render_help_line(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        Mode::Navigate => LIST_HELP,
        Mode::Filter => "Enter to apply, Esc to clear",
        Mode::Add => app
            .add_form
            .as_ref()
            .map(|f| f.step().hint())
            .unwrap_or_default(),
        Mode::Edit => "Press Enter to save, Esc to cancel",
    };
    let style = Style::default().fg(app.theme.dim).bg(app.theme.background);
    frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}

/// Push spans for text with regex match highlighting. Without a regex, or
/// without matches, pushes a single span with `base_style`.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    filter_re: Option<&Regex>,
) {
    let Some(re) = filter_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(text[last_end..m.start()].to_string(), base_style));
        }
        spans.push(Span::styled(text[m.start()..m.end()].to_string(), highlight_style));
        last_end = m.end();
    }
    if last_end < text.len() || last_end == 0 {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn layout_has_title_and_help() {
        let (_dir, mut app) = app_with_tasks(&["Buy milk"]);
        let out = render_app(&mut app, 140, 12);
        assert!(out.lines().next().unwrap().contains("Todo List"));
        assert!(out.contains("1 total, 0 completed, 1 pending"));
        assert!(out.contains("Press 'a' to add"));
    }

    #[test]
    fn add_mode_shows_form_hint() {
        let (_dir, mut app) = app_with_tasks(&[]);
        app.start_add();
        let out = render_app(&mut app, 80, 12);
        assert!(out.contains("Add New Todo"));
        assert!(out.contains("Press Enter to continue, Esc to cancel"));
        assert!(!out.contains("Press 'a' to add"));
    }

    #[test]
    fn highlighted_spans_split_on_matches() {
        let re = Regex::new("(?i)milk").unwrap();
        let mut spans = Vec::new();
        push_highlighted_spans(&mut spans, "Buy milk now", Style::default(), Style::default(), Some(&re));
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["Buy ", "milk", " now"]);

        let mut spans = Vec::new();
        push_highlighted_spans(&mut spans, "bread", Style::default(), Style::default(), Some(&re));
        assert_eq!(spans.len(), 1);
    }
}
