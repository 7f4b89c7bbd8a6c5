use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, MessageKind, Mode};
use crate::util::unicode::display_width;

/// Render the status row above the help line
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Filter => {
            // Filter prompt: /pattern▌
            let mut spans = vec![
                Span::styled(
                    format!("/{}", app.filter_input.value()),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            push_right_hint(&mut spans, "Enter filter  Esc clear", width, app);
            Line::from(spans)
        }
        _ => match (&app.message, &app.filter) {
            (Some(msg), _) => {
                let color = match msg.kind {
                    MessageKind::Success => app.theme.success,
                    MessageKind::Error => app.theme.error,
                    MessageKind::Info => app.theme.info,
                };
                Line::from(Span::styled(msg.text.clone(), Style::default().fg(color).bg(bg)))
            }
            (None, Some(pattern)) => {
                let mut spans = vec![Span::styled(
                    format!("/{}", pattern),
                    Style::default().fg(app.theme.dim).bg(bg),
                )];
                push_right_hint(&mut spans, "Esc clear", width, app);
                Line::from(spans)
            }
            (None, None) => Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg))),
        },
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

/// Right-align a dim hint when there is room
fn push_right_hint<'a>(spans: &mut Vec<Span<'a>>, hint: &'a str, width: usize, app: &App) {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::*;
    use super::*;

    fn status(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn filter_prompt_with_hint() {
        let (_dir, mut app) = app_with_tasks(&[]);
        app.start_filter();
        app.filter_input.set("mil");
        let out = status(&app);
        assert!(out.starts_with("/mil\u{258C}"));
        assert!(out.ends_with("Enter filter  Esc clear"));
    }

    #[test]
    fn message_wins_over_filter() {
        let (_dir, mut app) = app_with_tasks(&[]);
        app.filter = Some("milk".into());
        assert!(status(&app).starts_with("/milk"));
        app.set_message(MessageKind::Success, "Added: bread");
        assert_eq!(status(&app), "Added: bread");
    }

    #[test]
    fn blank_without_message() {
        let (_dir, app) = app_with_tasks(&[]);
        assert_eq!(status(&app), "");
    }
}
