use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Priority;
use crate::tui::app::{App, Mode};
use crate::tui::form::FormStep;
use crate::tui::text_input::TextInput;
use crate::tui::theme::Theme;

const STEP_COUNT: usize = 5;

const PRIORITY_CHOICES: [(Priority, &str); 3] = [
    (Priority::Low, "1. Low (Green)"),
    (Priority::Medium, "2. Medium (Yellow)"),
    (Priority::High, "3. High (Red)"),
];

fn step_number(step: FormStep) -> usize {
    match step {
        FormStep::Title => 1,
        FormStep::Description => 2,
        FormStep::Category => 3,
        FormStep::Priority => 4,
        FormStep::DueDate => 5,
    }
}

pub fn render_form_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let heading_style = Style::default()
        .fg(theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_row = None;

    match (app.mode, &app.add_form, &app.edit_form) {
        (Mode::Add, Some(form), _) => {
            let step = form.step();
            lines.push(Line::from(Span::styled(format!("  {}", step.heading()), heading_style)));
            lines.push(Line::from(""));
            if step.has_text() {
                cursor_row = Some(lines.len());
                lines.push(input_line(&form.input, step.placeholder(), theme));
            } else {
                for (priority, label) in PRIORITY_CHOICES {
                    let chosen = priority == form.priority();
                    let marker = if chosen { "▸ " } else { "  " };
                    let mut style = Style::default().fg(theme.priority_color(priority)).bg(bg);
                    if chosen {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    lines.push(Line::from(Span::styled(format!("  {}{}", marker, label), style)));
                }
            }
            lines.push(Line::from(""));
            if let Some(err) = form.error {
                lines.push(Line::from(Span::styled(
                    format!("  {}", err),
                    Style::default().fg(theme.error).bg(bg),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!("  Step {} of {}", step_number(step), STEP_COUNT),
                Style::default().fg(theme.dim).bg(bg),
            )));
        }
        (Mode::Edit, _, Some(form)) => {
            lines.push(Line::from(Span::styled(
                format!("  ✏️ Edit Todo #{}", form.id),
                heading_style,
            )));
            lines.push(Line::from(""));
            cursor_row = Some(lines.len());
            lines.push(input_line(&form.input, "New title", theme));
            if let Some(err) = form.error {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("  {}", err),
                    Style::default().fg(theme.error).bg(bg),
                )));
            }
        }
        _ => {}
    }

    let cursor = cursor_row.and_then(|row| {
        let input = match app.mode {
            Mode::Add => app.add_form.as_ref().map(|f| &f.input),
            _ => app.edit_form.as_ref().map(|f| &f.input),
        }?;
        // "  > " prefix is 4 cells
        let x = area.x + 4 + input.cursor_col() as u16;
        let y = area.y + row as u16;
        (x < area.right() && y < area.bottom()).then_some((x, y))
    });

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
    if let Some(pos) = cursor {
        frame.set_cursor_position(pos);
    }
}

fn input_line<'a>(input: &TextInput, placeholder: &'a str, theme: &Theme) -> Line<'a> {
    let bg = theme.background;
    let prompt = Span::styled("  > ", Style::default().fg(theme.highlight).bg(bg));
    if input.value().is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(placeholder, Style::default().fg(theme.dim).bg(bg)),
        ])
    } else {
        Line::from(vec![
            prompt,
            Span::styled(input.value().to_string(), Style::default().fg(theme.text_bright).bg(bg)),
        ])
    }
}
