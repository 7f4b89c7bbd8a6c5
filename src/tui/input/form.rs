use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::Priority;
use crate::tui::app::App;
use crate::tui::form::{FormOutcome, FormStep};

use super::edit_text;

pub(super) fn handle_add_form(app: &mut App, key: KeyEvent) {
    let Some(form) = app.add_form.as_mut() else {
        app.close_form();
        return;
    };

    let outcome = match key.code {
        KeyCode::Enter => form.advance(),
        KeyCode::Esc => form.back(),
        KeyCode::Char(c) if form.step() == FormStep::Priority => match Priority::parse(&c.to_string()) {
            Some(p) if c.is_ascii_digit() => form.choose_priority(p),
            _ => FormOutcome::Stay,
        },
        _ => {
            if form.step().has_text() && edit_text(&mut form.input, key) {
                form.error = None;
            }
            FormOutcome::Stay
        }
    };

    match outcome {
        FormOutcome::Stay => {}
        FormOutcome::Commit(new) => app.commit_add(new),
        FormOutcome::Cancel => app.close_form(),
    }
}

pub(super) fn handle_edit_form(app: &mut App, key: KeyEvent) {
    let Some(form) = app.edit_form.as_mut() else {
        app.close_form();
        return;
    };

    match key.code {
        KeyCode::Enter => {
            let id = form.id;
            if let FormOutcome::Commit(title) = form.submit() {
                app.commit_edit(id, &title);
            }
        }
        KeyCode::Esc => app.close_form(),
        _ => {
            if edit_text(&mut form.input, key) {
                form.error = None;
            }
        }
    }
}
