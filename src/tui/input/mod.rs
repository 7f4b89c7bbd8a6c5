mod filter;
mod form;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};
use super::text_input::TextInput;

use filter::handle_filter;
use form::{handle_add_form, handle_edit_form};
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Ctrl-C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Filter => handle_filter(app, key),
        Mode::Add => handle_add_form(app, key),
        Mode::Edit => handle_edit_form(app, key),
    }
}

/// Bracketed paste goes into whichever text field is active
pub fn handle_paste(app: &mut App, text: &str) {
    if let Some(input) = active_input(app) {
        input.insert_str(text);
    }
}

fn active_input(app: &mut App) -> Option<&mut TextInput> {
    match app.mode {
        Mode::Navigate => None,
        Mode::Filter => Some(&mut app.filter_input),
        Mode::Add => app
            .add_form
            .as_mut()
            .filter(|f| f.step().has_text())
            .map(|f| &mut f.input),
        Mode::Edit => app.edit_form.as_mut().map(|f| &mut f.input),
    }
}

/// Shared line-editing keys. Returns false if the key wasn't an edit key.
fn edit_text(input: &mut TextInput, key: KeyEvent) -> bool {
    match (key.modifiers, key.code) {
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => input.clear_to_start(),
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => input.move_home(),
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => input.move_end(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (_, KeyCode::Left) => input.move_left(),
        (_, KeyCode::Right) => input.move_right(),
        (_, KeyCode::Home) => input.move_home(),
        (_, KeyCode::End) => input.move_end(),
        _ => return false,
    }
    true
}

#[cfg(test)]
pub(crate) mod test_keys {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}
