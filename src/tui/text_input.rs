use crate::util::unicode::{byte_offset_to_display_col, next_grapheme_boundary, prev_grapheme_boundary};

/// Single-line edit buffer with a grapheme-aware byte cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    /// Buffer holding `value` with the cursor at the end
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        TextInput { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in terminal cells
    pub fn cursor_col(&self) -> usize {
        byte_offset_to_display_col(&self.value, self.cursor)
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Pasted text; newlines become spaces
    pub fn insert_str(&mut self, text: &str) {
        let clean = text.replace(['\n', '\r'], " ");
        self.value.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.value, self.cursor) {
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.value, self.cursor) {
            self.value.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.value, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.value, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Ctrl-U: drop everything before the cursor
    pub fn clear_to_start(&mut self) {
        self.value.replace_range(..self.cursor, "");
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::default();
        for c in s.chars() {
            input.insert_char(c);
        }
        input
    }

    #[test]
    fn typing_appends() {
        let input = typed("milk");
        assert_eq!(input.value(), "milk");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = typed("mlk");
        input.move_left();
        input.move_left();
        input.insert_char('i');
        assert_eq!(input.value(), "milk");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete_respect_graphemes() {
        let mut input = TextInput::with_value("cafe\u{301}!");
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "caf!");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "af!");
        input.move_end();
        input.delete();
        assert_eq!(input.value(), "af!");
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::with_value("x");
        input.move_home();
        input.backspace();
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn wide_chars_move_cursor_by_two_cells() {
        let mut input = TextInput::with_value("日本");
        assert_eq!(input.cursor_col(), 4);
        input.move_left();
        assert_eq!(input.cursor_col(), 2);
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut input = TextInput::default();
        input.insert_str("a\nb\r\nc");
        assert_eq!(input.value(), "a b  c");
    }

    #[test]
    fn clear_to_start_keeps_tail() {
        let mut input = TextInput::with_value("hello world");
        for _ in 0..5 {
            input.move_left();
        }
        input.clear_to_start();
        assert_eq!(input.value(), "world");
        assert_eq!(input.cursor(), 0);
    }
}
