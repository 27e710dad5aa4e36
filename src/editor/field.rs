use unicode_width::UnicodeWidthChar;

/// Single-line text input with a char-indexed cursor.
///
/// Newlines are never stored; pasted text has them replaced by spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineField {
    chars: Vec<char>,
    cursor: usize,
}

impl LineField {
    /// A field holding `text` with the cursor at the end.
    pub fn new(text: &str) -> Self {
        let mut field = Self::default();
        field.set_text(text);
        field
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the content and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = sanitize(text).collect();
        self.cursor = self.chars.len();
    }

    /// Terminal column of the cursor, accounting for wide characters.
    pub fn cursor_display_col(&self) -> usize {
        self.chars[..self.cursor]
            .iter()
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in sanitize(text) {
            self.chars.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }
}

fn sanitize(text: &str) -> impl Iterator<Item = char> + '_ {
    text.trim_end_matches(['\n', '\r'])
        .chars()
        .filter(|ch| *ch != '\r')
        .map(|ch| if ch == '\n' { ' ' } else { ch })
}
