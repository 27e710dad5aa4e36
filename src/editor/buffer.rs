use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Cursor position in a [`TextBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars.
    pub col: usize,
    /// Column to return to when moving vertically through shorter lines.
    col_memory: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Multi-line text with a cursor, backed by a rope.
#[derive(Clone)]
pub struct TextBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of lines; an empty buffer has one.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line ending.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx).to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Line length in chars, excluding the line ending.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let mut len = line.len_chars();
        while len > 0 && matches!(line.char(len - 1), '\n' | '\r') {
            len -= 1;
        }
        len
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole text, keeping the cursor where it still fits.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
    }

    /// Terminal column of the cursor, accounting for wide characters.
    pub fn cursor_display_col(&self) -> usize {
        self.rope
            .line(self.cursor.line)
            .chars()
            .take(self.cursor.col)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    /// Char column on `line` that covers terminal column `display_col`.
    pub fn col_at_display(&self, line: usize, display_col: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let mut used = 0;
        let mut col = 0;
        for ch in self.rope.line(line).chars() {
            if matches!(ch, '\n' | '\r') {
                break;
            }
            used += ch.width().unwrap_or(0);
            if used > display_col {
                break;
            }
            col += 1;
        }
        col
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.newline();
            return;
        }
        self.rope.insert_char(self.char_idx(), ch);
        self.cursor.set_col(self.cursor.col + 1);
    }

    /// Insert text at the cursor, leaving the cursor after it.
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n");
        if text.is_empty() {
            return;
        }
        self.rope.insert(self.char_idx(), &text);
        match text.rsplit_once('\n') {
            Some((_, tail)) => {
                self.cursor.line += text.matches('\n').count();
                self.cursor.set_col(tail.chars().count());
            }
            None => self.cursor.set_col(self.cursor.col + text.chars().count()),
        }
    }

    /// Split the line at the cursor.
    pub fn newline(&mut self) {
        self.rope.insert_char(self.char_idx(), '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
    }

    /// Delete the char before the cursor, joining lines at column zero.
    pub fn delete_back(&mut self) -> bool {
        let idx = self.char_idx();
        if idx == 0 {
            return false;
        }
        if self.cursor.col == 0 {
            let prev = self.cursor.line - 1;
            let prev_len = self.line_len(prev);
            let ending_start = self.rope.line_to_char(prev) + prev_len;
            self.rope.remove(ending_start..idx);
            self.cursor.line = prev;
            self.cursor.set_col(prev_len);
        } else {
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(self.cursor.col - 1);
        }
        true
    }

    /// Delete the char under the cursor, joining lines at line end.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let idx = self.char_idx();
            self.rope.remove(idx..=idx);
            return true;
        }
        if self.cursor.line + 1 >= self.line_count() {
            return false;
        }
        let idx = self.char_idx();
        let next_start = self.rope.line_to_char(self.cursor.line + 1);
        self.rope.remove(idx..next_start);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.cursor.col > 0 {
                    self.cursor.set_col(self.cursor.col - 1);
                } else if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.set_col(self.line_len(self.cursor.line));
                }
            }
            Direction::Right => {
                if self.cursor.col < self.line_len(self.cursor.line) {
                    self.cursor.set_col(self.cursor.col + 1);
                } else if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.set_col(0);
                }
            }
            Direction::Up if self.cursor.line > 0 => {
                self.cursor.line -= 1;
                self.cursor.col = self.cursor.col_memory.min(self.line_len(self.cursor.line));
            }
            Direction::Down if self.cursor.line + 1 < self.line_count() => {
                self.cursor.line += 1;
                self.cursor.col = self.cursor.col_memory.min(self.line_len(self.cursor.line));
            }
            Direction::Up | Direction::Down => {}
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Move by up to `lines` rows (negative is up), keeping the sticky column.
    pub fn move_lines(&mut self, lines: isize) {
        let direction = if lines < 0 {
            Direction::Up
        } else {
            Direction::Down
        };
        for _ in 0..lines.unsigned_abs() {
            self.move_cursor(direction);
        }
    }

    /// Place the cursor, clamping to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        self.cursor.set_col(col.min(self.line_len(self.cursor.line)));
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.move_to(last, usize::MAX);
    }

    fn char_idx(&self) -> usize {
        self.rope.line_to_char(self.cursor.line) + self.cursor.col
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = TextBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(String::new()));
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let buf = TextBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line(1), Some(String::new()));
    }

    #[test]
    fn test_line_len_counts_chars_not_bytes() {
        let buf = TextBuffer::from_text("héllo\r\nwörld");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line(0).as_deref(), Some("héllo"));
        assert_eq!(buf.line_len(1), 5);
    }

    // --- Editing ---

    #[test]
    fn test_insert_multibyte_then_ascii() {
        let mut buf = TextBuffer::empty();
        buf.insert_char('é');
        buf.insert_char('x');
        assert_eq!(buf.text(), "éx");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_str_moves_cursor_past_text() {
        let mut buf = TextBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_str("X\nYZ");
        assert_eq!(buf.text(), "aX\nYZb");
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_newline_splits_line() {
        let mut buf = TextBuffer::from_text("hello");
        buf.move_to(0, 2);
        buf.newline();
        assert_eq!(buf.text(), "he\nllo");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_at_origin_is_noop() {
        let mut buf = TextBuffer::from_text("x");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = TextBuffer::from_text("ab\r\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut buf = TextBuffer::from_text("aé");
        buf.move_end();
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_delete_forward_joins_and_stops_at_end() {
        let mut buf = TextBuffer::from_text("ab\ncd");
        buf.move_end();
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "abcd");
        buf.move_to_end();
        assert!(!buf.delete_forward());
    }

    // --- Movement ---

    #[test]
    fn test_left_right_wrap_across_lines() {
        let mut buf = TextBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_vertical_moves_keep_sticky_column() {
        let mut buf = TextBuffer::from_text("long line\nab\nanother long");
        buf.move_to(0, 7);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 7);
    }

    #[test]
    fn test_move_lines_clamps() {
        let mut buf = TextBuffer::from_text("a\nb\nc");
        buf.move_lines(10);
        assert_eq!(buf.cursor().line, 2);
        buf.move_lines(-1);
        assert_eq!(buf.cursor().line, 1);
    }

    #[test]
    fn test_set_text_clamps_cursor() {
        let mut buf = TextBuffer::from_text("one\ntwo\nthree");
        buf.move_to_end();
        buf.set_text("x");
        assert_eq!(buf.cursor(), Cursor::at(0, 1));
    }

    #[test]
    fn test_col_at_display_lands_on_wide_char() {
        let buf = TextBuffer::from_text("日本a\nx");
        assert_eq!(buf.col_at_display(0, 0), 0);
        assert_eq!(buf.col_at_display(0, 3), 1);
        assert_eq!(buf.col_at_display(0, 4), 2);
        assert_eq!(buf.col_at_display(0, 99), 3);
        assert_eq!(buf.col_at_display(7, 1), 0);
    }

    #[test]
    fn test_display_col_counts_wide_chars() {
        let mut buf = TextBuffer::from_text("日本a");
        buf.move_end();
        assert_eq!(buf.cursor_display_col(), 5);
    }
}
