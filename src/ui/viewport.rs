//! Vertical scroll position for a pane.
//!
//! The preview scrolls freely; the body editor scrolls to follow its
//! cursor. Both keep a [`Viewport`] sized to the rows they have on screen.

use std::ops::Range;

/// Visible window over `total_lines` rows.
///
/// ```
/// use gistpane::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(10, 100);
/// vp.scroll_by(15);
/// assert_eq!(vp.visible_range(), 15..25);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    pub const fn new(height: u16, total_lines: usize) -> Self {
        Self {
            height,
            offset: 0,
            total_lines,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_lines);
        self.offset.min(end)..end
    }

    /// Scroll position as 0-100; a document that fits reports 100.
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    /// Scroll by `delta` rows (negative is up), clamped to the content.
    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page());
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Move the window the least amount that makes `line` visible.
    pub const fn follow(&mut self, line: usize) {
        if self.height == 0 {
            return;
        }
        if line < self.offset {
            self.offset = line;
        } else if line >= self.offset + self.height as usize {
            self.offset = line + 1 - self.height as usize;
        }
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }

    fn page(&self) -> isize {
        isize::try_from(self.height).unwrap_or(isize::MAX).max(1)
    }
}
