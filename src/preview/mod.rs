//! Rendered view of the current document.
//!
//! A [`Preview`] is a pure function of a [`Document`] and a width; the app
//! rebuilds it whenever either changes.

mod parser;
mod types;

pub use parser::{enable_extensions, render_markdown};
pub use types::{InlineSpan, InlineStyle, LineType, RenderedLine};

use crate::document::Document;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    title: String,
    lines: Vec<RenderedLine>,
    width: u16,
}

impl Preview {
    pub fn render(document: &Document, width: u16) -> Self {
        Self {
            title: document.display_name().to_string(),
            lines: render_markdown(&document.content, width),
            width,
        }
    }

    /// Filename shown above the rendered body.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    /// Up to `count` lines starting at `offset`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> &[RenderedLine] {
        let start = offset.min(self.lines.len());
        let end = start.saturating_add(count).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Rendered body as plain text, one line per row.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
