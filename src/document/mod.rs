//! The edited document and its single owner.
//!
//! A session edits exactly one [`Document`]. The [`DocumentController`] owns
//! it; every other part of the app (preview, persistence, editor widgets)
//! observes changes through a [`Subscription`] or reads
//! [`DocumentController::current`].

mod controller;
mod feed;

pub use controller::{DocumentController, Startup, StartupOutcome};
pub use feed::{ChangeFeed, Subscription};

/// Filename shown when a document has none.
pub const UNTITLED: &str = "untitled";

const PLACEHOLDER_FILENAME: &str = "welcome.md";
const PLACEHOLDER_CONTENT: &str = "# Welcome\n\n\
Type markdown in the editor on the left; the preview on the right updates as you go.\n\n\
- `Tab` moves between the gist URL, filename, and body fields\n\
- `Ctrl+L` loads the gist in the URL field\n\
- `Ctrl+P` exports the preview for printing\n\
- drag the divider to resize the panes\n";

/// A filename and its text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub content: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// The document shown when nothing was persisted and no default could be fetched.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_FILENAME, PLACEHOLDER_CONTENT)
    }

    /// True when both the filename and the body are empty.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.content.is_empty()
    }

    /// Filename for display, falling back to [`UNTITLED`].
    pub fn display_name(&self) -> &str {
        if self.filename.is_empty() {
            UNTITLED
        } else {
            &self.filename
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_untitled() {
        assert_eq!(Document::new("", "body").display_name(), "untitled");
        assert_eq!(Document::new("a.md", "").display_name(), "a.md");
    }

    #[test]
    fn test_placeholder_is_not_empty() {
        assert!(!Document::placeholder().is_empty());
        assert!(Document::default().is_empty());
    }
}
