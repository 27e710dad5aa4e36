//! Terminal UI components.
//!
//! - [`viewport`]: scroll position for the body editor and the preview
//! - [`style`]: colors for rendered markdown and chrome
//!
//! Pane geometry lives here so input handling and drawing agree on where
//! the divider is.

pub mod style;
pub mod viewport;

mod render;
mod status;

use ratatui::layout::Rect;

use crate::layout::{Container, PaneLayout};

pub use render::{line_number_width, render};

/// Rows reserved under the panes for the status bar.
pub const FOOTER_ROWS: u16 = 1;
/// Rows above the body editor: URL field, filename field, separator.
pub const EDITOR_HEADER_ROWS: u16 = 3;
/// Rows above the rendered preview: filename header and separator.
pub const PREVIEW_HEADER_ROWS: u16 = 2;
/// Blank columns on each side of the rendered preview.
pub const PREVIEW_PADDING: u16 = 1;

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    /// Empty while printing.
    pub editor: Rect,
    /// Absent while printing.
    pub divider: Option<Rect>,
    pub preview: Rect,
    pub status: Rect,
}

/// Regions inside the editor pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorRows {
    pub url: Rect,
    pub filename: Rect,
    pub body: Rect,
}

/// Split the screen into editor, divider, preview and status bar.
///
/// The divider occupies the first column after the editor's share of the
/// width, so dragging it to column `x` gives the editor `x - left` columns.
pub fn pane_areas(screen: Rect, layout: &PaneLayout, print_mode: bool) -> PaneAreas {
    let main = Rect {
        height: screen.height.saturating_sub(FOOTER_ROWS),
        ..screen
    };
    let status = Rect {
        y: screen.y + main.height,
        height: screen.height.min(FOOTER_ROWS),
        ..screen
    };

    if print_mode {
        return PaneAreas {
            editor: Rect { width: 0, ..main },
            divider: None,
            preview: main,
            status,
        };
    }

    let (editor_cols, rest) = layout.split(main.width);
    let divider_cols = rest.min(1);
    PaneAreas {
        editor: Rect {
            width: editor_cols,
            ..main
        },
        divider: Some(Rect {
            x: main.x + editor_cols,
            width: divider_cols,
            ..main
        }),
        preview: Rect {
            x: main.x + editor_cols + divider_cols,
            width: rest - divider_cols,
            ..main
        },
        status,
    }
}

/// The horizontal extent the divider can be dragged across.
pub const fn drag_container(screen: Rect) -> Container {
    Container::new(screen.x, screen.width)
}

pub const fn editor_rows(editor: Rect) -> EditorRows {
    let header = if editor.height < EDITOR_HEADER_ROWS {
        editor.height
    } else {
        EDITOR_HEADER_ROWS
    };
    EditorRows {
        url: Rect {
            height: if editor.height > 0 { 1 } else { 0 },
            ..editor
        },
        filename: Rect {
            y: editor.y + 1,
            height: if editor.height > 1 { 1 } else { 0 },
            ..editor
        },
        body: Rect {
            y: editor.y + header,
            height: editor.height - header,
            ..editor
        },
    }
}

/// Where rendered markdown lines go inside the preview pane.
pub const fn preview_text_area(preview: Rect) -> Rect {
    let header = if preview.height < PREVIEW_HEADER_ROWS {
        preview.height
    } else {
        PREVIEW_HEADER_ROWS
    };
    let padding = if preview.width < 2 * PREVIEW_PADDING {
        0
    } else {
        PREVIEW_PADDING
    };
    Rect {
        x: preview.x + padding,
        y: preview.y + header,
        width: preview.width - 2 * padding,
        height: preview.height - header,
    }
}

/// True when (`x`, `y`) falls inside `rect`.
pub const fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}
