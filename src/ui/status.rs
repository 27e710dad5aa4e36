use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Focus, Model};

use super::style::{status_style, toast_style};

const KEY_HINTS: &str = "Tab:focus  Ctrl+L:load  Ctrl+P:print  Ctrl+Q:quit";

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(status_text(model)).style(status_style()),
        area,
    );
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = toast_style(level);
    frame.render_widget(Paragraph::new(format!("{prefix} {message}")).style(style), area);
}

pub(super) fn status_text(model: &Model) -> String {
    let filename = model.shown().display_name();

    let position = match model.focus {
        Focus::Body => {
            let cursor = model.body.cursor();
            format!("Ln {}, Col {}", cursor.line + 1, cursor.col + 1)
        }
        Focus::Preview => {
            let vp = &model.preview_viewport;
            format!("[{}%]", vp.scroll_percent())
        }
        Focus::UrlField => "gist URL".to_string(),
        Focus::Filename => "filename".to_string(),
    };

    let loading = if model.is_loading() { " [loading…]" } else { "" };
    let printing = if model.preparing_print {
        " [preparing to print…]"
    } else {
        ""
    };

    format!(" {filename}  {position}{loading}{printing}  {KEY_HINTS}")
}
