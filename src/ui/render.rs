use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::{Focus, Model};
use crate::editor::LineField;

use super::style::{
    divider_style, gutter_style, label_style, rule_style, style_for_inline, style_for_line_type,
};
use super::{PaneAreas, editor_rows, pane_areas, preview_text_area, status};

const URL_LABEL: &str = " gist ";
const FILENAME_LABEL: &str = " file ";
const URL_HINT: &str = "paste a gist URL or ID, then Enter";

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let areas = pane_areas(frame.area(), &model.layout, model.preparing_print);

    if areas.editor.width > 0 {
        render_editor(model, frame, areas.editor);
    }
    if let Some(divider) = areas.divider {
        render_divider(model, frame, divider);
    }
    render_preview(model, frame, areas.preview);

    render_footer(model, frame, &areas);
}

fn render_footer(model: &Model, frame: &mut Frame, areas: &PaneAreas) {
    if model.active_toast().is_some() {
        let main_bottom = areas.status.y.saturating_sub(1);
        let toast_area = Rect {
            y: main_bottom,
            height: 1,
            ..areas.status
        };
        if areas.status.y > 0 {
            status::render_toast_bar(model, frame, toast_area);
        }
    }
    status::render_status_bar(model, frame, areas.status);
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let rows = editor_rows(area);
    frame.render_widget(Clear, area);

    render_field(
        frame,
        rows.url,
        URL_LABEL,
        &model.url_field,
        Some(URL_HINT),
        model.focus == Focus::UrlField,
    );
    render_field(
        frame,
        rows.filename,
        FILENAME_LABEL,
        &model.filename_field,
        None,
        model.focus == Focus::Filename,
    );

    if rows.body.y > rows.filename.y + 1 {
        let rule = Rect {
            y: rows.filename.y + 1,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new("─".repeat(usize::from(area.width))).style(rule_style()),
            rule,
        );
    }

    render_body(model, frame, rows.body);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    field: &LineField,
    hint: Option<&str>,
    focused: bool,
) {
    if area.height == 0 {
        return;
    }
    let label_width = u16::try_from(label.len()).unwrap_or(u16::MAX);
    let text_width = usize::from(area.width.saturating_sub(label_width + 1));
    let cursor_col = field.cursor_display_col();
    let skip = (cursor_col + 1).saturating_sub(text_width);

    let mut spans = vec![Span::styled(label.to_string(), label_style(focused)), Span::raw(" ")];
    if field.is_empty() && !focused {
        if let Some(hint) = hint {
            spans.push(Span::styled(hint.to_string(), gutter_style()));
        }
    } else {
        spans.push(Span::raw(slice_display(&field.text(), skip, text_width)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    if focused {
        let offset = u16::try_from(cursor_col.saturating_sub(skip)).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(label_width + 1).saturating_add(offset);
        if x < area.x + area.width {
            frame.set_cursor_position(Position::new(x, area.y));
        }
    }
}

fn render_body(model: &Model, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let buf = &model.body;
    let gutter = line_number_width(buf.line_count());
    let text_left = area.x + gutter + 1;
    let text_width = usize::from(area.width.saturating_sub(gutter + 1));

    let range = model.body_viewport.visible_range();
    let first = range.start;
    let lines: Vec<Line> = range
        .map(|idx| {
            let number = format!("{:>width$} ", idx + 1, width = usize::from(gutter));
            let text = buf.line(idx).unwrap_or_default();
            Line::from(vec![
                Span::styled(number, gutter_style()),
                Span::raw(slice_display(&text, model.body_hscroll, text_width)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    if model.focus == Focus::Body {
        let cursor = buf.cursor();
        let col = buf.cursor_display_col().saturating_sub(model.body_hscroll);
        if cursor.line >= first && col < text_width {
            let y = area.y + u16::try_from(cursor.line - first).unwrap_or(u16::MAX);
            let x = text_left.saturating_add(u16::try_from(col).unwrap_or(u16::MAX));
            if y < area.y + area.height {
                frame.set_cursor_position(Position::new(x, y));
            }
        }
    }
}

fn render_divider(model: &Model, frame: &mut Frame, area: Rect) {
    let style = divider_style(model.layout.is_dragging());
    let lines: Vec<Line> = (0..area.height)
        .map(|_| Line::styled("│", style))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    if area.height == 0 {
        return;
    }

    let header = Rect { height: 1, ..area };
    let title = format!(" {} ", model.preview.title());
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            label_style(model.focus == Focus::Preview),
        ))),
        header,
    );
    if area.height > 1 {
        let rule = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        frame.render_widget(
            Paragraph::new("─".repeat(usize::from(area.width))).style(rule_style()),
            rule,
        );
    }

    let text_area = preview_text_area(area);
    let viewport = &model.preview_viewport;
    let visible = model
        .preview
        .visible_lines(viewport.offset(), usize::from(text_area.height));
    let content: Vec<Line> = visible
        .iter()
        .map(|line| {
            let line_style = style_for_line_type(line.line_type());
            line.spans().map_or_else(
                || Line::styled(line.content().to_string(), line_style),
                |spans| {
                    Line::from(
                        spans
                            .iter()
                            .map(|span| {
                                Span::styled(
                                    span.text().to_string(),
                                    style_for_inline(line_style, span.style()),
                                )
                            })
                            .collect::<Vec<_>>(),
                    )
                },
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(content), text_area);
}

/// Up to `width` terminal columns of `text`, starting at display column `start`.
///
/// A wide char straddling either edge is dropped rather than split.
fn slice_display(text: &str, start: usize, width: usize) -> String {
    let mut out = String::new();
    let mut col = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if col >= start && col + w <= start + width {
            out.push(ch);
        }
        col += w;
        if col >= start + width {
            break;
        }
    }
    out
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
