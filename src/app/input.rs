use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;

use crate::app::{App, Focus, Message, Model, WHEEL_LINES};
use crate::editor::Direction;
use crate::ui::{editor_rows, line_number_width, point_in_rect};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Some(Message::Paste(text.clone())),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('l') if ctrl => Some(Message::RequestLoad),
            KeyCode::Char('p') if ctrl => Some(Message::Print),
            KeyCode::Tab => Some(Message::FocusNext),
            KeyCode::BackTab => Some(Message::FocusPrev),
            KeyCode::Esc => Some(Message::Focus(Focus::Body)),
            KeyCode::Enter => match model.focus {
                Focus::UrlField => Some(Message::RequestLoad),
                Focus::Filename => Some(Message::Focus(Focus::Body)),
                Focus::Body => Some(Message::Newline),
                Focus::Preview => None,
            },
            KeyCode::Backspace => Some(Message::Backspace),
            KeyCode::Delete => Some(Message::Delete),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::Home),
            KeyCode::End => Some(Message::End),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char(c) if !ctrl && !alt => Some(Message::InsertChar(c)),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        // While dragging, moves and the release count wherever they land.
        if model.layout.is_dragging() {
            return match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    Some(Message::PointerMoved(mouse.column))
                }
                MouseEventKind::Up(MouseButton::Left) => Some(Message::PointerUp),
                _ => None,
            };
        }

        let areas = model.pane_areas();
        let (col, row) = (mouse.column, mouse.row);
        let in_preview = point_in_rect(col, row, areas.preview);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if areas.divider.is_some_and(|d| point_in_rect(col, row, d)) {
                    return Some(Message::DividerDown);
                }
                if in_preview {
                    return Some(Message::Focus(Focus::Preview));
                }
                if point_in_rect(col, row, areas.editor) {
                    return Some(editor_click(model, col, row));
                }
                None
            }
            MouseEventKind::ScrollDown if in_preview => Some(Message::ScrollPreview(WHEEL_LINES)),
            MouseEventKind::ScrollUp if in_preview => Some(Message::ScrollPreview(-WHEEL_LINES)),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn editor_click(model: &Model, col: u16, row: u16) -> Message {
    let rows = editor_rows(model.pane_areas().editor);
    if point_in_rect(col, row, rows.url) {
        return Message::Focus(Focus::UrlField);
    }
    if point_in_rect(col, row, rows.filename) {
        return Message::Focus(Focus::Filename);
    }
    if !point_in_rect(col, row, rows.body) {
        return Message::Focus(Focus::Body);
    }
    let line = model.body_viewport.offset() + usize::from(row - rows.body.y);
    let text_left = rows.body.x + line_number_width(model.body.line_count()) + 1;
    let display_col = usize::from(col.saturating_sub(text_left)) + model.body_hscroll;
    Message::PlaceCursor(line, model.body.col_at_display(line, display_col))
}
