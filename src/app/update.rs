use crate::app::model::{Focus, Model, ToastLevel};
use crate::document::StartupOutcome;
use crate::editor::Direction;
use crate::export::{PrintJob, PrintOutcome};
use crate::remote::LoadResult;

/// Lines scrolled per mouse wheel notch.
pub const WHEEL_LINES: isize = 3;

/// All possible events and actions in the application.
///
/// These represent user input, terminal events, and results coming back
/// from load and print workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Focus
    FocusNext,
    FocusPrev,
    Focus(Focus),

    // Editing the focused field
    InsertChar(char),
    Paste(String),
    Backspace,
    Delete,
    /// Enter in the body editor
    Newline,
    MoveCursor(Direction),
    Home,
    End,
    PageUp,
    PageDown,
    /// Click in the body editor: line and char column
    PlaceCursor(usize, usize),

    // Preview
    ScrollPreview(isize),

    // Divider drag
    DividerDown,
    /// Pointer column while dragging
    PointerMoved(u16),
    PointerUp,

    // Remote documents
    /// Load whatever is in the URL field
    RequestLoad,
    /// A user-requested load finished; `source` is what was typed
    GistLoaded { source: String, result: LoadResult },
    /// The startup fetch of the default document finished
    StartupLoaded(LoadResult),

    // Printing
    Print,
    AfterPrint(PrintOutcome),

    // Application
    Notify(ToastLevel, String),
    Resize(u16, u16),
    Quit,
}

impl Message {
    /// Messages that change the filename or body text.
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::Paste(_)
                | Self::Backspace
                | Self::Delete
                | Self::Newline
                | Self::PlaceCursor(..)
        )
    }
}

/// Apply one message to the model.
///
/// I/O is left to `App::handle_message_side_effects`; this only records
/// requests for it (`load_request`, `print_request`).
pub fn update(mut model: Model, msg: Message) -> Model {
    // The editor is hidden in print mode, so it takes no edits.
    if model.preparing_print && msg.is_edit() {
        return model;
    }

    match msg {
        Message::FocusNext => model.focus = model.focus.next(),
        Message::FocusPrev => model.focus = model.focus.prev(),
        Message::Focus(focus) => model.focus = focus,

        Message::InsertChar(ch) => match model.focus {
            Focus::UrlField => model.url_field.insert_char(ch),
            Focus::Filename => {
                model.filename_field.insert_char(ch);
                model.commit_edit();
            }
            Focus::Body => {
                model.body.insert_char(ch);
                model.commit_edit();
            }
            Focus::Preview => {}
        },
        Message::Paste(text) => match model.focus {
            Focus::UrlField => model.url_field.insert_str(&text),
            Focus::Filename => {
                model.filename_field.insert_str(&text);
                model.commit_edit();
            }
            Focus::Body => {
                model.body.insert_str(&text);
                model.commit_edit();
            }
            Focus::Preview => {}
        },
        Message::Backspace => match model.focus {
            Focus::UrlField => {
                model.url_field.delete_back();
            }
            Focus::Filename => {
                if model.filename_field.delete_back() {
                    model.commit_edit();
                }
            }
            Focus::Body => {
                if model.body.delete_back() {
                    model.commit_edit();
                }
            }
            Focus::Preview => {}
        },
        Message::Delete => match model.focus {
            Focus::UrlField => {
                model.url_field.delete_forward();
            }
            Focus::Filename => {
                if model.filename_field.delete_forward() {
                    model.commit_edit();
                }
            }
            Focus::Body => {
                if model.body.delete_forward() {
                    model.commit_edit();
                }
            }
            Focus::Preview => {}
        },
        Message::Newline => {
            if model.focus == Focus::Body {
                model.body.newline();
                model.commit_edit();
            }
        }
        Message::MoveCursor(direction) => move_cursor(&mut model, direction),
        Message::Home => match model.focus {
            Focus::UrlField => model.url_field.move_home(),
            Focus::Filename => model.filename_field.move_home(),
            Focus::Body => model.body.move_home(),
            Focus::Preview => model.preview_viewport.go_to_top(),
        },
        Message::End => match model.focus {
            Focus::UrlField => model.url_field.move_end(),
            Focus::Filename => model.filename_field.move_end(),
            Focus::Body => model.body.move_end(),
            Focus::Preview => model.preview_viewport.go_to_bottom(),
        },
        Message::PageUp => match model.focus {
            Focus::Body => model.body.move_lines(-page(&model)),
            Focus::Preview => model.preview_viewport.page_up(),
            Focus::UrlField | Focus::Filename => {}
        },
        Message::PageDown => match model.focus {
            Focus::Body => model.body.move_lines(page(&model)),
            Focus::Preview => model.preview_viewport.page_down(),
            Focus::UrlField | Focus::Filename => {}
        },
        Message::PlaceCursor(line, col) => {
            model.focus = Focus::Body;
            model.body.move_to(line, col);
        }

        Message::ScrollPreview(delta) => model.preview_viewport.scroll_by(delta),

        Message::DividerDown => model.layout.pointer_down(),
        Message::PointerMoved(x) => {
            let container = crate::ui::drag_container(model.screen());
            if model.layout.pointer_move(x, container) {
                model.refresh_preview(false);
            }
        }
        Message::PointerUp => {
            model.layout.pointer_up();
        }

        Message::RequestLoad => {
            model.pending_loads += 1;
            model.load_request = Some(model.url_field.text().trim().to_string());
        }
        Message::GistLoaded { source, result } => {
            model.pending_loads = model.pending_loads.saturating_sub(1);
            if let Some(document) = result {
                let name = document.display_name().to_string();
                model.documents.apply_loaded_document(document);
                model.store().save_last_gist_url(&source);
                model.reset_fields();
                model.show_toast(ToastLevel::Info, format!("Loaded {name}"));
            }
        }
        Message::StartupLoaded(result) => {
            model.pending_loads = model.pending_loads.saturating_sub(1);
            match model.documents.finish_startup(result) {
                StartupOutcome::Loaded | StartupOutcome::Placeholder => model.reset_fields(),
                StartupOutcome::Superseded | StartupOutcome::Ignored => {}
            }
        }

        Message::Print => {
            if model.preparing_print {
                model.show_toast(ToastLevel::Warning, "Already preparing to print");
            } else {
                model.preparing_print = true;
                model.print_request = Some(PrintJob::new(model.documents.current().clone()));
            }
        }
        Message::AfterPrint(outcome) => {
            model.preparing_print = false;
            match outcome {
                PrintOutcome::Printed { path } => model.show_toast(
                    ToastLevel::Info,
                    format!("Sent {} to the printer", path.display()),
                ),
                PrintOutcome::Exported { path } => {
                    model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
                }
                PrintOutcome::Failed { reason } => {
                    model.show_toast(ToastLevel::Error, format!("Print failed: {reason}"));
                }
            }
        }

        Message::Notify(level, message) => model.show_toast(level, message),
        Message::Resize(width, height) => model.terminal_size = (width, height),
        Message::Quit => {
            model.layout.release();
            model.should_quit = true;
        }
    }

    model.sync_preview();
    model
}

fn move_cursor(model: &mut Model, direction: Direction) {
    match (model.focus, direction) {
        (Focus::UrlField, Direction::Left) => model.url_field.move_left(),
        (Focus::UrlField, Direction::Right) => model.url_field.move_right(),
        (Focus::UrlField, Direction::Down) => model.focus = Focus::Filename,
        (Focus::Filename, Direction::Left) => model.filename_field.move_left(),
        (Focus::Filename, Direction::Right) => model.filename_field.move_right(),
        (Focus::Filename, Direction::Up) => model.focus = Focus::UrlField,
        (Focus::Filename, Direction::Down) => model.focus = Focus::Body,
        (Focus::Body, Direction::Up) if model.body.cursor().line == 0 => {
            model.focus = Focus::Filename;
        }
        (Focus::Body, direction) => model.body.move_cursor(direction),
        (Focus::Preview, Direction::Up) => model.preview_viewport.scroll_by(-1),
        (Focus::Preview, Direction::Down) => model.preview_viewport.scroll_by(1),
        (Focus::UrlField, Direction::Up) | (Focus::Preview, _) => {}
    }
}

fn page(model: &Model) -> isize {
    isize::try_from(model.body_viewport.height())
        .unwrap_or(isize::MAX)
        .max(1)
}
