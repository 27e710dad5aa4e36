//! Text input for the editor pane.
//!
//! [`TextBuffer`] backs the multi-line body editor; [`LineField`] backs the
//! gist URL and filename inputs. Both only hold text and a cursor; the app
//! pushes their contents to the document controller after each edit.

mod buffer;
mod field;

pub use buffer::{Cursor, Direction, TextBuffer};
pub use field::LineField;
