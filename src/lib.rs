// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Gistpane
//!
//! A two-pane terminal markdown editor.
//!
//! The left pane edits a single markdown document, the right pane shows a
//! live preview. Between them sits a draggable divider. The document, its
//! filename and the split position survive restarts, and a document can be
//! pulled from a GitHub gist by URL or id.
//!
//! ## Architecture
//!
//! Gistpane uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: The single source of truth for the current document
//! - [`layout`]: Pane split and divider drag
//! - [`store`]: Key/value persistence
//! - [`remote`]: Gist fetching
//! - [`preview`]: Markdown rendering for the preview pane
//! - [`editor`]: Text buffers behind the editor pane
//! - [`export`]: Print export
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod layout;
pub mod preview;
pub mod remote;
pub mod store;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{Document, DocumentController};
    pub use crate::store::StoreAdapter;
    pub use crate::ui::viewport::Viewport;
}
