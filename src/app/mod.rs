//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Gist loads and print jobs run on worker threads. Their results come back
//! as [`Message`]s over a channel and go through [`update`] like key
//! presses, so the document controller is only ever touched by the loop.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, Model, ToastLevel};
pub use update::{Message, WHEEL_LINES, update};

use std::sync::mpsc::{self, Receiver, Sender};

use crate::export::Printer;
use crate::layout::DEFAULT_MIN_PANE_WIDTH;
use crate::remote::{DEFAULT_GIST, RemoteLoader};
use crate::store::StoreAdapter;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    store: StoreAdapter,
    loader: RemoteLoader,
    printer: Box<dyn Printer>,
    default_gist: Option<String>,
    initial_gist: Option<String>,
    min_pane_width: u16,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl App {
    pub fn new(store: StoreAdapter, loader: RemoteLoader, printer: impl Printer + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            loader,
            printer: Box::new(printer),
            default_gist: Some(DEFAULT_GIST.to_string()),
            initial_gist: None,
            min_pane_width: DEFAULT_MIN_PANE_WIDTH,
            tx,
            rx,
        }
    }

    /// Gist fetched at startup when nothing is persisted. Defaults to
    /// [`DEFAULT_GIST`]; `None` skips the fetch and shows the placeholder.
    pub fn with_default_gist(mut self, gist: Option<String>) -> Self {
        self.default_gist = gist.filter(|g| !g.trim().is_empty());
        self
    }

    /// Gist loaded right after startup, as if typed into the URL field.
    pub fn with_initial_gist(mut self, gist: Option<String>) -> Self {
        self.initial_gist = gist.filter(|g| !g.trim().is_empty());
        self
    }

    pub const fn with_min_pane_width(mut self, width: u16) -> Self {
        self.min_pane_width = width;
        self
    }

    /// Build a model sized to `terminal_size` and run startup on it.
    pub fn init_model(&self, terminal_size: (u16, u16)) -> Model {
        let state = self.store.load_state();
        let mut model = Model::new(
            self.store.clone(),
            &state,
            self.min_pane_width,
            terminal_size,
        );
        self.start(&mut model, &state);
        model
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("default_gist", &self.default_gist)
            .field("initial_gist", &self.initial_gist)
            .field("min_pane_width", &self.min_pane_width)
            .finish_non_exhaustive()
    }
}
