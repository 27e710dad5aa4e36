use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::document::{Document, DocumentController, Startup, Subscription};
use crate::editor::{LineField, TextBuffer};
use crate::export::PrintJob;
use crate::layout::{DEFAULT_MIN_PANE_WIDTH, PaneLayout};
use crate::preview::Preview;
use crate::store::{MemoryStore, PersistedState, StoreAdapter};
use crate::ui::viewport::Viewport;
use crate::ui::{PaneAreas, editor_rows, pane_areas, preview_text_area};

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which input receives typing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    UrlField,
    Filename,
    #[default]
    Body,
    Preview,
}

impl Focus {
    pub const fn next(self) -> Self {
        match self {
            Self::UrlField => Self::Filename,
            Self::Filename => Self::Body,
            Self::Body => Self::Preview,
            Self::Preview => Self::UrlField,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::UrlField => Self::Preview,
            Self::Filename => Self::UrlField,
            Self::Body => Self::Filename,
            Self::Preview => Self::Body,
        }
    }
}

/// The complete application state.
///
/// The document itself lives in [`DocumentController`]; the fields here
/// are the editing widgets and what the preview last rendered. The preview
/// only ever shows documents delivered through the controller's feed.
pub struct Model {
    pub documents: DocumentController,
    pub layout: PaneLayout,
    store: StoreAdapter,
    updates: Subscription,
    /// Last confirmed document, as delivered by the change feed.
    shown: Document,
    pub preview: Preview,
    pub preview_viewport: Viewport,
    pub url_field: LineField,
    pub filename_field: LineField,
    pub body: TextBuffer,
    pub body_viewport: Viewport,
    /// First visible display column of the body editor.
    pub body_hscroll: usize,
    pub focus: Focus,
    /// Gist loads started and not yet answered.
    pub pending_loads: usize,
    /// Set while a print job is out; the view switches to preview only.
    pub preparing_print: bool,
    /// Load requested by `update`, picked up by the side-effect pass.
    pub(super) load_request: Option<String>,
    pub(super) print_request: Option<PrintJob>,
    pub terminal_size: (u16, u16),
    toast: Option<Toast>,
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("filename", &self.shown.filename)
            .field("focus", &self.focus)
            .field("pending_loads", &self.pending_loads)
            .field("preparing_print", &self.preparing_print)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Build the model from what the store held at launch.
    ///
    /// The document is still empty; call [`Model::begin_startup`] next.
    pub fn new(
        store: StoreAdapter,
        state: &PersistedState,
        min_pane_width: u16,
        terminal_size: (u16, u16),
    ) -> Self {
        let mut documents = DocumentController::new(store.clone());
        let updates = documents.subscribe();
        let layout = PaneLayout::new(store.clone(), min_pane_width, state.editor_percent);
        let mut model = Self {
            documents,
            layout,
            store,
            updates,
            shown: Document::default(),
            preview: Preview::default(),
            preview_viewport: Viewport::default(),
            url_field: LineField::new(state.last_gist_url.as_deref().unwrap_or_default()),
            filename_field: LineField::default(),
            body: TextBuffer::empty(),
            body_viewport: Viewport::default(),
            body_hscroll: 0,
            focus: Focus::default(),
            pending_loads: 0,
            preparing_print: false,
            load_request: None,
            print_request: None,
            terminal_size,
            toast: None,
            should_quit: false,
        };
        model.refresh_preview(true);
        model.fit_viewports();
        model
    }

    /// Hydrate the document controller and mirror the result into the fields.
    ///
    /// On [`Startup::FetchDefault`] a load is counted as pending; the caller
    /// must answer it with `Message::StartupLoaded`.
    pub fn begin_startup(&mut self, state: &PersistedState) -> Startup {
        let startup = self.documents.begin_startup(state);
        if startup == Startup::FetchDefault {
            self.pending_loads += 1;
        }
        self.reset_fields();
        self.sync_preview();
        startup
    }

    pub const fn store(&self) -> &StoreAdapter {
        &self.store
    }

    /// The document the preview was built from.
    pub const fn shown(&self) -> &Document {
        &self.shown
    }

    pub const fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub const fn screen(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    pub fn pane_areas(&self) -> PaneAreas {
        pane_areas(self.screen(), &self.layout, self.preparing_print)
    }

    /// Columns available to rendered markdown.
    pub fn preview_width(&self) -> u16 {
        preview_text_area(self.pane_areas().preview).width.max(1)
    }

    /// Push the filename and body fields to the document controller.
    pub(super) fn commit_edit(&mut self) -> bool {
        let filename = self.filename_field.text();
        let content = self.body.text();
        self.documents.apply_edit(&filename, &content)
    }

    /// Overwrite the filename and body fields with the current document.
    pub(super) fn reset_fields(&mut self) {
        let current = self.documents.current();
        self.filename_field.set_text(&current.filename);
        self.body = TextBuffer::from_text(&current.content);
        self.body_viewport.go_to_top();
        self.body_hscroll = 0;
        self.preview_viewport.go_to_top();
        self.fit_viewports();
    }

    /// Pick up confirmed changes from the controller and re-render if needed.
    pub fn sync_preview(&mut self) {
        let changed = match self.updates.latest() {
            Some(document) => {
                self.shown = document;
                true
            }
            None => false,
        };
        self.refresh_preview(changed);
        self.fit_viewports();
    }

    /// Re-render when the document changed or the preview width moved.
    pub(super) fn refresh_preview(&mut self, document_changed: bool) {
        let width = self.preview_width();
        if document_changed || self.preview.width() != width {
            self.preview = Preview::render(&self.shown, width);
        }
    }

    /// Size both viewports to the current layout and keep the cursor in view.
    pub(super) fn fit_viewports(&mut self) {
        let areas = self.pane_areas();
        let preview_height = preview_text_area(areas.preview).height;
        self.preview_viewport.resize(preview_height);
        self.preview_viewport
            .set_total_lines(self.preview.line_count());

        let body = editor_rows(areas.editor).body;
        self.body_viewport.resize(body.height);
        self.body_viewport.set_total_lines(self.body.line_count());
        self.body_viewport.follow(self.body.cursor().line);

        let text_width = usize::from(
            body.width
                .saturating_sub(crate::ui::line_number_width(self.body.line_count()) + 1),
        );
        let col = self.body.cursor_display_col();
        if col < self.body_hscroll {
            self.body_hscroll = col;
        } else if text_width > 0 && col >= self.body_hscroll + text_width {
            self.body_hscroll = col + 1 - text_width;
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(
            StoreAdapter::new(MemoryStore::new()),
            &PersistedState::default(),
            DEFAULT_MIN_PANE_WIDTH,
            (80, 24),
        )
    }
}
