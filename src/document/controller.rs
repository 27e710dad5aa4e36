use crate::remote::LoadResult;
use crate::store::{PersistedState, StoreAdapter};

use super::{ChangeFeed, Document, Subscription};

/// What the caller must do after [`DocumentController::begin_startup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    /// A persisted document was restored; nothing else to do.
    Hydrated,
    /// Nothing was persisted. Fetch the default document and hand the
    /// result to [`DocumentController::finish_startup`].
    FetchDefault,
    /// Startup already ran this session.
    AlreadyStarted,
}

/// How a startup fetch result was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// The fetched document replaced the empty one and was persisted.
    Loaded,
    /// The fetch failed; the fixed placeholder is shown.
    Placeholder,
    /// The user typed before the fetch finished; the result was dropped.
    Superseded,
    /// No startup fetch was pending.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    AwaitingDefault,
    Done,
}

/// Single owner of the session's [`Document`].
///
/// Every confirmed change runs the same three steps in order: replace the
/// in-memory document, publish it to subscribers, write it to the store.
/// The write is best-effort; a storage failure is logged by the adapter and
/// never undoes the first two steps.
#[derive(Debug)]
pub struct DocumentController {
    current: Document,
    store: StoreAdapter,
    feed: ChangeFeed,
    phase: Phase,
}

impl DocumentController {
    pub fn new(store: StoreAdapter) -> Self {
        Self {
            current: Document::default(),
            store,
            feed: ChangeFeed::new(),
            phase: Phase::NotStarted,
        }
    }

    pub const fn current(&self) -> &Document {
        &self.current
    }

    /// Register for confirmed changes.
    pub fn subscribe(&mut self) -> Subscription {
        self.feed.subscribe()
    }

    /// Apply typing in the filename or body field.
    ///
    /// Identical input is a no-op: no notification and no storage write.
    /// Returns whether the change was confirmed.
    pub fn apply_edit(&mut self, filename: &str, content: &str) -> bool {
        if self.current.filename == filename && self.current.content == content {
            return false;
        }
        self.confirm(Document::new(filename, content), true);
        true
    }

    /// Replace the document with one fetched from the remote store.
    ///
    /// Always confirmed and persisted, even when the text is unchanged.
    pub fn apply_loaded_document(&mut self, document: Document) {
        tracing::info!(filename = %document.filename, "applying loaded document");
        self.confirm(document, true);
    }

    /// Hydrate from persisted state. Runs at most once per session.
    pub fn begin_startup(&mut self, state: &PersistedState) -> Startup {
        if self.phase != Phase::NotStarted {
            tracing::debug!("startup requested twice; ignoring");
            return Startup::AlreadyStarted;
        }

        if state.has_document() {
            self.phase = Phase::Done;
            let restored = Document::new(
                state.filename.clone().unwrap_or_default(),
                state.content.clone().unwrap_or_default(),
            );
            tracing::debug!(filename = %restored.filename, "hydrated document from store");
            // Already durable; only the subscribers need to hear about it.
            self.confirm(restored, false);
            Startup::Hydrated
        } else {
            self.phase = Phase::AwaitingDefault;
            Startup::FetchDefault
        }
    }

    /// Complete a [`Startup::FetchDefault`] with the fetch result.
    ///
    /// A `None` result has already been reported by the loader and is not
    /// reported again here.
    pub fn finish_startup(&mut self, result: LoadResult) -> StartupOutcome {
        if self.phase != Phase::AwaitingDefault {
            return StartupOutcome::Ignored;
        }
        self.phase = Phase::Done;

        if !self.current.is_empty() {
            tracing::debug!("discarding startup document; user already edited");
            return StartupOutcome::Superseded;
        }

        match result {
            Some(document) => {
                self.apply_loaded_document(document);
                StartupOutcome::Loaded
            }
            None => {
                // Not persisted, so the next session tries the default again.
                self.confirm(Document::placeholder(), false);
                StartupOutcome::Placeholder
            }
        }
    }

    /// True while a startup fetch is outstanding.
    pub fn startup_pending(&self) -> bool {
        self.phase == Phase::AwaitingDefault
    }

    fn confirm(&mut self, document: Document, persist: bool) {
        self.current = document;
        self.feed.publish(&self.current);
        if persist && !self.store.save_document(&self.current) {
            tracing::debug!("document kept in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CONTENT_KEY, FILENAME_KEY, MemoryStore};

    fn controller_with(medium: &MemoryStore) -> DocumentController {
        DocumentController::new(StoreAdapter::new(medium.clone()))
    }

    #[test]
    fn test_identical_edit_is_noop() {
        let medium = MemoryStore::new();
        let mut controller = controller_with(&medium);
        let sub = controller.subscribe();

        assert!(controller.apply_edit("a.md", "hello"));
        assert!(!controller.apply_edit("a.md", "hello"));

        assert_eq!(sub.drain().len(), 1);
        // One document save is two key writes.
        assert_eq!(medium.write_count(), 2);
    }

    #[test]
    fn test_edit_of_either_field_is_confirmed() {
        let medium = MemoryStore::new();
        let mut controller = controller_with(&medium);
        let sub = controller.subscribe();

        controller.apply_edit("a.md", "x");
        controller.apply_edit("b.md", "x");
        controller.apply_edit("b.md", "xy");

        let seen = sub.drain();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], Document::new("b.md", "xy"));
        assert_eq!(medium.peek(FILENAME_KEY).as_deref(), Some("b.md"));
        assert_eq!(medium.peek(CONTENT_KEY).as_deref(), Some("xy"));
    }

    #[test]
    fn test_storage_failure_does_not_block_edits() {
        let medium = MemoryStore::new();
        medium.fail_writes(true);
        let mut controller = controller_with(&medium);
        let sub = controller.subscribe();

        assert!(controller.apply_edit("a.md", "typed"));

        assert_eq!(controller.current(), &Document::new("a.md", "typed"));
        assert_eq!(sub.latest(), Some(Document::new("a.md", "typed")));
    }

    #[test]
    fn test_loaded_document_always_confirmed() {
        let medium = MemoryStore::new();
        let mut controller = controller_with(&medium);
        controller.apply_edit("a.md", "same");
        let sub = controller.subscribe();
        let writes_before = medium.write_count();

        controller.apply_loaded_document(Document::new("a.md", "same"));

        assert_eq!(sub.drain().len(), 1);
        assert_eq!(medium.write_count(), writes_before + 2);
    }

    #[test]
    fn test_startup_prefers_persisted_document() {
        let medium = MemoryStore::with_entries([(FILENAME_KEY, "a.md"), (CONTENT_KEY, "hello")]);
        let adapter = StoreAdapter::new(medium.clone());
        let mut controller = DocumentController::new(adapter.clone());
        let sub = controller.subscribe();

        let startup = controller.begin_startup(&adapter.load_state());

        assert_eq!(startup, Startup::Hydrated);
        assert_eq!(controller.current(), &Document::new("a.md", "hello"));
        assert_eq!(sub.latest(), Some(Document::new("a.md", "hello")));
        assert_eq!(medium.write_count(), 0);
        assert!(!controller.startup_pending());
    }

    #[test]
    fn test_startup_without_state_requests_default_and_persists_it() {
        let medium = MemoryStore::new();
        let mut controller = controller_with(&medium);

        let startup = controller.begin_startup(&PersistedState::default());
        assert_eq!(startup, Startup::FetchDefault);
        assert!(controller.startup_pending());

        let outcome = controller.finish_startup(Some(Document::new("default.md", "# Hi")));
        assert_eq!(outcome, StartupOutcome::Loaded);
        assert_eq!(medium.peek(FILENAME_KEY).as_deref(), Some("default.md"));
        assert_eq!(medium.peek(CONTENT_KEY).as_deref(), Some("# Hi"));
    }

    #[test]
    fn test_startup_failure_falls_back_to_placeholder() {
        let medium = MemoryStore::new();
        let mut controller = controller_with(&medium);
        let sub = controller.subscribe();

        controller.begin_startup(&PersistedState::default());
        let outcome = controller.finish_startup(None);

        assert_eq!(outcome, StartupOutcome::Placeholder);
        assert_eq!(controller.current(), &Document::placeholder());
        assert_eq!(sub.drain().len(), 1);
        assert_eq!(medium.write_count(), 0);
    }

    #[test]
    fn test_startup_runs_once() {
        let mut controller = controller_with(&MemoryStore::new());
        assert_eq!(
            controller.begin_startup(&PersistedState::default()),
            Startup::FetchDefault
        );
        assert_eq!(
            controller.begin_startup(&PersistedState::default()),
            Startup::AlreadyStarted
        );

        controller.finish_startup(None);
        assert_eq!(
            controller.finish_startup(Some(Document::new("late.md", "late"))),
            StartupOutcome::Ignored
        );
        assert_eq!(controller.current(), &Document::placeholder());
    }

    #[test]
    fn test_early_edit_wins_over_startup_fetch() {
        let mut controller = controller_with(&MemoryStore::new());
        controller.begin_startup(&PersistedState::default());
        controller.apply_edit("", "typed first");

        let outcome = controller.finish_startup(Some(Document::new("default.md", "# Hi")));

        assert_eq!(outcome, StartupOutcome::Superseded);
        assert_eq!(controller.current(), &Document::new("", "typed first"));
    }
}
