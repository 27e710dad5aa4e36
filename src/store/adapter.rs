use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::document::Document;

use super::KeyValueStore;

pub const FILENAME_KEY: &str = "filename";
pub const CONTENT_KEY: &str = "content";
pub const EDITOR_PERCENT_KEY: &str = "editor-width-percent";
pub const LAST_GIST_URL_KEY: &str = "last-gist-url";

/// Restored split percentages must fall strictly inside this range.
const MIN_RESTORED_PERCENT: f64 = 5.0;
const MAX_RESTORED_PERCENT: f64 = 95.0;

/// Everything read from the medium at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub filename: Option<String>,
    pub content: Option<String>,
    pub editor_percent: Option<f64>,
    pub last_gist_url: Option<String>,
}

impl PersistedState {
    /// True when neither a filename nor any content was persisted.
    pub fn has_document(&self) -> bool {
        let non_empty = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        non_empty(&self.filename) || non_empty(&self.content)
    }
}

/// Typed, failure-contained access to a [`KeyValueStore`].
///
/// Cloning the adapter shares the underlying medium, which is how the
/// document and layout controllers end up writing to the same place.
/// No method returns an error: read failures look like missing values and
/// write failures are reported as `false`, both logged.
#[derive(Clone)]
pub struct StoreAdapter {
    medium: Rc<RefCell<dyn KeyValueStore>>,
}

impl StoreAdapter {
    pub fn new(medium: impl KeyValueStore + 'static) -> Self {
        Self {
            medium: Rc::new(RefCell::new(medium)),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.medium.borrow().get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, "store read failed: {err}");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> bool {
        match self.medium.borrow_mut().set(key, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, "store write failed: {err}");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.medium.borrow_mut().remove(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, "store remove failed: {err}");
                false
            }
        }
    }

    /// Read all persisted keys. Called once per session.
    pub fn load_state(&self) -> PersistedState {
        let editor_percent = self.get(EDITOR_PERCENT_KEY).and_then(|raw| {
            let parsed = parse_editor_percent(&raw);
            if parsed.is_none() {
                tracing::warn!(value = %raw, "ignoring out-of-range editor width");
            }
            parsed
        });
        PersistedState {
            filename: self.get(FILENAME_KEY),
            content: self.get(CONTENT_KEY),
            editor_percent,
            last_gist_url: self.get(LAST_GIST_URL_KEY),
        }
    }

    /// Persist the filename and content. Returns `true` only if both writes landed.
    pub fn save_document(&self, document: &Document) -> bool {
        let filename_ok = self.set(FILENAME_KEY, &document.filename);
        let content_ok = self.set(CONTENT_KEY, &document.content);
        filename_ok && content_ok
    }

    pub fn save_editor_percent(&self, percent: f64) -> bool {
        self.set(EDITOR_PERCENT_KEY, &percent.to_string())
    }

    pub fn save_last_gist_url(&self, url: &str) -> bool {
        self.set(LAST_GIST_URL_KEY, url)
    }
}

impl fmt::Debug for StoreAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreAdapter").finish_non_exhaustive()
    }
}

/// Parse a persisted split percentage, rejecting anything that would
/// leave one pane unusably small.
pub fn parse_editor_percent(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > MIN_RESTORED_PERCENT && *p < MAX_RESTORED_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_parse_editor_percent_accepts_open_interval() {
        assert_eq!(parse_editor_percent("50"), Some(50.0));
        assert_eq!(parse_editor_percent(" 37.25 "), Some(37.25));
        assert_eq!(parse_editor_percent("5.0001"), Some(5.0001));
    }

    #[test]
    fn test_parse_editor_percent_rejects_bounds_and_garbage() {
        for raw in ["5", "95", "0", "100", "-20", "NaN", "inf", "", "wide", "50%"] {
            assert_eq!(parse_editor_percent(raw), None, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_load_state_reads_every_key() {
        let medium = MemoryStore::with_entries([
            (FILENAME_KEY, "a.md"),
            (CONTENT_KEY, "hello"),
            (EDITOR_PERCENT_KEY, "62.5"),
            (LAST_GIST_URL_KEY, "https://gist.github.com/u/abc"),
        ]);
        let state = StoreAdapter::new(medium).load_state();
        assert_eq!(state.filename.as_deref(), Some("a.md"));
        assert_eq!(state.content.as_deref(), Some("hello"));
        assert_eq!(state.editor_percent, Some(62.5));
        assert_eq!(
            state.last_gist_url.as_deref(),
            Some("https://gist.github.com/u/abc")
        );
        assert!(state.has_document());
    }

    #[test]
    fn test_load_state_drops_invalid_percent() {
        let medium = MemoryStore::with_entries([(EDITOR_PERCENT_KEY, "99")]);
        let state = StoreAdapter::new(medium).load_state();
        assert_eq!(state.editor_percent, None);
        assert!(!state.has_document());
    }

    #[test]
    fn test_empty_strings_do_not_count_as_document() {
        let medium = MemoryStore::with_entries([(FILENAME_KEY, ""), (CONTENT_KEY, "")]);
        assert!(!StoreAdapter::new(medium).load_state().has_document());
    }

    #[test]
    fn test_read_failure_degrades_to_defaults() {
        let medium = MemoryStore::with_entries([(FILENAME_KEY, "a.md")]);
        medium.fail_reads(true);
        let state = StoreAdapter::new(medium).load_state();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn test_write_failure_reports_false() {
        let medium = MemoryStore::new();
        medium.fail_writes(true);
        let adapter = StoreAdapter::new(medium.clone());
        assert!(!adapter.save_editor_percent(40.0));
        assert!(!adapter.save_document(&Document::new("a.md", "x")));
        assert_eq!(medium.peek(FILENAME_KEY), None);
    }

    #[test]
    fn test_saved_percent_reads_back() {
        let medium = MemoryStore::new();
        let adapter = StoreAdapter::new(medium.clone());
        assert!(adapter.save_editor_percent(41.5));
        assert_eq!(medium.peek(EDITOR_PERCENT_KEY).as_deref(), Some("41.5"));
        assert_eq!(adapter.load_state().editor_percent, Some(41.5));
    }

    #[test]
    fn test_remove_clears_key_and_contains_failures() {
        let medium = MemoryStore::with_entries([(LAST_GIST_URL_KEY, "aa5a315d61ae9438b18d")]);
        let adapter = StoreAdapter::new(medium.clone());

        assert!(adapter.remove(LAST_GIST_URL_KEY));
        assert_eq!(adapter.get(LAST_GIST_URL_KEY), None);
        assert!(adapter.remove(LAST_GIST_URL_KEY), "missing key is not an error");

        assert!(adapter.set(FILENAME_KEY, "a.md"));
        medium.fail_writes(true);
        assert!(!adapter.remove(FILENAME_KEY));
        assert_eq!(medium.peek(FILENAME_KEY).as_deref(), Some("a.md"));
    }
}
