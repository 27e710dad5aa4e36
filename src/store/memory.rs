use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{KeyValueStore, StoreError};

/// An in-memory medium.
///
/// Used for `--ephemeral` sessions and as the test double for the file
/// store. Clones share the same entries, so a test can keep one handle
/// while the controllers own another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
    fail_reads: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// Make every subsequent `set`/`remove` fail, as a full or disabled medium would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Make every subsequent `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Number of successful writes (sets and removes) so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Snapshot of a single value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.set("filename", "a.md").unwrap();
        assert_eq!(store.peek("filename").as_deref(), Some("a.md"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_failing_writes_leave_entries_untouched() {
        let mut store = MemoryStore::with_entries([("content", "old")]);
        store.fail_writes(true);
        assert!(store.set("content", "new").is_err());
        assert!(store.remove("content").is_err());
        assert_eq!(store.peek("content").as_deref(), Some("old"));
        assert_eq!(store.write_count(), 0);
    }
}
