//! Durable key-value persistence.
//!
//! The editor keeps a handful of string values (filename, content, pane
//! split, last loaded gist URL) between sessions. Storage is split in two
//! layers:
//!
//! - [`KeyValueStore`]: the raw medium. Every call can fail.
//! - [`StoreAdapter`]: the typed, failure-contained view the controllers use.
//!   Failures are logged and degrade to defaults; they never reach the UI.

mod adapter;
mod file;
mod memory;

use std::path::PathBuf;

pub use adapter::{
    CONTENT_KEY, EDITOR_PERCENT_KEY, FILENAME_KEY, LAST_GIST_URL_KEY, PersistedState,
    StoreAdapter, parse_editor_percent,
};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a storage medium.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed persistence medium.
///
/// Implementations may fail on any call (disk full, permissions, a disabled
/// backend). Callers outside this module go through [`StoreAdapter`], which
/// contains those failures.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
