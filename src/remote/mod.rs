//! Loading documents from GitHub Gists.
//!
//! Input from the URL field goes through [`extract_gist_id`] first; only a
//! recognizable id ever reaches the network. Fetching is behind the
//! [`GistFetcher`] trait so tests and benches can swap the HTTP client out.

mod github;

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::Url;

use crate::document::Document;

pub use github::{DEFAULT_API_BASE, GithubClient, parse_gist_response};

/// Result of a reported load: `None` means the failure was already shown to
/// the user and must not be reported again.
pub type LoadResult = Option<Document>;

/// Gist fetched at startup when no document is persisted.
pub const DEFAULT_GIST: &str = "aa5a315d61ae9438b18d";

const MIN_ID_LEN: usize = 20;

static ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)^[a-z0-9]+$").expect("id token pattern is valid"));
static HEX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)[a-f0-9]{20,}").expect("hex run pattern is valid"));

/// A validated gist identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GistId(String);

impl GistId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a gist could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid Gist URL or ID: {input:?}")]
    InvalidId { input: String },
    #[error("Gist not found (404)")]
    NotFound,
    #[error("GitHub API error: {status}{}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },
    #[error("Gist contains no files")]
    NoFiles,
    #[error("Could not access file data")]
    FileUnreadable,
    #[error("Unexpected response from GitHub: {0}")]
    Decode(String),
    #[error("Network error: {0}")]
    Transport(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" - {m}"))
        .unwrap_or_default()
}

/// Fetches a gist by id and normalizes it to a [`Document`].
pub trait GistFetcher: Send + Sync {
    /// # Errors
    /// Returns the failure kind for transport errors, error statuses, and
    /// responses without a usable first file.
    fn fetch(&self, id: &GistId) -> Result<Document, LoadError>;
}

/// Where load failures are shown to the user.
pub trait ReportFailure {
    fn report(&self, error: &LoadError);
}

/// Resolves user input to a gist and fetches it, reporting failures once.
#[derive(Clone)]
pub struct RemoteLoader {
    fetcher: Arc<dyn GistFetcher>,
}

impl RemoteLoader {
    pub fn new(fetcher: impl GistFetcher + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Load `input` (a gist URL or bare id).
    ///
    /// Any failure is handed to `reporter` before this returns `None`.
    pub fn load(&self, input: &str, reporter: &dyn ReportFailure) -> LoadResult {
        match self.try_load(input) {
            Ok(document) => {
                tracing::info!(filename = %document.filename, "gist loaded");
                Some(document)
            }
            Err(err) => {
                tracing::warn!("gist load failed: {err}");
                reporter.report(&err);
                None
            }
        }
    }

    /// Load without reporting.
    ///
    /// # Errors
    /// Returns [`LoadError::InvalidId`] without touching the network when
    /// no id can be extracted, otherwise whatever the fetcher returns.
    pub fn try_load(&self, input: &str) -> Result<Document, LoadError> {
        let id = extract_gist_id(input).ok_or_else(|| LoadError::InvalidId {
            input: input.to_string(),
        })?;
        tracing::info!(%id, "requesting gist");
        self.fetcher.fetch(&id)
    }
}

impl fmt::Debug for RemoteLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteLoader").finish_non_exhaustive()
    }
}

/// Pull a gist id out of a URL, a bare id, or free text.
///
/// Tried in order, first match wins:
/// 1. the last non-empty path segment of an absolute URL,
/// 2. the whole input,
/// 3. the first run of 20+ hex digits anywhere in the input.
///
/// Candidates for 1 and 2 must be ASCII alphanumeric and at least 20 long.
pub fn extract_gist_id(input: &str) -> Option<GistId> {
    if let Ok(url) = Url::parse(input)
        && let Some(segment) = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        && is_id_token(segment)
    {
        return Some(GistId(segment.to_string()));
    }

    if is_id_token(input) {
        return Some(GistId(input.to_string()));
    }

    HEX_RUN.find(input).map(|m| GistId(m.as_str().to_string()))
}

fn is_id_token(candidate: &str) -> bool {
    candidate.chars().count() >= MIN_ID_LEN && ID_TOKEN.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_extract_takes_trailing_url_segment() {
        let id = extract_gist_id("https://store.example/user/abcdefabcdefabcdefabcdef1234");
        assert_eq!(id.unwrap().as_str(), "abcdefabcdefabcdefabcdef1234");
    }

    #[test]
    fn test_extract_ignores_trailing_slash() {
        let id = extract_gist_id("https://gist.github.com/someone/0123456789abcdefABCD/");
        assert_eq!(id.unwrap().as_str(), "0123456789abcdefABCD");
    }

    #[test]
    fn test_extract_accepts_bare_id() {
        let id = extract_gist_id("abcdefabcdefabcdefabcdef1234");
        assert_eq!(id.unwrap().as_str(), "abcdefabcdefabcdefabcdef1234");
    }

    #[test]
    fn test_extract_accepts_bare_alphanumeric_id() {
        // Not hex, but alphanumeric and long enough.
        let id = extract_gist_id("zyxwvutsrqponmlkjihg");
        assert_eq!(id.unwrap().as_str(), "zyxwvutsrqponmlkjihg");
    }

    #[test]
    fn test_extract_rejects_plain_text() {
        assert_eq!(extract_gist_id("not a valid id"), None);
        assert_eq!(extract_gist_id(""), None);
    }

    #[test]
    fn test_extract_rejects_short_ids() {
        assert_eq!(extract_gist_id("abc123"), None);
        assert_eq!(extract_gist_id("https://gist.github.com/u/abc123"), None);
    }

    #[test]
    fn test_extract_rejects_non_ascii_letters() {
        // KELVIN SIGN and LONG S fold to ASCII letters under Unicode case rules.
        assert_eq!(extract_gist_id(&"\u{212A}".repeat(7)), None);
        assert_eq!(extract_gist_id(&"\u{017F}".repeat(10)), None);
        assert_eq!(extract_gist_id(&format!("{}{}", "\u{212A}", "a".repeat(19))), None);
    }

    #[test]
    fn test_extract_does_not_trim_input() {
        assert_eq!(extract_gist_id(" zyxwvutsrqponmlkjihg "), None);
        let id = extract_gist_id(" aa5a315d61ae9438b18d ");
        assert_eq!(id.unwrap().as_str(), "aa5a315d61ae9438b18d");
    }

    #[test]
    fn test_extract_finds_embedded_hex_run() {
        let id = extract_gist_id("prefix-deadbeefdeadbeefdeadbeef-suffix");
        assert_eq!(id.unwrap().as_str(), "deadbeefdeadbeefdeadbeef");
    }

    #[test]
    fn test_extract_falls_back_to_hex_in_url_query() {
        let id = extract_gist_id("https://example.com/view?id=DEADBEEFDEADBEEFDEADBEEF");
        assert_eq!(id.unwrap().as_str(), "DEADBEEFDEADBEEFDEADBEEF");
    }

    struct CountingFetcher {
        calls: AtomicUsize,
        result: Mutex<Result<Document, LoadError>>,
    }

    impl CountingFetcher {
        fn new(result: Result<Document, LoadError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Mutex::new(result),
            })
        }
    }

    impl GistFetcher for Arc<CountingFetcher> {
        fn fetch(&self, _id: &GistId) -> Result<Document, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<LoadError>>);

    impl ReportFailure for Recorder {
        fn report(&self, error: &LoadError) {
            self.0.borrow_mut().push(error.clone());
        }
    }

    #[test]
    fn test_invalid_input_reports_without_fetching() {
        let fetcher = CountingFetcher::new(Ok(Document::new("a.md", "x")));
        let loader = RemoteLoader::new(fetcher.clone());
        let recorder = Recorder::default();

        assert_eq!(loader.load("not a valid id", &recorder), None);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        let reported = recorder.0.borrow();
        assert_eq!(reported.len(), 1);
        assert!(matches!(reported[0], LoadError::InvalidId { .. }));
    }

    #[test]
    fn test_fetch_failure_reported_exactly_once() {
        let fetcher = CountingFetcher::new(Err(LoadError::NotFound));
        let loader = RemoteLoader::new(fetcher.clone());
        let recorder = Recorder::default();

        assert_eq!(loader.load("abcdefabcdefabcdefabcdef1234", &recorder), None);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*recorder.0.borrow(), vec![LoadError::NotFound]);
    }

    #[test]
    fn test_success_is_not_reported() {
        let fetcher = CountingFetcher::new(Ok(Document::new("a.md", "x")));
        let loader = RemoteLoader::new(fetcher);
        let recorder = Recorder::default();

        let loaded = loader.load("abcdefabcdefabcdefabcdef1234", &recorder);

        assert_eq!(loaded, Some(Document::new("a.md", "x")));
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn test_api_error_message_includes_server_detail() {
        let err = LoadError::Api {
            status: 403,
            message: Some("API rate limit exceeded".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "GitHub API error: 403 - API rate limit exceeded"
        );
        let bare = LoadError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(bare.to_string(), "GitHub API error: 500");
    }
}
