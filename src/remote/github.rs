use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::document::{Document, UNTITLED};

use super::{GistFetcher, GistId, LoadError};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Gist fetcher backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    api_base: String,
    http: Client,
}

impl GithubClient {
    /// # Errors
    /// Returns [`LoadError::Transport`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(api_base: impl Into<String>) -> Result<Self, LoadError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        Ok(Self {
            api_base: api_base.into(),
            http,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn gist_url(&self, id: &GistId) -> String {
        format!("{}/gists/{id}", self.api_base.trim_end_matches('/'))
    }
}

impl GistFetcher for GithubClient {
    fn fetch(&self, id: &GistId) -> Result<Document, LoadError> {
        let url = self.gist_url(id);
        tracing::debug!(%url, "GET gist");
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        parse_gist_response(status, &body)
    }
}

#[derive(Deserialize)]
struct GistBody {
    #[serde(default)]
    files: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Turn an HTTP status and body from `GET /gists/{id}` into a document.
///
/// The first file in response order wins. Missing `filename` becomes
/// [`UNTITLED`], missing `content` becomes empty.
///
/// # Errors
/// See [`LoadError`]; a 404 is reported as [`LoadError::NotFound`], every
/// other non-2xx status as [`LoadError::Api`].
pub fn parse_gist_response(status: u16, body: &str) -> Result<Document, LoadError> {
    if !(200..300).contains(&status) {
        if status == 404 {
            return Err(LoadError::NotFound);
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        return Err(LoadError::Api { status, message });
    }

    let gist: GistBody =
        serde_json::from_str(body).map_err(|e| LoadError::Decode(e.to_string()))?;
    let Some((_, first)) = gist.files.unwrap_or_default().into_iter().next() else {
        return Err(LoadError::NoFiles);
    };
    let Value::Object(file) = first else {
        return Err(LoadError::FileUnreadable);
    };

    let filename = file
        .get("filename")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNTITLED);
    let content = file.get("content").and_then(Value::as_str).unwrap_or("");
    Ok(Document::new(filename, content))
}
