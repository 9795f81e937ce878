//! Stateless HTTP collaborators of the remote environment.
//!
//! These are simple request/response wrappers with no concurrency concerns;
//! every call is one JSON POST/GET against the configured `api_url`, carrying
//! `Content-Type: application/json` and, when a token is configured,
//! `Authorization: Bearer <token>`.
//!
//! Submodules:
//! - [`files`]: read/write/list/delete on the remote workspace.
//! - [`analysis`]: kick off remote code analysis.
//! - [`testing`]: run repository or local test suites.
//! - [`projects`]: CRUD over `/api/v2/projects`.

pub mod analysis;
pub mod files;
pub mod projects;
pub mod testing;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::{AppError, Result};

/// Maximum response-body length echoed into error messages.
const ERROR_BODY_SNIPPET_LEN: usize = 512;

/// Shared JSON-over-HTTP client for the collaborator endpoints.
pub struct HttpClient {
    base_url: String,
    auth_token: Option<String>,
    inner: reqwest::Client,
}

impl HttpClient {
    /// Create a client for the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token,
            inner: reqwest::Client::new(),
        }
    }

    /// Issue one JSON request against `path` (joined to the base URL).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Http`] on network failure or a non-2xx status;
    /// the error text carries the status and a snippet of the body so the
    /// calling agent gets something actionable.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        debug!(%method, %url, "http request");

        let mut request = self
            .inner
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.auth_token.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AppError::Http(format!("request to {path} failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::Http(format!("failed to read response from {path}: {err}")))?;

        if !status.is_success() {
            let snippet: String = text.chars().take(ERROR_BODY_SNIPPET_LEN).collect();
            return Err(AppError::Http(format!("{path} returned {status}: {snippet}")));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Some endpoints answer with plain text; pass it through verbatim.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// POST a JSON body to `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }
}
