//! Remote test execution: `POST {api_url}/api/testing/{repository|local}`.

use serde_json::{json, Value};

use crate::Result;

use super::HttpClient;

/// Run the test suite of a repository, optionally naming its URL.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn repository(client: &HttpClient, url: Option<&str>) -> Result<Value> {
    let body = match url {
        Some(url) => json!({ "url": url }),
        None => json!({}),
    };
    client.post("/api/testing/repository", &body).await
}

/// Run tests in the remote workspace, optionally scoped to `path`.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn local(client: &HttpClient, path: Option<&str>) -> Result<Value> {
    let body = match path {
        Some(path) => json!({ "path": path }),
        None => json!({}),
    };
    client.post("/api/testing/local", &body).await
}
