//! Remote code analysis: `POST {api_url}/api/analysis/start`.

use serde_json::{json, Value};

use crate::Result;

use super::HttpClient;

/// Start a remote analysis run, optionally scoped to `path`.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn start(client: &HttpClient, path: Option<&str>) -> Result<Value> {
    let body = match path {
        Some(path) => json!({ "path": path }),
        None => json!({}),
    };
    client.post("/api/analysis/start", &body).await
}
