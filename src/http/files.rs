//! Remote file operations: `POST {api_url}/api/files/{read|write|list|delete}`.

use serde_json::{json, Value};

use crate::Result;

use super::HttpClient;

/// Read a file from the remote workspace.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn read(client: &HttpClient, path: &str) -> Result<Value> {
    client.post("/api/files/read", &json!({ "path": path })).await
}

/// Write `content` to a file in the remote workspace.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn write(client: &HttpClient, path: &str, content: &str) -> Result<Value> {
    client
        .post("/api/files/write", &json!({ "path": path, "content": content }))
        .await
}

/// List a directory in the remote workspace.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn list(client: &HttpClient, path: &str) -> Result<Value> {
    client.post("/api/files/list", &json!({ "path": path })).await
}

/// Delete a file from the remote workspace.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn delete(client: &HttpClient, path: &str) -> Result<Value> {
    client
        .post("/api/files/delete", &json!({ "path": path }))
        .await
}
