//! Project management: `{GET|POST|PUT|DELETE} {api_url}/api/v2/projects[/{id}]`.

use reqwest::Method;
use serde_json::Value;

use crate::Result;

use super::HttpClient;

/// List all projects.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn list(client: &HttpClient) -> Result<Value> {
    client.get("/api/v2/projects").await
}

/// Fetch one project by id.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn get(client: &HttpClient, id: &str) -> Result<Value> {
    client.get(&format!("/api/v2/projects/{id}")).await
}

/// Create a project from the given body.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn create(client: &HttpClient, body: &Value) -> Result<Value> {
    client.post("/api/v2/projects", body).await
}

/// Update a project by id.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn update(client: &HttpClient, id: &str, body: &Value) -> Result<Value> {
    client
        .request(Method::PUT, &format!("/api/v2/projects/{id}"), Some(body))
        .await
}

/// Delete a project by id.
///
/// # Errors
///
/// Returns [`AppError::Http`](crate::AppError::Http) on request failure.
pub async fn delete(client: &HttpClient, id: &str) -> Result<Value> {
    client
        .request(Method::DELETE, &format!("/api/v2/projects/{id}"), None)
        .await
}
