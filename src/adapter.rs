//! Agent-facing dispatch surface.
//!
//! Validates incoming tool requests, routes them to the command session or
//! the HTTP collaborators, and renders every downstream failure as
//! descriptive text so the calling agent always receives something it can
//! reason about. Only argument validation fails fast as an error
//! ([`AppError::InvalidArgument`]); nothing is retried automatically.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::http::{self, HttpClient};
use crate::prompt;
use crate::session::Session;
use crate::{AppError, Result};

/// One request from the calling agent. Which fields are required depends on
/// `action`; validation happens in [`Adapter::dispatch`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRequest {
    /// What to do: `terminal`, `file`, `analysis`, `test`, or `project`.
    #[serde(default)]
    pub action: String,
    /// Shell command for `terminal`.
    #[serde(default)]
    pub command: Option<String>,
    /// Sub-operation for `file`, `test`, and `project`.
    #[serde(default)]
    pub operation: Option<String>,
    /// Workspace path for `file` and `analysis`.
    #[serde(default)]
    pub path: Option<String>,
    /// File content for `file write`.
    #[serde(default)]
    pub content: Option<String>,
    /// Project id for `project get/update/delete`.
    #[serde(default)]
    pub id: Option<String>,
    /// JSON body for `project create/update`.
    #[serde(default)]
    pub body: Option<Value>,
    /// Repository URL or local path for `test`.
    #[serde(default)]
    pub target: Option<String>,
}

/// The adapter: one command session plus the stateless HTTP collaborators.
pub struct Adapter {
    session: Session,
    http: HttpClient,
    prompt: String,
}

impl Adapter {
    /// Build an adapter from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(config),
            http: HttpClient::new(config.api_url.clone(), config.auth_token.clone()),
            prompt: prompt::system_prompt(config),
        }
    }

    /// Agent-facing description of the available actions.
    #[must_use]
    pub fn describe(&self) -> &str {
        &self.prompt
    }

    /// The command session, for callers that want termination metadata.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Validate and execute one request, returning the response text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidArgument`] when a required field is
    /// missing or the action/operation is unknown — nothing is sent in that
    /// case. Every other failure (transport, HTTP, remote) is rendered into
    /// the returned text instead of propagating.
    pub async fn dispatch(&self, req: ToolRequest) -> Result<String> {
        match self.route(req).await {
            Ok(text) => Ok(text),
            Err(err @ AppError::InvalidArgument(_)) => Err(err),
            Err(err) => {
                warn!(%err, "request failed, reporting as text");
                Ok(err.to_string())
            }
        }
    }

    /// Tear down the command session.
    pub async fn close(&self) {
        self.session.close().await;
    }

    async fn route(&self, req: ToolRequest) -> Result<String> {
        match req.action.as_str() {
            "terminal" => {
                let command = require(req.command.as_deref(), "command")?;
                self.session.execute(command).await
            }
            "file" => self.route_file(&req).await,
            "analysis" => {
                let result = http::analysis::start(&self.http, req.path.as_deref()).await?;
                render(&result)
            }
            "test" => self.route_test(&req).await,
            "project" => self.route_project(&req).await,
            "" => Err(AppError::InvalidArgument("action is required".into())),
            other => Err(AppError::InvalidArgument(format!("unknown action '{other}'"))),
        }
    }

    async fn route_file(&self, req: &ToolRequest) -> Result<String> {
        let operation = require(req.operation.as_deref(), "operation")?;
        let path = require(req.path.as_deref(), "path")?;

        let result = match operation {
            "read" => http::files::read(&self.http, path).await?,
            "write" => {
                let content = require(req.content.as_deref(), "content")?;
                http::files::write(&self.http, path, content).await?
            }
            "list" => http::files::list(&self.http, path).await?,
            "delete" => http::files::delete(&self.http, path).await?,
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown file operation '{other}'"
                )))
            }
        };
        render(&result)
    }

    async fn route_test(&self, req: &ToolRequest) -> Result<String> {
        let operation = require(req.operation.as_deref(), "operation")?;

        let result = match operation {
            "repository" => http::testing::repository(&self.http, req.target.as_deref()).await?,
            "local" => http::testing::local(&self.http, req.target.as_deref()).await?,
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown test operation '{other}'"
                )))
            }
        };
        render(&result)
    }

    async fn route_project(&self, req: &ToolRequest) -> Result<String> {
        let operation = require(req.operation.as_deref(), "operation")?;

        let result = match operation {
            "list" => http::projects::list(&self.http).await?,
            "get" => {
                let id = require(req.id.as_deref(), "id")?;
                http::projects::get(&self.http, id).await?
            }
            "create" => {
                let body = req
                    .body
                    .as_ref()
                    .ok_or_else(|| AppError::InvalidArgument("body is required".into()))?;
                http::projects::create(&self.http, body).await?
            }
            "update" => {
                let id = require(req.id.as_deref(), "id")?;
                let body = req
                    .body
                    .as_ref()
                    .ok_or_else(|| AppError::InvalidArgument("body is required".into()))?;
                http::projects::update(&self.http, id, body).await?
            }
            "delete" => {
                let id = require(req.id.as_deref(), "id")?;
                http::projects::delete(&self.http, id).await?
            }
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "unknown project operation '{other}'"
                )))
            }
        };
        render(&result)
    }
}

/// Require a non-empty string field.
fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::InvalidArgument(format!("{field} is required"))),
    }
}

/// Render an endpoint's JSON answer as text for the agent.
fn render(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("ok".to_owned()),
        Value::String(text) => Ok(text.clone()),
        other => serde_json::to_string_pretty(other)
            .map_err(|err| AppError::Protocol(format!("unrenderable response: {err}"))),
    }
}
