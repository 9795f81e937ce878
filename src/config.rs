//! Adapter configuration: TOML file, environment overrides, and credential
//! loading.
//!
//! Precedence is file < environment: every field of an optional `config.toml`
//! can be overridden by `API_URL`, `WS_URL`, `AUTH_TOKEN`, `SYSTEM_PROMPT`,
//! and `COMMAND_TIMEOUT_SECS`. The bearer token is additionally sourced from
//! the OS keychain before falling back to the environment.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Default per-invocation deadline in seconds.
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

/// Adapter configuration parsed from `config.toml` and/or the environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Base URL for the stateless HTTP endpoints.
    #[serde(default)]
    pub api_url: String,
    /// Base URL for the persistent WebSocket connection.
    #[serde(default)]
    pub ws_url: String,
    /// Optional bearer credential (populated at runtime, never from TOML).
    #[serde(skip)]
    pub auth_token: Option<String>,
    /// Optional override of the agent-facing description text.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Per-invocation deadline for remote command execution.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Config {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, contains
    /// invalid TOML, or validation fails (missing `api_url`/`ws_url`,
    /// zero timeout).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = fs::read_to_string(p)
                    .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
                toml::from_str::<Self>(&raw)?
            }
            None => Self {
                api_url: String::new(),
                ws_url: String::new(),
                auth_token: None,
                system_prompt: None,
                command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the bearer credential from the OS keychain with env-var fallback.
    ///
    /// Tries the `devlink` keyring service first, then `AUTH_TOKEN`. A
    /// missing credential is not an error — the adapter runs anonymously and
    /// omits the `Authorization` header and the connection query parameter.
    pub async fn load_auth_token(&mut self) {
        self.auth_token = load_credential("auth_token", "AUTH_TOKEN").await;
    }

    /// WebSocket endpoint with the bearer token appended as a query
    /// parameter when configured.
    #[must_use]
    pub fn connect_url(&self) -> String {
        match self.auth_token.as_deref() {
            Some(token) if !token.is_empty() => format!("{}?token={token}", self.ws_url),
            _ => self.ws_url.clone(),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = env::var("API_URL") {
            self.api_url = v;
        }
        if let Ok(v) = env::var("WS_URL") {
            self.ws_url = v;
        }
        if let Ok(v) = env::var("AUTH_TOKEN") {
            if !v.is_empty() {
                self.auth_token = Some(v);
            }
        }
        if let Ok(v) = env::var("SYSTEM_PROMPT") {
            if !v.is_empty() {
                self.system_prompt = Some(v);
            }
        }
        if let Ok(v) = env::var("COMMAND_TIMEOUT_SECS") {
            self.command_timeout_secs = v.parse().map_err(|err| {
                AppError::Config(format!("COMMAND_TIMEOUT_SECS is not a number: {err}"))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(AppError::Config(
                "api_url is required (config file or API_URL env var)".into(),
            ));
        }
        if self.ws_url.trim().is_empty() {
            return Err(AppError::Config(
                "ws_url is required (config file or WS_URL env var)".into(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(AppError::Config(
                "command_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Load a single credential from the OS keychain with env-var fallback.
///
/// Returns `None` when neither source provides a non-empty value.
async fn load_credential(keyring_key: &str, env_key: &str) -> Option<String> {
    let key = keyring_key.to_owned();

    // Keyring is synchronous I/O; keep it off the async threads.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("devlink", &key).and_then(|entry| entry.get_password())
    })
    .await;

    match keychain_result {
        Ok(Ok(value)) if !value.is_empty() => return Some(value),
        Ok(Ok(_)) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Ok(Err(err)) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
        Err(err) => {
            warn!(key = keyring_key, %err, "keychain task panicked, trying env var");
        }
    }

    env::var(env_key).ok().filter(|v| !v.is_empty())
}
