//! Unit tests for configuration loading: TOML parsing, environment
//! overrides, validation, and the connect-URL token parameter.
//!
//! Tests that mutate process environment variables are `#[serial]` so they
//! cannot observe each other's state.

use std::env;
use std::io::Write;

use serial_test::serial;

use devlink::{AppError, Config};

const ENV_KEYS: &[&str] = &[
    "API_URL",
    "WS_URL",
    "AUTH_TOKEN",
    "SYSTEM_PROMPT",
    "COMMAND_TIMEOUT_SECS",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

/// A complete TOML file loads without any environment present.
#[test]
#[serial]
fn toml_file_loads() {
    clear_env();
    let file = write_config(
        r#"
api_url = "https://api.example.test"
ws_url = "wss://ws.example.test"
command_timeout_secs = 45
"#,
    );

    let config = Config::load(Some(file.path())).expect("config loads");

    assert_eq!(config.api_url, "https://api.example.test");
    assert_eq!(config.ws_url, "wss://ws.example.test");
    assert_eq!(config.command_timeout_secs, 45);
    assert!(config.auth_token.is_none());
}

/// Environment variables override values from the file.
#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let file = write_config(
        r#"
api_url = "https://file.example.test"
ws_url = "wss://file.example.test"
"#,
    );
    env::set_var("API_URL", "https://env.example.test");
    env::set_var("COMMAND_TIMEOUT_SECS", "5");

    let config = Config::load(Some(file.path())).expect("config loads");
    clear_env();

    assert_eq!(config.api_url, "https://env.example.test");
    assert_eq!(config.ws_url, "wss://file.example.test");
    assert_eq!(config.command_timeout_secs, 5);
}

/// With no file at all, env alone is sufficient.
#[test]
#[serial]
fn env_only_configuration() {
    clear_env();
    env::set_var("API_URL", "https://env.example.test");
    env::set_var("WS_URL", "wss://env.example.test");
    env::set_var("AUTH_TOKEN", "tok-123");
    env::set_var("SYSTEM_PROMPT", "custom prompt");

    let config = Config::load(None).expect("config loads");
    clear_env();

    assert_eq!(config.api_url, "https://env.example.test");
    assert_eq!(config.auth_token.as_deref(), Some("tok-123"));
    assert_eq!(config.system_prompt.as_deref(), Some("custom prompt"));
    assert_eq!(config.command_timeout_secs, 30, "default deadline");
}

/// Missing `api_url` is a config error naming the fix.
#[test]
#[serial]
fn missing_api_url_is_config_error() {
    clear_env();
    env::set_var("WS_URL", "wss://env.example.test");

    let result = Config::load(None);
    clear_env();

    match result {
        Err(AppError::Config(msg)) => assert!(msg.contains("api_url"), "got: {msg}"),
        other => panic!("expected Err(AppError::Config), got: {other:?}"),
    }
}

/// Missing `ws_url` is likewise rejected.
#[test]
#[serial]
fn missing_ws_url_is_config_error() {
    clear_env();
    env::set_var("API_URL", "https://env.example.test");

    let result = Config::load(None);
    clear_env();

    assert!(matches!(result, Err(AppError::Config(_))));
}

/// A zero deadline is rejected at load time.
#[test]
#[serial]
fn zero_timeout_is_config_error() {
    clear_env();
    env::set_var("API_URL", "https://env.example.test");
    env::set_var("WS_URL", "wss://env.example.test");
    env::set_var("COMMAND_TIMEOUT_SECS", "0");

    let result = Config::load(None);
    clear_env();

    match result {
        Err(AppError::Config(msg)) => {
            assert!(msg.contains("command_timeout_secs"), "got: {msg}");
        }
        other => panic!("expected Err(AppError::Config), got: {other:?}"),
    }
}

/// A non-numeric deadline override is rejected rather than silently ignored.
#[test]
#[serial]
fn non_numeric_timeout_is_config_error() {
    clear_env();
    env::set_var("API_URL", "https://env.example.test");
    env::set_var("WS_URL", "wss://env.example.test");
    env::set_var("COMMAND_TIMEOUT_SECS", "soon");

    let result = Config::load(None);
    clear_env();

    assert!(matches!(result, Err(AppError::Config(_))));
}

/// The connect URL appends the bearer token as a query parameter only when
/// one is configured.
#[test]
#[serial]
fn connect_url_carries_token_when_present() {
    clear_env();
    env::set_var("API_URL", "https://env.example.test");
    env::set_var("WS_URL", "wss://env.example.test/ws");

    let mut config = Config::load(None).expect("config loads");
    clear_env();

    assert_eq!(config.connect_url(), "wss://env.example.test/ws");

    config.auth_token = Some("tok-abc".to_owned());
    assert_eq!(config.connect_url(), "wss://env.example.test/ws?token=tok-abc");
}

/// Invalid TOML surfaces as a config error.
#[test]
#[serial]
fn invalid_toml_is_config_error() {
    clear_env();
    let file = write_config("api_url = [not toml");

    let result = Config::load(Some(file.path()));

    assert!(matches!(result, Err(AppError::Config(_))));
}
