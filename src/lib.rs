#![forbid(unsafe_code)]

//! `devlink` — client adapter giving an AI-agent runtime access to a remote
//! development environment: streamed terminal execution over one persistent
//! WebSocket, plus stateless HTTP endpoints for files, analysis, tests, and
//! projects.

pub mod adapter;
pub mod config;
pub mod errors;
pub mod http;
pub mod prompt;
pub mod session;
pub mod wire;

pub use config::Config;
pub use errors::{AppError, Result};
