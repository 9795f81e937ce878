//! JSON wire frames exchanged over the persistent WebSocket connection.
//!
//! The protocol is a thin request/response multiplex: each outbound frame
//! carries a fresh invocation id, and every inbound frame names the
//! invocation it belongs to. Frame shapes:
//!
//! | Direction | Shape                                                          |
//! |-----------|----------------------------------------------------------------|
//! | outbound  | `{"id": "...", "type": "command", "content": {"command": "..."}}` |
//! | inbound   | `{"id": "...", "type": "stdout"\|"stderr"\|"system"\|"error", "content": "..."}` |
//!
//! `stdout` / `stderr` frames are partial-output fragments; `system` and
//! `error` frames are terminal markers. Any other tag is preserved as
//! [`FrameKind::Other`] and dropped by the router.

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Payload of an outbound `command` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandContent {
    /// Shell command line to execute in the remote environment.
    pub command: String,
}

/// Outbound frame requesting remote command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Invocation identifier; unique among currently pending invocations.
    pub id: String,
    /// Always `"command"` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    /// Command payload.
    pub content: CommandContent,
}

impl CommandFrame {
    /// Build a `command` frame for the given invocation id.
    #[must_use]
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "command".to_owned(),
            content: CommandContent {
                command: command.into(),
            },
        }
    }

    /// Serialize to the single-line JSON text sent over the socket.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Protocol`] if serialization fails (should not
    /// occur for well-formed frames).
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| AppError::Protocol(format!("failed to serialize command frame: {e}")))
    }
}

/// Inbound frame tag. Server-defined tags outside the known set are kept
/// verbatim in [`FrameKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Partial standard-output fragment.
    Stdout,
    /// Partial standard-error fragment.
    Stderr,
    /// Terminal marker: command completed.
    System,
    /// Terminal marker: command failed remotely.
    Error,
    /// Any other server-defined tag.
    #[serde(untagged)]
    Other(String),
}

impl FrameKind {
    /// Whether this tag terminates its invocation.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::System | Self::Error)
    }

    /// Whether this tag is a partial-output fragment.
    #[must_use]
    pub fn is_fragment(&self) -> bool {
        matches!(self, Self::Stdout | Self::Stderr)
    }
}

/// Inbound frame referencing one pending invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    /// Invocation identifier this frame belongs to.
    pub id: String,
    /// Frame tag.
    #[serde(rename = "type")]
    pub kind: FrameKind,
    /// Fragment text or terminal message.
    #[serde(default)]
    pub content: String,
}

impl InboundFrame {
    /// Parse a raw socket message into an inbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Protocol`] when `raw` is not a well-formed frame.
    /// The router logs and drops such frames; they are never surfaced to
    /// callers.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Protocol(format!("malformed inbound frame: {e}")))
    }
}
