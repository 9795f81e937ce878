//! Unit tests for the JSON wire frames.

use serde_json::{json, Value};

use devlink::wire::{CommandFrame, FrameKind, InboundFrame};
use devlink::AppError;

// ── Outbound command frames ──────────────────────────────────────────────────

/// The outbound frame serializes to exactly
/// `{"id", "type": "command", "content": {"command"}}`.
#[test]
fn command_frame_serializes_to_wire_shape() {
    let frame = CommandFrame::new("inv-1", "ls -la");
    let text = frame.to_text().expect("serialize");
    let value: Value = serde_json::from_str(&text).expect("valid json");

    assert_eq!(
        value,
        json!({
            "id": "inv-1",
            "type": "command",
            "content": { "command": "ls -la" }
        }),
    );
}

// ── Inbound frames ───────────────────────────────────────────────────────────

/// A well-formed stdout frame parses with its id, tag, and content.
#[test]
fn stdout_frame_parses() {
    let raw = r#"{"id":"inv-2","type":"stdout","content":"total 0"}"#;
    let frame = InboundFrame::parse(raw).expect("parse");

    assert_eq!(frame.id, "inv-2");
    assert_eq!(frame.kind, FrameKind::Stdout);
    assert_eq!(frame.content, "total 0");
}

/// `system` and `error` are terminal tags; `stdout` and `stderr` are
/// fragments.
#[test]
fn terminal_and_fragment_classification() {
    assert!(FrameKind::System.is_terminal());
    assert!(FrameKind::Error.is_terminal());
    assert!(!FrameKind::Stdout.is_terminal());
    assert!(!FrameKind::Stderr.is_terminal());

    assert!(FrameKind::Stdout.is_fragment());
    assert!(FrameKind::Stderr.is_fragment());
    assert!(!FrameKind::System.is_fragment());
    assert!(!FrameKind::Error.is_fragment());
}

/// Server-defined tags outside the known set parse into `Other` and are
/// neither terminal nor fragments.
#[test]
fn unknown_tag_parses_as_other() {
    let raw = r#"{"id":"inv-3","type":"progress","content":"50%"}"#;
    let frame = InboundFrame::parse(raw).expect("parse");

    assert_eq!(frame.kind, FrameKind::Other("progress".to_owned()));
    assert!(!frame.kind.is_terminal());
    assert!(!frame.kind.is_fragment());
}

/// A frame without a `content` field defaults to empty content.
#[test]
fn missing_content_defaults_to_empty() {
    let raw = r#"{"id":"inv-4","type":"system"}"#;
    let frame = InboundFrame::parse(raw).expect("parse");

    assert_eq!(frame.kind, FrameKind::System);
    assert_eq!(frame.content, "");
}

/// Unparseable text maps to `AppError::Protocol`.
#[test]
fn malformed_frame_is_protocol_error() {
    let result = InboundFrame::parse("not-json{{{");

    match result {
        Err(AppError::Protocol(msg)) => {
            assert!(
                msg.contains("malformed inbound frame"),
                "error must name the malformed frame, got: {msg}"
            );
        }
        other => panic!("expected Err(AppError::Protocol), got: {other:?}"),
    }
}

/// A frame missing the `id` field fails to parse rather than dispatching.
#[test]
fn missing_id_is_protocol_error() {
    let result = InboundFrame::parse(r#"{"type":"stdout","content":"x"}"#);
    assert!(matches!(result, Err(AppError::Protocol(_))));
}
