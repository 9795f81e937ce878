//! Unit tests for the inbound message router, driven directly against a
//! pending table without a live socket.

use devlink::session::pending::PendingTable;
use devlink::session::router::route_text;
use devlink::session::Termination;

/// `stdout` frames append output but never resolve the invocation.
#[tokio::test]
async fn stdout_frame_appends_without_resolving() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-1").await;

    route_text(&table, r#"{"id":"inv-1","type":"stdout","content":"total 0"}"#).await;

    assert!(table.contains("inv-1").await, "fragment must not resolve");
    assert!(rx.try_recv().is_err(), "no resolution may be delivered yet");
}

/// `stderr` frames accumulate into the same output stream as `stdout`.
#[tokio::test]
async fn stderr_frames_interleave_with_stdout() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-2").await;

    route_text(&table, r#"{"id":"inv-2","type":"stdout","content":"out"}"#).await;
    route_text(&table, r#"{"id":"inv-2","type":"stderr","content":"err"}"#).await;
    route_text(&table, r#"{"id":"inv-2","type":"system","content":"done"}"#).await;

    let output = rx.try_recv().expect("resolved");
    assert_eq!(output.text, "out\nerr\ndone");
}

/// A `system` frame resolves with fragments joined ahead of its content —
/// the `ls -la` scenario.
#[tokio::test]
async fn system_frame_resolves_with_joined_output() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-3").await;

    route_text(&table, r#"{"id":"inv-3","type":"stdout","content":"total 0"}"#).await;
    route_text(&table, r#"{"id":"inv-3","type":"system","content":"done"}"#).await;

    let output = rx.try_recv().expect("resolved");
    assert_eq!(output.text, "total 0\ndone");
    assert_eq!(output.termination, Termination::Completed);
    assert!(!table.contains("inv-3").await);
}

/// An `error` frame is terminal too, tagged `RemoteError`.
#[tokio::test]
async fn error_frame_resolves_as_remote_error() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-4").await;

    route_text(
        &table,
        r#"{"id":"inv-4","type":"error","content":"command not found"}"#,
    )
    .await;

    let output = rx.try_recv().expect("resolved");
    assert_eq!(output.text, "command not found");
    assert_eq!(output.termination, Termination::RemoteError);
}

/// Frames referencing an unknown id are dropped without touching any
/// pending invocation.
#[tokio::test]
async fn unknown_id_frames_are_dropped() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-5").await;

    route_text(&table, r#"{"id":"stale","type":"stdout","content":"noise"}"#).await;
    route_text(&table, r#"{"id":"stale","type":"system","content":"noise"}"#).await;
    route_text(&table, r#"{"id":"inv-5","type":"system","content":"done"}"#).await;

    let output = rx.try_recv().expect("resolved");
    assert_eq!(output.text, "done", "stale frames must not leak in");
}

/// Unparseable frames are logged and dropped; the shared socket's other
/// invocations are unaffected.
#[tokio::test]
async fn malformed_frames_are_dropped_silently() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-6").await;

    route_text(&table, "garbage{{{").await;
    route_text(&table, "").await;
    route_text(&table, r#"{"id":"inv-6","type":"system","content":"done"}"#).await;

    let output = rx.try_recv().expect("resolved");
    assert_eq!(output.text, "done");
}

/// Frames with an unrecognized tag are dropped without resolving.
#[tokio::test]
async fn unknown_tag_frames_are_dropped() {
    let table = PendingTable::new();
    let mut rx = table.register("inv-7").await;

    route_text(&table, r#"{"id":"inv-7","type":"progress","content":"50%"}"#).await;

    assert!(table.contains("inv-7").await);
    assert!(rx.try_recv().is_err());
}

/// Two interleaved invocations keep their outputs separate.
#[tokio::test]
async fn interleaved_invocations_stay_isolated() {
    let table = PendingTable::new();
    let mut rx_a = table.register("inv-a").await;
    let mut rx_b = table.register("inv-b").await;

    route_text(&table, r#"{"id":"inv-a","type":"stdout","content":"from-a"}"#).await;
    route_text(&table, r#"{"id":"inv-b","type":"stdout","content":"from-b"}"#).await;
    route_text(&table, r#"{"id":"inv-a","type":"system","content":"end-a"}"#).await;
    route_text(&table, r#"{"id":"inv-b","type":"system","content":"end-b"}"#).await;

    let out_a = rx_a.try_recv().expect("a resolved");
    let out_b = rx_b.try_recv().expect("b resolved");

    assert_eq!(out_a.text, "from-a\nend-a");
    assert_eq!(out_b.text, "from-b\nend-b");
}
