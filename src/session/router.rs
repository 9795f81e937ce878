//! Inbound message router.
//!
//! Consumes raw text frames from the connection's reader task and dispatches
//! each to the pending invocation it references:
//!
//! | Frame tag          | Effect                                        |
//! |--------------------|-----------------------------------------------|
//! | `stdout`, `stderr` | Append fragment; the invocation stays pending |
//! | `system`           | Terminal — resolve as [`Termination::Completed`] |
//! | `error`            | Terminal — resolve as [`Termination::RemoteError`] |
//! | *(any other)*      | Dropped; logged at `DEBUG`                    |
//!
//! Frames that fail to parse, and frames whose id has no pending entry, are
//! logged and dropped. The socket is a shared resource: one bad frame never
//! disturbs the other invocations multiplexed on it, and nothing here ever
//! propagates an error back to the reader loop.

use tracing::{debug, warn};

use crate::wire::{FrameKind, InboundFrame};

use super::pending::PendingTable;
use super::Termination;

/// Parse one raw socket message and dispatch it against the pending table.
pub async fn route_text(table: &PendingTable, raw: &str) {
    let frame = match InboundFrame::parse(raw) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(%err, "dropping unparseable inbound frame");
            return;
        }
    };

    match frame.kind {
        FrameKind::Stdout | FrameKind::Stderr => {
            if !table.append(&frame.id, &frame.content).await {
                debug!(id = frame.id, "dropping fragment for unknown invocation");
            }
        }
        FrameKind::System => {
            if !table
                .complete(&frame.id, Termination::Completed, &frame.content)
                .await
            {
                debug!(id = frame.id, "dropping terminal frame for unknown invocation");
            }
        }
        FrameKind::Error => {
            if !table
                .complete(&frame.id, Termination::RemoteError, &frame.content)
                .await
            {
                debug!(id = frame.id, "dropping error frame for unknown invocation");
            }
        }
        FrameKind::Other(tag) => {
            debug!(id = frame.id, tag, "dropping frame with unhandled tag");
        }
    }
}
