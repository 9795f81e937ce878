//! Pending-invocation table.
//!
//! Maps invocation ids to in-flight state: the output fragments received so
//! far and the single-use `oneshot` sender that resolves the invocation.
//! Every mutation is conditioned on "entry still present" under one mutex
//! guard, so exactly one of {terminal frame, deadline, disconnect} removes an
//! entry and sends on its channel — the others become no-ops. Operations on
//! ids that are no longer (or never were) present are silently ignored.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::debug;

use super::{CommandOutput, Termination};

/// In-flight state for one registered invocation.
struct PendingEntry {
    /// Output fragments in socket-arrival order, append-only.
    fragments: Vec<String>,
    /// Single-use completion handle.
    tx: oneshot::Sender<CommandOutput>,
}

/// Shared table of pending invocations.
///
/// Cheap to clone; all clones observe the same entries (the reader task and
/// every `execute` caller hold clones of one table).
#[derive(Clone)]
pub struct PendingTable {
    entries: Arc<Mutex<HashMap<String, PendingEntry>>>,
}

impl PendingTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a new invocation and return the receiver its resolution will
    /// arrive on.
    pub async fn register(&self, id: &str) -> oneshot::Receiver<CommandOutput> {
        let (tx, rx) = oneshot::channel();
        let entry = PendingEntry {
            fragments: Vec::new(),
            tx,
        };
        self.entries.lock().await.insert(id.to_owned(), entry);
        rx
    }

    /// Append an output fragment to a pending invocation.
    ///
    /// Returns `false` (and changes nothing) when `id` is not pending.
    pub async fn append(&self, id: &str, fragment: &str) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(id) {
            Some(entry) => {
                entry.fragments.push(fragment.to_owned());
                true
            }
            None => false,
        }
    }

    /// Resolve a pending invocation with a terminal frame's content.
    ///
    /// The final text is the accumulated fragments joined with `\n`,
    /// followed by the terminal message. Removes the entry and sends exactly
    /// once; returns `false` when `id` is not pending (stale frame).
    pub async fn complete(&self, id: &str, termination: Termination, final_content: &str) -> bool {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries.remove(id)
        };
        let Some(entry) = entry else {
            return false;
        };

        let text = join_with_final(&entry.fragments, final_content);
        deliver(entry.tx, id, CommandOutput { text, termination });
        true
    }

    /// Resolve a pending invocation as timed out, carrying whatever output
    /// accumulated before the deadline.
    ///
    /// Returns `true` when this call won the race and removed the entry,
    /// `false` when a terminal frame (or disconnect) got there first.
    pub async fn expire(&self, id: &str, timeout_secs: u64) -> bool {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries.remove(id)
        };
        let Some(entry) = entry else {
            return false;
        };

        let text = format!(
            "Command execution timed out after {timeout_secs} seconds. Partial output:\n{}",
            entry.fragments.join("\n"),
        );
        deliver(
            entry.tx,
            id,
            CommandOutput {
                text,
                termination: Termination::TimedOut,
            },
        );
        true
    }

    /// Resolve every pending invocation with a disconnect notice.
    ///
    /// Invoked when the transport closes so invocations do not sit out their
    /// individual deadlines against a dead socket.
    pub async fn expire_all(&self, reason: &str) {
        let drained: Vec<(String, PendingEntry)> = {
            let mut entries = self.entries.lock().await;
            entries.drain().collect()
        };

        for (id, entry) in drained {
            let text = format!(
                "{reason}. Partial output:\n{}",
                entry.fragments.join("\n"),
            );
            deliver(
                entry.tx,
                &id,
                CommandOutput {
                    text,
                    termination: Termination::Disconnected,
                },
            );
        }
    }

    /// Remove an entry without resolving it (outbound send failed, so the
    /// caller is returning an error instead of awaiting the channel).
    pub async fn remove(&self, id: &str) {
        self.entries.lock().await.remove(id);
    }

    /// Whether `id` is currently pending.
    pub async fn contains(&self, id: &str) -> bool {
        self.entries.lock().await.contains_key(id)
    }

    /// Number of pending invocations.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Join accumulated fragments with the terminal message. No leading newline
/// when nothing accumulated.
fn join_with_final(fragments: &[String], final_content: &str) -> String {
    if fragments.is_empty() {
        final_content.to_owned()
    } else {
        format!("{}\n{final_content}", fragments.join("\n"))
    }
}

/// Push the resolution through the oneshot, logging when the receiver is
/// already gone (caller dropped its future).
fn deliver(tx: oneshot::Sender<CommandOutput>, id: &str, output: CommandOutput) {
    if tx.send(output).is_err() {
        debug!(id, "invocation receiver already dropped");
    }
}
