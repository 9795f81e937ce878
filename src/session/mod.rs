//! Remote command execution session.
//!
//! A [`Session`] is the explicit owner of everything needed to multiplex many
//! logical command invocations over one persistent WebSocket connection:
//!
//! - the [`ConnectionManager`](connection::ConnectionManager), which lazily
//!   opens the socket and replaces it after transport failure;
//! - the [`PendingTable`](pending::PendingTable), mapping invocation ids to
//!   in-flight state (accumulated output + single-use completion channel);
//! - the inbound [`router`], driven by the connection's reader task.
//!
//! Each call to [`Session::execute`] registers one pending invocation, sends
//! one `command` frame, and awaits exactly one resolution — delivered by a
//! terminal frame, by the per-invocation deadline, or by transport closure,
//! whichever removes the table entry first.

pub mod connection;
pub mod pending;
pub mod router;

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::wire::CommandFrame;
use crate::{AppError, Result};

use connection::ConnectionManager;
use pending::PendingTable;

/// How one invocation reached its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Terminal `system` frame: the command completed remotely.
    Completed,
    /// Terminal `error` frame: the command failed remotely. Still delivered
    /// as a resolved output so the caller receives the error text inline.
    RemoteError,
    /// The per-invocation deadline elapsed before any terminal frame.
    TimedOut,
    /// The transport closed while the invocation was still pending.
    Disconnected,
}

/// Resolved output of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Accumulated fragments joined with `\n`, plus the terminal message or
    /// timeout/disconnect notice.
    pub text: String,
    /// How the invocation terminated.
    pub termination: Termination,
}

/// One adapter session: a single shared connection, many concurrent
/// invocations.
pub struct Session {
    manager: ConnectionManager,
    table: PendingTable,
    command_timeout: Duration,
}

impl Session {
    /// Build a session from configuration. The connection is opened lazily
    /// on the first [`execute`](Self::execute).
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let table = PendingTable::new();
        Self {
            manager: ConnectionManager::new(config.connect_url(), table.clone()),
            table,
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }

    /// Execute a remote command and return the output text.
    ///
    /// Compatibility surface: every termination kind — completion, remote
    /// error, timeout with partial output, disconnect — resolves to text.
    /// Use [`execute_detailed`](Self::execute_detailed) to observe how the
    /// invocation terminated.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidArgument`] if `command` is empty or whitespace;
    ///   nothing is sent and no table entry is created.
    /// - [`AppError::Connection`] if the socket cannot be established or the
    ///   outbound frame cannot be sent.
    pub async fn execute(&self, command: &str) -> Result<String> {
        self.execute_detailed(command).await.map(|output| output.text)
    }

    /// Execute a remote command, returning the output together with its
    /// [`Termination`].
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_detailed(&self, command: &str) -> Result<CommandOutput> {
        if command.trim().is_empty() {
            return Err(AppError::InvalidArgument("command must not be empty".into()));
        }

        let conn = self.manager.ensure().await?;

        let id = Uuid::new_v4().to_string();
        let mut rx = self.table.register(&id).await;

        let frame_text = CommandFrame::new(&id, command).to_text()?;
        if let Err(err) = conn.send_text(frame_text).await {
            // The frame never left; retract the entry so it cannot linger.
            self.table.remove(&id).await;
            return Err(err);
        }
        debug!(id, command, "command frame sent");

        match tokio::time::timeout(self.command_timeout, &mut rx).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(_)) => Err(AppError::Connection(
                "invocation dropped without a resolution".into(),
            )),
            Err(_) => {
                // Deadline elapsed. The race against a terminal frame is
                // decided by whoever removes the table entry; either way the
                // winner sends exactly one value, so awaiting the receiver
                // (not polling it — the losing side may observe the removal
                // before the winner's send lands) always yields it.
                let expired = self
                    .table
                    .expire(&id, self.command_timeout.as_secs())
                    .await;
                if !expired {
                    debug!(id, "terminal frame won the race against the deadline");
                }
                match (&mut rx).await {
                    Ok(output) => Ok(output),
                    Err(_) => Err(AppError::Connection(
                        "invocation expired without a resolution".into(),
                    )),
                }
            }
        }
    }

    /// Number of invocations currently awaiting resolution.
    pub async fn pending_invocations(&self) -> usize {
        self.table.len().await
    }

    /// Tear the session down: stop the reader, drop the connection, and
    /// resolve every still-pending invocation with a disconnect notice.
    pub async fn close(&self) {
        self.manager.close().await;
        self.table
            .expire_all("Connection closed before command completed")
            .await;
    }
}
