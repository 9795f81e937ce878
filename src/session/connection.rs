//! Connection manager for the persistent WebSocket transport.
//!
//! Owns the single socket to the remote environment. The connection is
//! opened lazily by [`ConnectionManager::ensure`], reused while healthy, and
//! replaced on the next call after the transport reports closure or error.
//! Establishment is serialized: concurrent callers queue on the slot mutex,
//! so exactly one connect attempt runs and every waiter observes its result.
//!
//! Each established connection spawns one reader task that drains inbound
//! messages and feeds the [`router`](super::router). The reader never waits
//! on any single invocation; dispatch is a lock-append or lock-remove on the
//! pending table. When the transport closes the reader trips the handle's
//! cancellation token (so the next `ensure` reconnects) and expires every
//! still-pending invocation with a disconnect notice.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{AppError, Result};

use super::pending::PendingTable;
use super::router;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of one established connection, shared by all in-flight
/// invocations.
pub struct ConnectionHandle {
    sink: Mutex<SplitSink<WsStream, Message>>,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Send one text frame over the socket.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] when the transport rejects the write
    /// (the reader task will notice the closure independently).
    pub async fn send_text(&self, text: String) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|err| AppError::Connection(format!("send failed: {err}")))
    }

    /// Whether the transport has reported closure or error.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Lazily-connecting owner of the single WebSocket to the remote server.
pub struct ConnectionManager {
    connect_url: String,
    table: PendingTable,
    slot: Mutex<Option<Arc<ConnectionHandle>>>,
    shutdown: CancellationToken,
}

impl ConnectionManager {
    /// Create a manager for the given endpoint. No connection is opened
    /// until [`ensure`](Self::ensure) is called.
    #[must_use]
    pub fn new(connect_url: String, table: PendingTable) -> Self {
        Self {
            connect_url,
            table,
            slot: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Return the live connection, establishing one if necessary.
    ///
    /// Idempotent and safe to call concurrently: callers serialize on the
    /// slot mutex, so a burst of invocations against a cold manager produces
    /// exactly one connect attempt that every caller awaits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] when establishment fails or the
    /// manager has been closed.
    pub async fn ensure(&self) -> Result<Arc<ConnectionHandle>> {
        if self.shutdown.is_cancelled() {
            return Err(AppError::Connection("session is closed".into()));
        }

        let mut slot = self.slot.lock().await;

        if let Some(handle) = slot.as_ref() {
            if !handle.is_closed() {
                return Ok(Arc::clone(handle));
            }
            debug!("stored connection is dead, reconnecting");
        }

        let (stream, _response) = connect_async(self.connect_url.as_str())
            .await
            .map_err(|err| AppError::Connection(format!("failed to open websocket: {err}")))?;
        info!("websocket connection established");

        let (sink, read) = stream.split();
        let handle = Arc::new(ConnectionHandle {
            sink: Mutex::new(sink),
            closed: CancellationToken::new(),
        });

        tokio::spawn(run_reader(
            read,
            self.table.clone(),
            handle.closed.clone(),
            self.shutdown.clone(),
        ));

        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Tear down: stop the reader task and drop the stored connection.
    /// Subsequent [`ensure`](Self::ensure) calls fail.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let mut slot = self.slot.lock().await;
        if let Some(handle) = slot.take() {
            handle.closed.cancel();
        }
    }
}

/// Reader task: drain inbound messages and dispatch each to the pending
/// table until the transport closes or the session shuts down.
async fn run_reader(
    mut read: SplitStream<WsStream>,
    table: PendingTable,
    closed: CancellationToken,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => {
                // Explicit session close; Session::close resolves the
                // pending invocations itself.
                debug!("reader: session shutdown, stopping");
                closed.cancel();
                break;
            }

            msg = read.next() => {
                match msg {
                    None => {
                        info!("reader: websocket stream ended");
                        closed.cancel();
                        table
                            .expire_all("Connection closed before command completed")
                            .await;
                        break;
                    }

                    Some(Err(err)) => {
                        warn!(%err, "reader: websocket error, dropping connection");
                        closed.cancel();
                        table
                            .expire_all("Connection closed before command completed")
                            .await;
                        break;
                    }

                    Some(Ok(Message::Text(text))) => {
                        router::route_text(&table, text.as_str()).await;
                    }

                    Some(Ok(Message::Close(_))) => {
                        info!("reader: close frame received");
                        closed.cancel();
                        table
                            .expire_all("Connection closed before command completed")
                            .await;
                        break;
                    }

                    Some(Ok(other)) => {
                        // Ping/pong are handled by the transport; binary
                        // frames are not part of the protocol.
                        debug!(kind = ?other, "reader: ignoring non-text message");
                    }
                }
            }
        }
    }
}
