//! Socket transport seam for the task stream.
//!
//! A connector opens a connection and reports everything that happens on it
//! through a [`SocketEventSender`]; the returned [`SocketHandle`] is the only
//! way to write to or close it.

use futures_util::{SinkExt, StreamExt};
use phonescan_logging::{scan_debug, scan_warn};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// Identifies one connection attempt. Never reused within a stream client.
pub type ConnectionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Open,
    Message(String),
    Closed,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSocketEvent {
    pub connection: ConnectionId,
    pub event: SocketEvent,
}

/// Delivers events of a single connection, tagged with its id.
#[derive(Debug, Clone)]
pub struct SocketEventSender {
    connection: ConnectionId,
    tx: mpsc::UnboundedSender<TaggedSocketEvent>,
}

impl SocketEventSender {
    pub fn new(connection: ConnectionId, tx: mpsc::UnboundedSender<TaggedSocketEvent>) -> Self {
        Self { connection, tx }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Returns false once the receiving side is gone.
    pub fn emit(&self, event: SocketEvent) -> bool {
        self.tx
            .send(TaggedSocketEvent {
                connection: self.connection,
                event,
            })
            .is_ok()
    }
}

pub trait SocketConnector: Send + Sync {
    fn connect(&self, url: &str, events: SocketEventSender) -> Box<dyn SocketHandle>;
}

pub trait SocketHandle: Send {
    /// Queues a text frame. Returns false if the connection can no longer accept it.
    fn send(&self, text: String) -> bool;

    fn close(&mut self);
}

/// WebSocket transport backed by tokio-tungstenite.
///
/// `connect` spawns the socket onto the current tokio runtime, so it must be
/// called from within one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SocketConnector for TungsteniteConnector {
    fn connect(&self, url: &str, events: SocketEventSender) -> Box<dyn SocketHandle> {
        let cancel = CancellationToken::new();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(
            url.to_string(),
            events,
            outgoing_rx,
            cancel.clone(),
        ));
        Box::new(TungsteniteHandle {
            cancel,
            outgoing: outgoing_tx,
        })
    }
}

struct TungsteniteHandle {
    cancel: CancellationToken,
    outgoing: mpsc::UnboundedSender<String>,
}

impl SocketHandle for TungsteniteHandle {
    fn send(&self, text: String) -> bool {
        !self.cancel.is_cancelled() && self.outgoing.send(text).is_ok()
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for TungsteniteHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_socket(
    url: String,
    events: SocketEventSender,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let connected = tokio::select! {
        _ = cancel.cancelled() => return,
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
    };
    let socket = match connected {
        Ok((socket, _response)) => socket,
        Err(err) => {
            scan_warn!("Connecting to {} failed: {}", url, err);
            events.emit(SocketEvent::Error(err.to_string()));
            return;
        }
    };
    events.emit(SocketEvent::Open);

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                scan_debug!("Closing socket {} (connection {})", url, events.connection());
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            Some(text) = outgoing.recv() => {
                if let Err(err) = sink.send(Message::Text(text)).await {
                    events.emit(SocketEvent::Error(err.to_string()));
                    break;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    events.emit(SocketEvent::Message(text));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        events.emit(SocketEvent::Message(text));
                    }
                    Err(_) => scan_warn!("Dropping non UTF-8 binary frame from {}", url),
                },
                Some(Ok(Message::Close(_))) | None => {
                    events.emit(SocketEvent::Closed);
                    break;
                }
                // Ping/pong is answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    events.emit(SocketEvent::Error(err.to_string()));
                    break;
                }
            },
        }
    }
}
