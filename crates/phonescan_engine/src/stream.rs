//! Task event stream client.
//!
//! Owns at most one socket, scoped to the active task id, and keeps the
//! connection flag, the last decoded event and the connection error. Socket
//! events arrive on a single channel tagged with their connection id; anything
//! tagged with an id other than the live one is dropped.

use std::sync::Arc;

use phonescan_logging::{scan_debug, scan_error, scan_info, scan_trace, scan_warn};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::event::{decode_event, TaskEvent};
use crate::transport::{
    ConnectionId, SocketConnector, SocketEvent, SocketEventSender, SocketHandle,
    TaggedSocketEvent,
};
use crate::{ClientSettings, StreamUpdate, TaskId};

/// Shown when the transport fails; distinct from task failure messages.
pub const CONNECTION_FAILED: &str = "WebSocket connection failed";

struct ActiveConnection {
    id: ConnectionId,
    task_id: TaskId,
    handle: Box<dyn SocketHandle>,
    finished: bool,
}

pub struct TaskEventStream {
    connector: Arc<dyn SocketConnector>,
    settings: ClientSettings,
    events_tx: mpsc::UnboundedSender<TaggedSocketEvent>,
    next_connection: ConnectionId,
    active: Option<ActiveConnection>,
    connected: bool,
    last_event: Option<TaskEvent>,
    error: Option<String>,
}

impl TaskEventStream {
    /// Creates a detached stream client and the receiver its sockets report to.
    ///
    /// Every item taken from the receiver must be passed to [`Self::handle`].
    pub fn new(
        connector: Arc<dyn SocketConnector>,
        settings: ClientSettings,
    ) -> (Self, mpsc::UnboundedReceiver<TaggedSocketEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let stream = Self {
            connector,
            settings,
            events_tx,
            next_connection: 1,
            active: None,
            connected: false,
            last_event: None,
            error: None,
        };
        (stream, events_rx)
    }

    pub fn task_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.task_id.as_str())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn last_event(&self) -> Option<&TaskEvent> {
        self.last_event.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Points the client at a task, or detaches it with `None`.
    ///
    /// The same id keeps a live connection; once that connection has closed
    /// or failed, asking for it again opens a fresh one.
    pub fn set_task(&mut self, task_id: Option<&str>) {
        let task_id = task_id.filter(|id| !id.is_empty());
        if let (Some(active), Some(requested)) = (&self.active, task_id) {
            if active.task_id == requested && !active.finished {
                return;
            }
        }

        self.teardown();

        if let Some(task_id) = task_id {
            let id = self.next_connection;
            self.next_connection += 1;
            let url = self.settings.task_stream_url(task_id);
            scan_info!("Opening task stream {} (connection {})", url, id);
            let handle = self
                .connector
                .connect(&url, SocketEventSender::new(id, self.events_tx.clone()));
            self.active = Some(ActiveConnection {
                id,
                task_id: task_id.to_string(),
                handle,
                finished: false,
            });
        }
    }

    /// Applies one socket event and reports what changed for the caller.
    pub fn handle(&mut self, tagged: TaggedSocketEvent) -> Option<StreamUpdate> {
        let Some(active) = self.active.as_mut() else {
            scan_trace!("Dropping event of detached connection {}", tagged.connection);
            return None;
        };
        if tagged.connection != active.id {
            scan_trace!(
                "Dropping event of stale connection {} (live {})",
                tagged.connection,
                active.id
            );
            return None;
        }
        let task_id = active.task_id.clone();

        match tagged.event {
            SocketEvent::Open => {
                scan_info!("Task stream connected for {}", task_id);
                self.connected = true;
                self.error = None;
                Some(StreamUpdate::Opened { task_id })
            }
            SocketEvent::Message(text) => match decode_event(&text) {
                Ok(event) => {
                    scan_debug!("Task stream message for {}: {:?}", task_id, event);
                    self.last_event = Some(event.clone());
                    Some(StreamUpdate::Event { task_id, event })
                }
                Err(err) => {
                    scan_warn!("Discarding malformed task stream message: {}", err);
                    None
                }
            },
            SocketEvent::Closed => {
                scan_info!("Task stream disconnected for {}", task_id);
                active.finished = true;
                self.connected = false;
                Some(StreamUpdate::Closed { task_id })
            }
            SocketEvent::Error(detail) => {
                scan_error!("Task stream error for {}: {}", task_id, detail);
                active.finished = true;
                self.connected = false;
                self.error = Some(CONNECTION_FAILED.to_string());
                Some(StreamUpdate::Failed {
                    task_id,
                    error: CONNECTION_FAILED.to_string(),
                })
            }
        }
    }

    /// Sends `message` as JSON while connected. Returns whether it was queued.
    pub fn send<T: Serialize>(&self, message: &T) -> bool {
        let Some(active) = self.active.as_ref().filter(|_| self.connected) else {
            return false;
        };
        match serde_json::to_string(message) {
            Ok(text) => active.handle.send(text),
            Err(err) => {
                scan_warn!("Cannot encode outbound task stream message: {}", err);
                false
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            scan_info!(
                "Closing task stream for {} (connection {})",
                active.task_id,
                active.id
            );
            active.handle.close();
        }
        self.connected = false;
        self.last_event = None;
        self.error = None;
    }
}

impl Drop for TaskEventStream {
    fn drop(&mut self) {
        self.teardown();
    }
}
