use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use phonescan_logging::{scan_debug, scan_info};
use tokio::sync::mpsc as async_mpsc;

use crate::api::{ReqwestApiClient, TaskApi};
use crate::stream::TaskEventStream;
use crate::transport::{SocketConnector, TungsteniteConnector};
use crate::{ApiError, ClientSettings, EngineEvent, TaskId, UploadFile};

enum EngineCommand {
    Upload(UploadFile),
    FetchResults(TaskId),
    Stream(StreamCommand),
}

enum StreamCommand {
    Subscribe(TaskId),
    Unsubscribe,
    Send(serde_json::Value),
}

/// Runs uploads, result fetches and the task stream on a background runtime.
///
/// Dropping the handle stops the runtime and closes any open stream.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApiClient::new(settings.clone())?);
        Ok(Self::with_backends(
            api,
            Arc::new(TungsteniteConnector::new()),
            settings,
        ))
    }

    pub fn with_backends(
        api: Arc<dyn TaskApi>,
        connector: Arc<dyn SocketConnector>,
        settings: ClientSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let (stream_tx, stream_rx) = async_mpsc::unbounded_channel();
            runtime.spawn(run_stream(connector, settings, stream_rx, event_tx.clone()));

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Stream(command) => {
                        if stream_tx.send(command).is_err() {
                            break;
                        }
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), command, event_tx).await;
                        });
                    }
                }
            }
            scan_debug!("Engine command channel closed; shutting down");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn upload(&self, file: UploadFile) {
        let _ = self.cmd_tx.send(EngineCommand::Upload(file));
    }

    pub fn fetch_results(&self, task_id: impl Into<TaskId>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchResults(task_id.into()));
    }

    /// Moves the task stream to `task_id`, closing any previous connection.
    pub fn subscribe(&self, task_id: impl Into<TaskId>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Stream(StreamCommand::Subscribe(task_id.into())));
    }

    pub fn unsubscribe(&self) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Stream(StreamCommand::Unsubscribe));
    }

    /// Sends a JSON message on the task stream if it is connected.
    pub fn send(&self, message: serde_json::Value) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Stream(StreamCommand::Send(message)));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_request(
    api: &dyn TaskApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload(file) => {
            let result = api.upload_video(&file).await;
            let _ = event_tx.send(EngineEvent::UploadCompleted(result));
        }
        EngineCommand::FetchResults(task_id) => {
            let result = api.fetch_results(&task_id).await;
            let _ = event_tx.send(EngineEvent::ResultsFetched { task_id, result });
        }
        EngineCommand::Stream(_) => {}
    }
}

async fn run_stream(
    connector: Arc<dyn SocketConnector>,
    settings: ClientSettings,
    mut commands: async_mpsc::UnboundedReceiver<StreamCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let (mut stream, mut socket_events) = TaskEventStream::new(connector, settings);
    loop {
        tokio::select! {
            // Commands first, so a switch of task wins over queued socket events.
            biased;
            command = commands.recv() => match command {
                Some(StreamCommand::Subscribe(task_id)) => stream.set_task(Some(&task_id)),
                Some(StreamCommand::Unsubscribe) => stream.set_task(None),
                Some(StreamCommand::Send(message)) => {
                    if !stream.send(&message) {
                        scan_debug!("Task stream not connected; outbound message dropped");
                    }
                }
                None => break,
            },
            Some(tagged) = socket_events.recv() => {
                if let Some(update) = stream.handle(tagged) {
                    if event_tx.send(EngineEvent::Stream(update)).is_err() {
                        break;
                    }
                }
            }
        }
    }
    scan_info!("Task stream worker stopped");
}
