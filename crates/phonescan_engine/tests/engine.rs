use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use phonescan_engine::{
    ApiError, ClientSettings, EngineEvent, EngineHandle, SocketConnector, SocketEvent,
    SocketEventSender, SocketHandle, StreamUpdate, TaskApi, TaskEvent, TaskList, TaskResults,
    TaskStatusReport, UploadFile, UploadResponse,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(2);

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(phonescan_logging::initialize_for_tests);
}

struct FakeApi;

#[async_trait]
impl TaskApi for FakeApi {
    async fn upload_video(&self, file: &UploadFile) -> Result<UploadResponse, ApiError> {
        Ok(UploadResponse {
            task_id: format!("task-{}", file.file_name),
            status: Some("pending".to_string()),
            message: None,
            websocket_url: None,
        })
    }

    async fn fetch_results(&self, task_id: &str) -> Result<TaskResults, ApiError> {
        Ok(TaskResults {
            task_id: Some(task_id.to_string()),
            status: "completed".to_string(),
            total_phone_numbers: 0,
            phone_numbers: Vec::new(),
        })
    }

    async fn fetch_status(&self, _task_id: &str) -> Result<TaskStatusReport, ApiError> {
        unreachable!("status is not routed through the engine")
    }

    async fn list_tasks(&self, _status: Option<&str>, _limit: u32) -> Result<TaskList, ApiError> {
        unreachable!("listing is not routed through the engine")
    }

    async fn delete_task(&self, _task_id: &str) -> Result<String, ApiError> {
        unreachable!("deletion is not routed through the engine")
    }
}

/// Opens immediately and pushes one progress event per connection.
#[derive(Default)]
struct ScriptedConnector {
    urls: Mutex<Vec<String>>,
    closes: Arc<AtomicUsize>,
}

struct ScriptedHandle {
    closes: Arc<AtomicUsize>,
}

impl SocketHandle for ScriptedHandle {
    fn send(&self, _text: String) -> bool {
        true
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl SocketConnector for ScriptedConnector {
    fn connect(&self, url: &str, events: SocketEventSender) -> Box<dyn SocketHandle> {
        self.urls.lock().unwrap().push(url.to_string());
        events.emit(SocketEvent::Open);
        events.emit(SocketEvent::Message(
            r#"{"type":"progress_update","task_id":"abc123","progress":25}"#.to_string(),
        ));
        Box::new(ScriptedHandle {
            closes: self.closes.clone(),
        })
    }
}

fn engine() -> (EngineHandle, Arc<ScriptedConnector>) {
    init_logging();
    let connector = Arc::new(ScriptedConnector::default());
    let handle = EngineHandle::with_backends(
        Arc::new(FakeApi),
        connector.clone(),
        ClientSettings::default(),
    );
    (handle, connector)
}

#[test]
fn upload_result_is_reported_as_event() {
    let (engine, _connector) = engine();
    engine.upload(UploadFile {
        path: "clip.mp4".into(),
        file_name: "clip.mp4".to_string(),
        media_type: "video/mp4".to_string(),
        size: 1,
    });

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::UploadCompleted(Ok(response))) => {
            assert_eq!(response.task_id, "task-clip.mp4");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn fetch_results_is_reported_with_task_id() {
    let (engine, _connector) = engine();
    engine.fetch_results("abc123");

    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::ResultsFetched { task_id, result }) => {
            assert_eq!(task_id, "abc123");
            assert_eq!(result.unwrap().status, "completed");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn subscribe_forwards_stream_updates() {
    let (engine, connector) = engine();
    engine.subscribe("abc123");

    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::Stream(StreamUpdate::Opened {
            task_id: "abc123".to_string()
        }))
    );
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Stream(StreamUpdate::Event {
            task_id,
            event: TaskEvent::ProgressUpdate(payload),
        })) => {
            assert_eq!(task_id, "abc123");
            assert_eq!(payload.progress, Some(25.0));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        connector.urls.lock().unwrap().as_slice(),
        ["ws://localhost:8000/ws/task/abc123/".to_string()]
    );
}

#[test]
fn unsubscribe_closes_the_connection() {
    let (engine, connector) = engine();
    engine.subscribe("abc123");
    engine.recv_timeout(WAIT);
    engine.unsubscribe();
    engine.send(serde_json::json!({ "type": "ping" }));

    let deadline = std::time::Instant::now() + WAIT;
    while connector.closes.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
    assert_eq!(connector.urls.lock().unwrap().len(), 1);
}
