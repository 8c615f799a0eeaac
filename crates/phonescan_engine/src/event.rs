//! Inbound task stream envelope.
//!
//! Every message is a JSON object tagged by `type`. Payload fields are all
//! optional; the server omits whatever does not apply to the event kind.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// Snapshot pushed right after the socket is accepted.
    TaskStatus(StatusPayload),
    ProgressUpdate(ProgressPayload),
    TaskCompleted(CompletedPayload),
    TaskFailed(FailedPayload),
    #[serde(other)]
    Unknown,
}

impl TaskEvent {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskEvent::TaskStatus(p) => Some(&p.task_id),
            TaskEvent::ProgressUpdate(p) => Some(&p.task_id),
            TaskEvent::TaskCompleted(p) => Some(&p.task_id),
            TaskEvent::TaskFailed(p) => Some(&p.task_id),
            TaskEvent::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub task_id: String,
    pub status: Option<String>,
    pub progress: Option<f32>,
    pub current_frame: Option<u64>,
    pub total_frames: Option<u64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ProgressPayload {
    pub task_id: String,
    pub status: Option<String>,
    pub progress: Option<f32>,
    pub current_frame: Option<u64>,
    pub total_frames: Option<u64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CompletedPayload {
    pub task_id: String,
    pub status: Option<String>,
    pub progress: Option<f32>,
    pub message: Option<String>,
    pub phone_numbers_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FailedPayload {
    pub task_id: String,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

/// Decodes one text frame from the task stream.
pub fn decode_event(text: &str) -> Result<TaskEvent, serde_json::Error> {
    serde_json::from_str(text)
}
