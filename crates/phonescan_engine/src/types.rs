use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::TaskEvent;

pub type TaskId = String;

/// A file ready to be sent to the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub task_id: TaskId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub websocket_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberRecord {
    pub e164_number: String,
    #[serde(default)]
    pub national_number: String,
    #[serde(default)]
    pub first_seen_seconds: f64,
    #[serde(default)]
    pub frame_count: u64,
    #[serde(default)]
    pub raw_text_examples: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResults {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub status: String,
    pub total_phone_numbers: u64,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumberRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatusReport {
    pub task_id: TaskId,
    pub status: String,
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub current_frame: u64,
    #[serde(default)]
    pub total_frames: u64,
    #[serde(default)]
    pub current_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub video_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSummary {
    pub task_id: TaskId,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub video_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<TaskSummary>,
    pub total: usize,
}

/// Connection-level changes and decoded events of the task stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Opened { task_id: TaskId },
    Event { task_id: TaskId, event: TaskEvent },
    Closed { task_id: TaskId },
    Failed { task_id: TaskId, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted(Result<UploadResponse, ApiError>),
    Stream(StreamUpdate),
    ResultsFetched {
        task_id: TaskId,
        result: Result<TaskResults, ApiError>,
    },
}

/// A failed API call. `message` is the text a user should see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    HttpStatus(u16),
    Network,
    InvalidResponse,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
