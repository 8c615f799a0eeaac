use std::path::PathBuf;

use crate::view_model::{AppViewModel, SelectedFileView, StreamIndicator};

pub type TaskId = String;

/// Lifecycle of the upload screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting for the chosen file's metadata.
    Validating,
    Uploading,
    /// Upload accepted; progress arrives over the task stream.
    Streaming,
    Completed,
    Failed,
}

impl Phase {
    /// True while a task attempt is running and the file input is locked.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Phase::Uploading | Phase::Streaming)
    }
}

/// File metadata as reported by the filesystem, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Open,
    Closed,
    Error,
}

/// A decoded task event, already detached from the wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Snapshot {
        task_id: TaskId,
        status: Option<String>,
        progress: Option<f32>,
        current_frame: Option<u64>,
        total_frames: Option<u64>,
        message: Option<String>,
    },
    Progress {
        task_id: TaskId,
        progress: Option<f32>,
        current_frame: Option<u64>,
        total_frames: Option<u64>,
        message: Option<String>,
    },
    Completed {
        task_id: TaskId,
        message: Option<String>,
        phone_numbers_count: Option<u64>,
    },
    Failed {
        task_id: TaskId,
        error_message: Option<String>,
    },
    Unknown,
}

impl TaskUpdate {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskUpdate::Snapshot { task_id, .. }
            | TaskUpdate::Progress { task_id, .. }
            | TaskUpdate::Completed { task_id, .. }
            | TaskUpdate::Failed { task_id, .. } => Some(task_id.as_str()),
            TaskUpdate::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhoneNumberRow {
    pub e164_number: String,
    pub national_number: String,
    pub first_seen_seconds: f64,
    pub frame_count: u64,
    pub raw_text_examples: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskResultsView {
    pub status: String,
    pub total_phone_numbers: u64,
    pub phone_numbers: Vec<PhoneNumberRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    selected: Option<SelectedFile>,
    task_id: Option<TaskId>,
    stream_connected: bool,
    stream_error: Option<String>,
    progress: f32,
    current_frame: u64,
    total_frames: u64,
    message: String,
    error: Option<String>,
    results: Option<TaskResultsView>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            selected_file: self.selected.as_ref().map(|file| SelectedFileView {
                name: file.name.clone(),
                size_mb: file.size as f64 / 1024.0 / 1024.0,
            }),
            task_id: self.task_id.clone(),
            in_flight: self.phase.is_in_flight(),
            stream: self.task_id.as_ref().map(|_| StreamIndicator {
                connected: self.stream_connected,
                error: self.stream_error.clone(),
            }),
            progress: self.progress,
            current_frame: self.current_frame,
            total_frames: self.total_frames,
            message: self.message.clone(),
            error: self.error.clone(),
            results: self.results.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_validation(&mut self) {
        self.phase = Phase::Validating;
        self.mark_dirty();
    }

    pub(crate) fn select_file(&mut self, file: SelectedFile) {
        self.selected = Some(file);
        self.error = None;
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    pub(crate) fn reject_file(&mut self, error: String) {
        self.selected = None;
        self.fail(error);
    }

    pub(crate) fn begin_upload(&mut self) {
        self.phase = Phase::Uploading;
        self.error = None;
        self.results = None;
        self.mark_dirty();
    }

    pub(crate) fn start_streaming(&mut self, task_id: TaskId) {
        self.task_id = Some(task_id);
        self.stream_connected = false;
        self.stream_error = None;
        self.progress = 0.0;
        self.current_frame = 0;
        self.total_frames = 0;
        self.message = "Video uploaded successfully. Processing started...".to_string();
        self.phase = Phase::Streaming;
        self.mark_dirty();
    }

    pub(crate) fn set_stream_status(&mut self, status: StreamStatus) {
        match status {
            StreamStatus::Open => {
                self.stream_connected = true;
                self.stream_error = None;
            }
            StreamStatus::Closed => self.stream_connected = false,
            StreamStatus::Error => {
                self.stream_connected = false;
                self.stream_error = Some("WebSocket connection failed".to_string());
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(
        &mut self,
        progress: Option<f32>,
        current_frame: Option<u64>,
        total_frames: Option<u64>,
        message: Option<String>,
    ) {
        self.progress = progress.unwrap_or(0.0);
        self.current_frame = current_frame.unwrap_or(0);
        self.total_frames = total_frames.unwrap_or(0);
        self.message = message.unwrap_or_default();
        self.mark_dirty();
    }

    pub(crate) fn complete(&mut self, message: Option<String>) {
        self.progress = 100.0;
        self.message = message.unwrap_or_else(|| "Processing completed!".to_string());
        self.phase = Phase::Completed;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.error = Some(error);
        self.results = None;
        self.phase = Phase::Failed;
        self.mark_dirty();
    }

    pub(crate) fn store_results(&mut self, results: TaskResultsView) {
        self.results = Some(results);
        self.error = None;
        self.mark_dirty();
    }
}
