use crate::{Phase, TaskId, TaskResultsView};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFileView {
    pub name: String,
    pub size_mb: f64,
}

/// Connection indicator shown once a task id exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIndicator {
    pub connected: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub selected_file: Option<SelectedFileView>,
    pub task_id: Option<TaskId>,
    pub in_flight: bool,
    pub stream: Option<StreamIndicator>,
    pub progress: f32,
    pub current_frame: u64,
    pub total_frames: u64,
    pub message: String,
    pub error: Option<String>,
    pub results: Option<TaskResultsView>,
    pub dirty: bool,
}

impl AppViewModel {
    /// Label of the submit control.
    pub fn submit_label(&self) -> &'static str {
        match self.phase {
            Phase::Uploading => "Uploading...",
            Phase::Streaming => "Processing Video...",
            _ => "Extract Phone Numbers",
        }
    }

    /// Whether the progress panel is visible.
    pub fn shows_progress(&self) -> bool {
        self.in_flight && self.task_id.is_some()
    }

    /// Frame completion in percent, only when the server reported a total.
    pub fn frame_percent(&self) -> Option<f64> {
        if self.total_frames == 0 {
            return None;
        }
        Some(self.current_frame as f64 * 100.0 / self.total_frames as f64)
    }
}
