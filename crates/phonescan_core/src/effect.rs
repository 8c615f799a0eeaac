use std::path::PathBuf;

use crate::{SelectedFile, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read size and media type of a chosen file.
    InspectFile { path: PathBuf },
    Upload { file: SelectedFile },
    /// Replace the current stream subscription with one for `task_id`.
    Subscribe { task_id: TaskId },
    Unsubscribe,
    FetchResults { task_id: TaskId },
}
