use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a file path.
    FileChosen(PathBuf),
    /// Filesystem metadata for the chosen file, or a read error.
    FileInspected(Result<crate::SelectedFile, String>),
    /// User asked to submit the selected file.
    SubmitClicked,
    /// Upload request finished with a task id or a user-facing error.
    UploadFinished(Result<crate::TaskId, String>),
    /// Connection state change of the task stream.
    StreamStatus {
        task_id: crate::TaskId,
        status: crate::StreamStatus,
    },
    /// Decoded event from the task stream.
    StreamEvent(crate::TaskUpdate),
    /// Result fetch finished.
    ResultsFetched {
        task_id: crate::TaskId,
        result: Result<crate::TaskResultsView, String>,
    },
    /// The screen is going away.
    ViewClosed,
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
