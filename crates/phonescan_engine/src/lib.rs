//! Phonescan engine: backend API client, task stream client and effect execution.
mod api;
mod engine;
mod event;
mod inspect;
mod persist;
mod settings;
mod stream;
mod transport;
mod types;

pub use api::{ReqwestApiClient, TaskApi};
pub use engine::EngineHandle;
pub use event::{
    decode_event, CompletedPayload, FailedPayload, ProgressPayload, StatusPayload, TaskEvent,
};
pub use inspect::{inspect_file, media_type_for_path, InspectError};
pub use persist::{ensure_output_dir, export_results, AtomicFileWriter, PersistError};
pub use settings::ClientSettings;
pub use stream::{TaskEventStream, CONNECTION_FAILED};
pub use transport::{
    ConnectionId, SocketConnector, SocketEvent, SocketEventSender, SocketHandle,
    TaggedSocketEvent, TungsteniteConnector,
};
pub use types::{
    ApiError, EngineEvent, FailureKind, PhoneNumberRecord, StreamUpdate, TaskId, TaskList,
    TaskResults, TaskStatusReport, TaskSummary, UploadFile, UploadResponse,
};
