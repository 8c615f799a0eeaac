//! Phonescan core: pure state machine for the upload screen, plus
//! validation, routing and view-model helpers.
mod effect;
mod msg;
mod route;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use route::Route;
pub use state::{
    AppState, Phase, PhoneNumberRow, SelectedFile, StreamStatus, TaskId, TaskResultsView,
    TaskUpdate,
};
pub use update::update;
pub use validate::{validate_file, ValidationError, ALLOWED_MEDIA_TYPES, MAX_UPLOAD_BYTES};
pub use view_model::{AppViewModel, SelectedFileView, StreamIndicator};
