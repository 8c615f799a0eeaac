mod app;
mod effects;
mod logging;
mod render;

pub use app::run;
pub use logging::{initialize as initialize_logging, LogDestination};
