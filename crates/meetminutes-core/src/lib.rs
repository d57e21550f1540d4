//! Core types: meetings, archive naming, day windows, minutes rendering

pub mod links;
pub mod meeting;
pub mod render;
pub mod time;
pub mod tracing;

pub use links::ArchiveNaming;
pub use meeting::{Meeting, find_meeting};
pub use render::{compose_minutes, markdown_to_html};
pub use time::DayWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
