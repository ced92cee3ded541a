pub mod domain;
pub mod dto;
pub mod error;
pub mod time;
pub mod timeline;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use timeline::{merge_timeline, TimelineEntry, TimelineSource};
