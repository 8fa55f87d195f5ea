mod commands;
mod queries;
mod service;
mod types;

pub use service::PostService;
pub use types::{MAX_FEED_LIMIT, PostError};
