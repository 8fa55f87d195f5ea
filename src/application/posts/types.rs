use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::draft::DraftErrors;

/// Hard ceiling on the recent-feed page size; requested limits are
/// clamped, never trusted.
pub const MAX_FEED_LIMIT: u32 = 50;

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("post not found")]
    NotFound,
    #[error("post is not owned by the requesting identity")]
    NotOwner,
    #[error("post draft failed validation")]
    Invalid(DraftErrors),
}
