mod posts;
mod session;

pub use posts::{create_post, delete_post, list_posts, list_user_posts, update_post};
pub use session::{delete_session, get_session};

use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::application::sessions::SessionError;

use super::error::{ApiError, codes};
use axum::http::StatusCode;

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(message),
        ),
    }
}

/// Validation failures are handled separately by the caller; everything
/// else funnels through here.
pub(crate) fn post_to_api(err: PostError) -> ApiError {
    match err {
        PostError::Repo(repo) => repo_to_api(repo),
        PostError::NotFound => ApiError::not_found("post not found"),
        PostError::NotOwner => ApiError::forbidden(),
        PostError::Invalid(_) => ApiError::bad_request("draft failed validation", None),
    }
}

pub(crate) fn session_to_api(err: SessionError) -> ApiError {
    match err {
        SessionError::Repo(repo) => repo_to_api(repo),
        SessionError::UnknownIdentity => ApiError::not_found("identity not found"),
    }
}
