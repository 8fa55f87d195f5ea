//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{IdentityRecord, PostRecord, SessionRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub caption: String,
    pub image_urls: Vec<String>,
    pub owner: Uuid,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub caption: String,
    pub image_urls: Vec<String>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Newest posts across all owners, created_at descending.
    async fn list_recent(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError>;

    /// One owner's posts, created_at descending.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateIdentityParams {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[async_trait]
pub trait IdentitiesRepo: Send + Sync {
    async fn create_identity(
        &self,
        params: CreateIdentityParams,
    ) -> Result<IdentityRecord, RepoError>;

    async fn find_identity(&self, id: Uuid) -> Result<Option<IdentityRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub identity_id: Uuid,
    pub token_prefix: String,
    pub hashed_secret: Vec<u8>,
    pub expires_at: Option<OffsetDateTime>,
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, params: CreateSessionParams)
    -> Result<SessionRecord, RepoError>;

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError>;

    async fn revoke_session(&self, id: Uuid, revoked_at: OffsetDateTime) -> Result<(), RepoError>;
}
