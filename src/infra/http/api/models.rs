use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::draft::PostDraft;
use crate::domain::entities::{IdentityRecord, PostRecord};

/// Request body for creating or replacing a post.
#[derive(Debug, Deserialize)]
pub struct PostDraftRequest {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl PostDraftRequest {
    pub fn into_draft(self) -> PostDraft {
        PostDraft::from_parts(self.caption, self.image_urls)
    }
}

#[derive(Debug, Serialize)]
pub struct PostPayload {
    pub id: Uuid,
    pub caption: Option<String>,
    pub image_urls: Vec<String>,
    pub owner: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl From<PostRecord> for PostPayload {
    fn from(post: PostRecord) -> Self {
        Self {
            id: post.id,
            caption: post.caption,
            image_urls: post.image_urls,
            owner: post.owner,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdentityPayload {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<IdentityRecord> for IdentityPayload {
    fn from(identity: IdentityRecord) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            display_name: identity.display_name,
            avatar_url: identity.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub session_id: Uuid,
    pub identity: IdentityPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedQuery {
    pub limit: Option<u32>,
}
