//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A published post: a caption plus an ordered gallery of image URLs.
///
/// `owner` is `None` only for legacy rows created before ownership was
/// recorded; such posts are readable but cannot be edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub caption: Option<String>,
    pub image_urls: Vec<String>,
    pub owner: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl PostRecord {
    /// Whether the given identity may edit or delete this post.
    pub fn is_owned_by(&self, identity: Uuid) -> bool {
        self.owner == Some(identity)
    }
}

/// An account known to the server. Rows are created operationally (the
/// `account add` subcommand) as the stand-in for an external identity
/// provider; the web surfaces only ever read them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: OffsetDateTime,
}

impl IdentityRecord {
    /// Name shown in page chrome: display name, falling back to email.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// A minted session. The secret is stored hashed; the clear token is only
/// ever shown once, at issue time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub token_prefix: String,
    pub hashed_secret: Vec<u8>,
    pub created_at: OffsetDateTime,
    pub expires_at: Option<OffsetDateTime>,
    pub revoked_at: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(owner: Option<Uuid>) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            caption: Some("hello".to_string()),
            image_urls: vec!["https://x.test/a.png".to_string()],
            owner,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn ownership_requires_matching_identity() {
        let me = Uuid::new_v4();
        assert!(post(Some(me)).is_owned_by(me));
        assert!(!post(Some(Uuid::new_v4())).is_owned_by(me));
    }

    #[test]
    fn legacy_posts_without_owner_are_owned_by_nobody() {
        assert!(!post(None).is_owned_by(Uuid::new_v4()));
    }
}
