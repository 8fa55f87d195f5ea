use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, UpdatePostParams};
use crate::domain::draft::PostDraft;
use crate::domain::entities::PostRecord;

use super::service::PostService;
use super::types::PostError;

impl PostService {
    /// Create a post owned by `author`. The draft is validated first;
    /// a validation failure never reaches the repository.
    pub async fn create_post(
        &self,
        author: Uuid,
        draft: &PostDraft,
    ) -> Result<PostRecord, PostError> {
        let clean = draft.validate().map_err(PostError::Invalid)?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                caption: clean.caption,
                image_urls: clean.image_urls,
                owner: author,
            })
            .await?;

        counter!("insider_posts_created_total").increment(1);
        info!(
            target = "insider::posts",
            post_id = %post.id,
            owner = %author,
            images = post.image_urls.len(),
            "post created"
        );

        Ok(post)
    }

    /// Overwrite caption and gallery of an existing post. The requesting
    /// identity must own the post; a legacy row without an owner is
    /// mutable by nobody.
    pub async fn update_post(
        &self,
        requester: Uuid,
        id: Uuid,
        draft: &PostDraft,
    ) -> Result<PostRecord, PostError> {
        self.authorize_owner(requester, id).await?;

        let clean = draft.validate().map_err(PostError::Invalid)?;

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id,
                caption: clean.caption,
                image_urls: clean.image_urls,
            })
            .await?;

        counter!("insider_posts_updated_total").increment(1);
        info!(
            target = "insider::posts",
            post_id = %post.id,
            owner = %requester,
            "post updated"
        );

        Ok(post)
    }

    /// Delete a post after the same ownership gate as updates.
    pub async fn delete_post(&self, requester: Uuid, id: Uuid) -> Result<(), PostError> {
        self.authorize_owner(requester, id).await?;

        self.writer.delete_post(id).await?;

        counter!("insider_posts_deleted_total").increment(1);
        info!(
            target = "insider::posts",
            post_id = %id,
            owner = %requester,
            "post deleted"
        );

        Ok(())
    }

    /// Server-side ownership check run before every mutation. The UI
    /// hides edit/delete affordances from non-owners, but that gate is
    /// advisory only.
    async fn authorize_owner(&self, requester: Uuid, id: Uuid) -> Result<(), PostError> {
        let post = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound)?;

        if !post.is_owned_by(requester) {
            return Err(PostError::NotOwner);
        }

        Ok(())
    }
}
