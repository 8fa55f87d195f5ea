use uuid::Uuid;

use crate::domain::entities::PostRecord;

use super::service::PostService;
use super::types::{MAX_FEED_LIMIT, PostError};

impl PostService {
    /// The most recent posts across all owners. A missing limit falls
    /// back to the configured default; any limit is clamped to
    /// [1, MAX_FEED_LIMIT].
    pub async fn recent_feed(&self, limit: Option<u32>) -> Result<Vec<PostRecord>, PostError> {
        let limit = limit
            .unwrap_or(self.default_feed_limit)
            .clamp(1, MAX_FEED_LIMIT);
        self.reader
            .list_recent(limit)
            .await
            .map_err(PostError::from)
    }

    /// One user's gallery, newest first.
    pub async fn gallery(&self, owner: Uuid) -> Result<Vec<PostRecord>, PostError> {
        self.reader
            .list_by_owner(owner)
            .await
            .map_err(PostError::from)
    }

    pub async fn load_post(&self, id: Uuid) -> Result<Option<PostRecord>, PostError> {
        self.reader.find_by_id(id).await.map_err(PostError::from)
    }
}
