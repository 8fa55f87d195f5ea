use std::sync::Arc;

use crate::application::repos::{PostsRepo, PostsWriteRepo};

/// Orchestrates the post lifecycle: draft validation, ownership
/// authorization, persistence, and feed/gallery reads.
#[derive(Clone)]
pub struct PostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) default_feed_limit: u32,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        default_feed_limit: u32,
    ) -> Self {
        Self {
            reader,
            writer,
            default_feed_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::application::posts::{MAX_FEED_LIMIT, PostError};
    use crate::application::repos::{
        CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
    };
    use crate::domain::draft::PostDraft;
    use crate::domain::entities::PostRecord;

    use super::*;

    #[derive(Default)]
    struct MemoryPosts {
        posts: Mutex<Vec<PostRecord>>,
        last_limit: Mutex<Option<u32>>,
    }

    #[async_trait]
    impl PostsRepo for MemoryPosts {
        async fn list_recent(&self, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
            *self.last_limit.lock().unwrap() = Some(limit);
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<PostRecord>, RepoError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|post| post.owner == Some(owner))
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .iter()
                .find(|post| post.id == id)
                .cloned())
        }
    }

    #[async_trait]
    impl PostsWriteRepo for MemoryPosts {
        async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
            let record = PostRecord {
                id: Uuid::new_v4(),
                caption: Some(params.caption),
                image_urls: params.image_urls,
                owner: Some(params.owner),
                created_at: OffsetDateTime::now_utc(),
                updated_at: None,
            };
            self.posts.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|post| post.id == params.id)
                .ok_or(RepoError::NotFound)?;
            post.caption = Some(params.caption);
            post.image_urls = params.image_urls;
            post.updated_at = Some(OffsetDateTime::now_utc());
            Ok(post.clone())
        }

        async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|post| post.id != id);
            if posts.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    fn service() -> (PostService, Arc<MemoryPosts>) {
        let repo = Arc::new(MemoryPosts::default());
        let reader: Arc<dyn PostsRepo> = repo.clone();
        let writer: Arc<dyn PostsWriteRepo> = repo.clone();
        (PostService::new(reader, writer, 5), repo)
    }

    fn draft(caption: &str, images: &[&str]) -> PostDraft {
        PostDraft::from_parts(
            caption.to_string(),
            images.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn legacy_post() -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            caption: Some("old".to_string()),
            image_urls: vec!["https://x.test/a.png".to_string()],
            owner: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_persists_with_the_author_as_owner() {
        let (service, _repo) = service();
        let author = Uuid::new_v4();

        let post = service
            .create_post(author, &draft("Hello", &["https://x.test/a.png"]))
            .await
            .unwrap();

        assert_eq!(post.owner, Some(author));
        assert_eq!(post.caption.as_deref(), Some("Hello"));
        assert_eq!(post.image_urls, vec!["https://x.test/a.png".to_string()]);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_repository() {
        let (service, repo) = service();

        let result = service
            .create_post(Uuid::new_v4(), &draft("   ", &["https://x.test/a.png"]))
            .await;

        assert!(matches!(result, Err(PostError::Invalid(_))));
        assert!(repo.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_update_or_delete() {
        let (service, _repo) = service();
        let owner = Uuid::new_v4();
        let post = service
            .create_post(owner, &draft("Hello", &["https://x.test/a.png"]))
            .await
            .unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            service
                .update_post(stranger, post.id, &draft("Hi", &["https://x.test/b.png"]))
                .await,
            Err(PostError::NotOwner)
        ));
        assert!(matches!(
            service.delete_post(stranger, post.id).await,
            Err(PostError::NotOwner)
        ));
    }

    #[tokio::test]
    async fn legacy_post_without_owner_is_immutable() {
        let (service, repo) = service();
        let post = legacy_post();
        repo.posts.lock().unwrap().push(post.clone());

        assert!(matches!(
            service.delete_post(Uuid::new_v4(), post.id).await,
            Err(PostError::NotOwner)
        ));
    }

    #[tokio::test]
    async fn mutating_a_missing_post_reports_not_found() {
        let (service, _repo) = service();
        assert!(matches!(
            service.delete_post(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(PostError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleting_removes_exactly_the_targeted_post() {
        let (service, repo) = service();
        let owner = Uuid::new_v4();
        let first = service
            .create_post(owner, &draft("One", &["https://x.test/a.png"]))
            .await
            .unwrap();
        let second = service
            .create_post(owner, &draft("Two", &["https://x.test/b.png"]))
            .await
            .unwrap();

        service.delete_post(owner, first.id).await.unwrap();

        let remaining = repo.posts.lock().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
    }

    #[tokio::test]
    async fn feed_limit_is_clamped_and_defaulted() {
        let (service, repo) = service();

        service.recent_feed(None).await.unwrap();
        assert_eq!(*repo.last_limit.lock().unwrap(), Some(5));

        service.recent_feed(Some(10_000)).await.unwrap();
        assert_eq!(*repo.last_limit.lock().unwrap(), Some(MAX_FEED_LIMIT));

        service.recent_feed(Some(0)).await.unwrap();
        assert_eq!(*repo.last_limit.lock().unwrap(), Some(1));
    }
}
