use std::sync::Arc;

use crate::application::posts::PostService;
use crate::application::sessions::SessionService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub sessions: Arc<SessionService>,
    pub db: Arc<PostgresRepositories>,
}
