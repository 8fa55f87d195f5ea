pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, put},
};

use crate::infra::http::RouterState;
use crate::infra::http::middleware::log_responses;

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    let auth_state = state.clone();

    Router::new()
        .route(
            "/api/v1/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/v1/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .route("/api/v1/users/{id}/posts", get(handlers::list_user_posts))
        .route(
            "/api/v1/session",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::session_auth,
        ))
        .layer(axum_middleware::from_fn(log_responses))
}
