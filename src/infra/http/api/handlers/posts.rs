//! Post handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::posts::PostError;

use super::post_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::MaybePrincipal;
use crate::infra::http::api::models::{FeedQuery, PostDraftRequest, PostPayload};
use crate::infra::http::api::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .posts
        .recent_feed(query.limit)
        .await
        .map_err(post_to_api)?;

    let payload: Vec<PostPayload> = posts.into_iter().map(PostPayload::from).collect();
    Ok(Json(payload))
}

pub async fn list_user_posts(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.gallery(id).await.map_err(post_to_api)?;

    let payload: Vec<PostPayload> = posts.into_iter().map(PostPayload::from).collect();
    Ok(Json(payload))
}

pub async fn create_post(
    State(state): State<ApiState>,
    Extension(principal): Extension<MaybePrincipal>,
    Json(payload): Json<PostDraftRequest>,
) -> Result<Response, ApiError> {
    let author = principal.require()?.identity.id;
    let draft = payload.into_draft();

    match state.posts.create_post(author, &draft).await {
        Ok(post) => Ok((StatusCode::CREATED, Json(PostPayload::from(post))).into_response()),
        Err(PostError::Invalid(errors)) => Ok(ApiError::validation_failed(&errors)),
        Err(err) => Err(post_to_api(err)),
    }
}

pub async fn update_post(
    State(state): State<ApiState>,
    Extension(principal): Extension<MaybePrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostDraftRequest>,
) -> Result<Response, ApiError> {
    let requester = principal.require()?.identity.id;
    let draft = payload.into_draft();

    match state.posts.update_post(requester, id, &draft).await {
        Ok(post) => Ok(Json(PostPayload::from(post)).into_response()),
        Err(PostError::Invalid(errors)) => Ok(ApiError::validation_failed(&errors)),
        Err(err) => Err(post_to_api(err)),
    }
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Extension(principal): Extension<MaybePrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = principal.require()?.identity.id;

    state
        .posts
        .delete_post(requester, id)
        .await
        .map_err(post_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
