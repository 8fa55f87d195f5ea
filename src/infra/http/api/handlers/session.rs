//! Session introspection and sign-out

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::session_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::MaybePrincipal;
use crate::infra::http::api::models::{IdentityPayload, SessionPayload};
use crate::infra::http::api::state::ApiState;

pub async fn get_session(
    Extension(principal): Extension<MaybePrincipal>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = principal.require()?;

    Ok(Json(SessionPayload {
        session_id: principal.session_id,
        identity: IdentityPayload::from(principal.identity.clone()),
    }))
}

pub async fn delete_session(
    State(state): State<ApiState>,
    Extension(principal): Extension<MaybePrincipal>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = principal.require()?;

    state
        .sessions
        .sign_out(principal.session_id)
        .await
        .map_err(session_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
