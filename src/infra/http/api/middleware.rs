use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics::counter;

use crate::application::sessions::{SessionAuthError, SessionPrincipal};
use crate::infra::http::extract_session_token;

use super::error::ApiError;
use super::state::ApiState;

/// Resolved authentication outcome for the request. Read endpoints work
/// without a principal; mutating handlers call [`MaybePrincipal::require`].
#[derive(Clone)]
pub struct MaybePrincipal(pub Option<SessionPrincipal>);

impl MaybePrincipal {
    pub fn require(&self) -> Result<&SessionPrincipal, ApiError> {
        self.0.as_ref().ok_or_else(ApiError::unauthorized)
    }
}

/// Authenticate the session token when one is presented. A missing
/// token passes through anonymously; a bad token is rejected outright
/// rather than silently downgraded.
pub async fn session_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let principal = match extract_session_token(request.headers()) {
        None => None,
        Some(token) => match state.sessions.authenticate(&token).await {
            Ok(principal) => Some(principal),
            Err(err) => {
                counter!("insider_sessions_rejected_total").increment(1);
                return session_auth_error(err).into_response();
            }
        },
    };

    request
        .extensions_mut()
        .insert(MaybePrincipal(principal.clone()));

    let mut response = next.run(request).await;
    // Echo the principal for the response logging middleware.
    if let Some(principal) = principal {
        response.extensions_mut().insert(principal);
    }
    response
}

fn session_auth_error(err: SessionAuthError) -> ApiError {
    match err {
        SessionAuthError::Expired => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "expired",
            "Session expired",
            None,
        ),
        SessionAuthError::Revoked => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "revoked",
            "Session revoked",
            None,
        ),
        SessionAuthError::Missing | SessionAuthError::Invalid => ApiError::unauthorized(),
    }
}
