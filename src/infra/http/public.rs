use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE},
    },
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::{
        posts::{PostError, PostService},
        repos::IdentitiesRepo,
        sessions::{SessionPrincipal, SessionService},
    },
    domain::entities::PostRecord,
    infra::db::PostgresRepositories,
    presentation::views::{
        GamesContext, GamesTemplate, HomeTab, IndexContext, IndexTemplate, LayoutContext,
        LoginContext, LoginTemplate, PostCardView, ProfileContext, ProfileTemplate, ViewerView,
        build_tabs, render_not_found_response, render_template_response,
    },
};

use super::{
    RouterState, SESSION_COOKIE, db_health_response, extract_session_token,
    middleware::{log_responses, set_request_context},
    repo_error_to_http,
};

const FEED_LOAD_ERROR: &str = "The feed could not be loaded. Please try again.";
const GALLERY_LOAD_ERROR: &str = "These posts could not be loaded. Please try again.";

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub sessions: Arc<SessionService>,
    pub identities: Arc<dyn IdentitiesRepo>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/profile/{id}", get(profile))
        .route("/games", get(games))
        .route("/auth/login", get(login_page).post(login_submit))
        .route("/auth/logout", post(logout))
        .route("/_health/db", get(public_health))
        .route("/static/insider.css", get(stylesheet))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HomeQuery {
    tab: Option<String>,
    post: Option<Uuid>,
    image: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CarouselQuery {
    post: Option<Uuid>,
    image: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    token: String,
}

async fn index(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<HomeQuery>,
) -> Response {
    let viewer = resolve_viewer(&state, &headers).await;
    let tab = HomeTab::from_param(query.tab.as_deref());

    // Feed failures degrade to an inline message; the page still renders.
    let mut feed_error = None;
    let posts = if tab == HomeTab::Feed {
        match state.posts.recent_feed(None).await {
            Ok(posts) => posts,
            Err(err) => {
                warn!(
                    target = "insider::http::public",
                    error = %err,
                    "home feed load failed"
                );
                feed_error = Some(FEED_LOAD_ERROR);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let selection = carousel_selection(query.post, query.image);
    let cards = match build_cards(&state, &posts, viewer.as_ref(), "/", Some(tab), selection).await
    {
        Ok(cards) => cards,
        Err(err) => {
            warn!(
                target = "insider::http::public",
                error = %err,
                "home feed card assembly failed"
            );
            feed_error = Some(FEED_LOAD_ERROR);
            Vec::new()
        }
    };

    let content = IndexContext {
        tabs: build_tabs(tab),
        active_tab: tab,
        has_posts: !cards.is_empty(),
        posts: cards,
        feed_error,
    };
    let view = LayoutContext::new(viewer.as_ref().map(ViewerView::from), content);
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

async fn profile(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<CarouselQuery>,
) -> Response {
    let Some(viewer) = resolve_viewer(&state, &headers).await else {
        return Redirect::to("/auth/login").into_response();
    };
    let viewer_view = ViewerView::from(&viewer);

    let identity = match state.identities.find_identity(id).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return render_not_found_response(Some(viewer_view)),
        Err(err) => {
            return repo_error_to_http("infra::http::public::profile", err).into_response();
        }
    };

    // Gallery failures degrade to an inline message under the header.
    let mut gallery_error = None;
    let posts = match state.posts.gallery(id).await {
        Ok(posts) => posts,
        Err(err) => {
            warn!(
                target = "insider::http::public",
                error = %err,
                profile = %id,
                "gallery load failed"
            );
            gallery_error = Some(GALLERY_LOAD_ERROR);
            Vec::new()
        }
    };

    let page_path = format!("/profile/{id}");
    let selection = carousel_selection(query.post, query.image);
    let cards = match build_cards(&state, &posts, Some(&viewer), &page_path, None, selection).await
    {
        Ok(cards) => cards,
        Err(err) => {
            warn!(
                target = "insider::http::public",
                error = %err,
                profile = %id,
                "gallery card assembly failed"
            );
            gallery_error = Some(GALLERY_LOAD_ERROR);
            Vec::new()
        }
    };

    let content = ProfileContext {
        name: identity.label().to_string(),
        email: identity.email,
        avatar_url: identity.avatar_url,
        post_count: cards.len(),
        posts: cards,
        is_self: viewer.identity.id == id,
        gallery_error,
    };
    let view = LayoutContext::new(Some(viewer_view), content);
    render_template_response(ProfileTemplate { view }, StatusCode::OK)
}

async fn games(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let viewer = resolve_viewer(&state, &headers).await;
    let view = LayoutContext::new(
        viewer.as_ref().map(ViewerView::from),
        GamesContext::catalog(),
    );
    render_template_response(GamesTemplate { view }, StatusCode::OK)
}

async fn login_page(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    if resolve_viewer(&state, &headers).await.is_some() {
        return Redirect::to("/").into_response();
    }
    let view = LayoutContext::new(None, LoginContext { error: None });
    render_template_response(LoginTemplate { view }, StatusCode::OK)
}

async fn login_submit(State(state): State<HttpState>, Form(form): Form<LoginForm>) -> Response {
    let token = form.token.trim();
    if state.sessions.authenticate(token).await.is_err() {
        let view = LayoutContext::new(
            None,
            LoginContext {
                error: Some("That session token was not accepted."),
            },
        );
        return render_template_response(LoginTemplate { view }, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let mut response = Redirect::to("/").into_response();
    if let Ok(cookie) = HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
    )) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

async fn logout(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    if let Some(principal) = resolve_viewer(&state, &headers).await {
        // Best effort; an already-revoked session still clears the cookie.
        let _ = state.sessions.sign_out(principal.session_id).await;
    }

    let mut response = Redirect::to("/").into_response();
    if let Ok(cookie) =
        HeaderValue::from_str(&format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly"))
    {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn stylesheet() -> Response {
    (
        [
            (CONTENT_TYPE, "text/css; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        include_str!("../../../assets/insider.css"),
    )
        .into_response()
}

async fn resolve_viewer(state: &HttpState, headers: &HeaderMap) -> Option<SessionPrincipal> {
    let token = extract_session_token(headers)?;
    state.sessions.authenticate(&token).await.ok()
}

fn carousel_selection(post: Option<Uuid>, image: Option<usize>) -> Option<(Uuid, usize)> {
    post.map(|id| (id, image.unwrap_or(0)))
}

async fn build_cards(
    state: &HttpState,
    posts: &[PostRecord],
    viewer: Option<&SessionPrincipal>,
    page_path: &str,
    tab: Option<HomeTab>,
    selection: Option<(Uuid, usize)>,
) -> Result<Vec<PostCardView>, PostError> {
    let authors = author_labels(state, posts).await?;
    let viewer_id = viewer.map(|principal| principal.identity.id);

    Ok(posts
        .iter()
        .map(|post| {
            let author = post
                .owner
                .and_then(|owner| authors.get(&owner).cloned())
                .unwrap_or_else(|| "Anonymous".to_string());
            PostCardView::build(post, author, viewer_id, page_path, tab, selection)
        })
        .collect())
}

async fn author_labels(
    state: &HttpState,
    posts: &[PostRecord],
) -> Result<HashMap<Uuid, String>, PostError> {
    let mut labels = HashMap::new();
    for owner in posts.iter().filter_map(|post| post.owner) {
        if labels.contains_key(&owner) {
            continue;
        }
        if let Some(identity) = state.identities.find_identity(owner).await? {
            labels.insert(owner, identity.label().to_string());
        }
    }
    Ok(labels)
}

