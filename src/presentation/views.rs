use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::sessions::SessionPrincipal;
use crate::domain::carousel::Carousel;
use crate::domain::entities::PostRecord;

const CREATED_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(viewer: Option<ViewerView>) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(viewer, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// The signed-in identity as shown in the page chrome.
#[derive(Clone)]
pub struct ViewerView {
    pub id: Uuid,
    pub label: String,
    pub avatar_url: Option<String>,
    pub profile_href: String,
}

impl From<&SessionPrincipal> for ViewerView {
    fn from(principal: &SessionPrincipal) -> Self {
        Self {
            id: principal.identity.id,
            label: principal.identity.label().to_string(),
            avatar_url: principal.identity.avatar_url.clone(),
            profile_href: format!("/profile/{}", principal.identity.id),
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub viewer: Option<ViewerView>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(viewer: Option<ViewerView>, content: T) -> Self {
        Self { viewer, content }
    }
}

/// Tabs on the home route, selected by the `tab` query parameter.
/// Anything unrecognized falls back to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeTab {
    Feed,
    Reels,
    Search,
}

impl HomeTab {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("reels") => Self::Reels,
            Some("search") => Self::Search,
            _ => Self::Feed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Reels => "reels",
            Self::Search => "search",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Feed => "Feed",
            Self::Reels => "Reels",
            Self::Search => "Search",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Feed, Self::Reels, Self::Search]
    }
}

#[derive(Clone)]
pub struct TabView {
    pub label: &'static str,
    pub href: String,
    pub is_active: bool,
}

pub fn build_tabs(active: HomeTab) -> Vec<TabView> {
    HomeTab::all()
        .into_iter()
        .map(|tab| TabView {
            label: tab.label(),
            href: format!("/?tab={}", tab.as_str()),
            is_active: tab == active,
        })
        .collect()
}

/// One indicator dot under a carousel; the href re-renders the page
/// with that image selected.
#[derive(Clone)]
pub struct CarouselDot {
    pub href: String,
    pub is_active: bool,
}

/// A post rendered as a card with its server-side carousel state.
#[derive(Clone)]
pub struct PostCardView {
    pub id: String,
    pub anchor: String,
    pub caption: String,
    pub author: String,
    pub author_href: Option<String>,
    pub created_label: String,
    pub active_image: Option<String>,
    pub position_label: String,
    pub has_controls: bool,
    pub prev_href: String,
    pub next_href: String,
    pub dots: Vec<CarouselDot>,
    pub can_edit: bool,
}

impl PostCardView {
    /// `selection` carries the `?post=<id>&image=<n>` query pair when it
    /// targets this card; any other card keeps its first image.
    pub fn build(
        post: &PostRecord,
        author: String,
        viewer: Option<Uuid>,
        page_path: &str,
        tab: Option<HomeTab>,
        selection: Option<(Uuid, usize)>,
    ) -> Self {
        let requested = match selection {
            Some((id, index)) if id == post.id => index,
            _ => 0,
        };
        let carousel = Carousel::new(requested, post.image_urls.len());

        let href = |image: usize| -> String {
            let anchor = post.id;
            match tab {
                Some(tab) => format!(
                    "{page_path}?tab={}&post={anchor}&image={image}#post-{anchor}",
                    tab.as_str()
                ),
                None => format!("{page_path}?post={anchor}&image={image}#post-{anchor}"),
            }
        };

        let dots = (0..carousel.total())
            .map(|image| CarouselDot {
                href: href(image),
                is_active: image == carousel.index(),
            })
            .collect();

        Self {
            id: post.id.to_string(),
            anchor: format!("post-{}", post.id),
            caption: post.caption.clone().unwrap_or_default(),
            author,
            author_href: post.owner.map(|owner| format!("/profile/{owner}")),
            created_label: format_created(post.created_at),
            active_image: post.image_urls.get(carousel.index()).cloned(),
            position_label: format!("{} / {}", carousel.index() + 1, carousel.total().max(1)),
            has_controls: carousel.has_controls(),
            prev_href: href(carousel.previous()),
            next_href: href(carousel.next()),
            dots,
            can_edit: viewer.map(|id| post.is_owned_by(id)).unwrap_or(false),
        }
    }
}

fn format_created(created_at: OffsetDateTime) -> String {
    created_at
        .format(CREATED_LABEL_FORMAT)
        .unwrap_or_else(|_| created_at.date().to_string())
}

pub struct IndexContext {
    pub tabs: Vec<TabView>,
    pub active_tab: HomeTab,
    pub posts: Vec<PostCardView>,
    pub has_posts: bool,
    pub feed_error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

pub struct ProfileContext {
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub post_count: usize,
    pub posts: Vec<PostCardView>,
    pub is_self: bool,
    pub gallery_error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfileContext>,
}

pub struct GameCard {
    pub title: &'static str,
    pub blurb: &'static str,
}

pub struct GamesContext {
    pub games: Vec<GameCard>,
}

impl GamesContext {
    pub fn catalog() -> Self {
        Self {
            games: vec![
                GameCard {
                    title: "Word Rush",
                    blurb: "Race the clock to spell as many words as you can.",
                },
                GameCard {
                    title: "Photo Hunt",
                    blurb: "Spot the differences between two almost-identical shots.",
                },
                GameCard {
                    title: "Trivia Night",
                    blurb: "Five rounds of questions pulled from your feed topics.",
                },
            ],
        }
    }
}

#[derive(Template)]
#[template(path = "games.html")]
pub struct GamesTemplate {
    pub view: LayoutContext<GamesContext>,
}

pub struct LoginContext {
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Head back to the feed to keep browsing.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn post(images: &[&str]) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            caption: Some("Sunset".to_string()),
            image_urls: images.iter().map(|s| s.to_string()).collect(),
            owner: Some(Uuid::new_v4()),
            created_at: datetime!(2026-03-09 12:00 UTC),
            updated_at: None,
        }
    }

    #[test]
    fn unselected_card_shows_first_image() {
        let record = post(&["https://x.test/a.png", "https://x.test/b.png"]);
        let card = PostCardView::build(
            &record,
            "Ada".to_string(),
            None,
            "/",
            Some(HomeTab::Feed),
            Some((Uuid::new_v4(), 1)),
        );
        assert_eq!(card.active_image.as_deref(), Some("https://x.test/a.png"));
        assert_eq!(card.position_label, "1 / 2");
    }

    #[test]
    fn selection_drives_carousel_and_wrap_links() {
        let record = post(&["https://x.test/a.png", "https://x.test/b.png"]);
        let card = PostCardView::build(
            &record,
            "Ada".to_string(),
            None,
            "/",
            Some(HomeTab::Feed),
            Some((record.id, 1)),
        );
        assert_eq!(card.active_image.as_deref(), Some("https://x.test/b.png"));
        assert!(card.next_href.contains("image=0"));
        assert!(card.prev_href.contains("image=0"));
        assert!(card.next_href.contains("tab=feed"));
    }

    #[test]
    fn single_image_card_hides_controls() {
        let record = post(&["https://x.test/a.png"]);
        let card = PostCardView::build(&record, "Ada".to_string(), None, "/", None, None);
        assert!(!card.has_controls);
        assert_eq!(card.dots.len(), 1);
    }

    #[test]
    fn owner_sees_edit_affordance_and_strangers_do_not() {
        let record = post(&["https://x.test/a.png"]);
        let owner = record.owner.unwrap();

        let own = PostCardView::build(&record, "Ada".to_string(), Some(owner), "/", None, None);
        assert!(own.can_edit);

        let other = PostCardView::build(
            &record,
            "Ada".to_string(),
            Some(Uuid::new_v4()),
            "/",
            None,
            None,
        );
        assert!(!other.can_edit);

        let anonymous = PostCardView::build(&record, "Ada".to_string(), None, "/", None, None);
        assert!(!anonymous.can_edit);
    }

    #[test]
    fn created_label_is_human_readable() {
        let record = post(&["https://x.test/a.png"]);
        let card = PostCardView::build(&record, "Ada".to_string(), None, "/", None, None);
        assert_eq!(card.created_label, "March 9, 2026");
    }

    #[test]
    fn unknown_tab_falls_back_to_feed() {
        assert_eq!(HomeTab::from_param(Some("stories")), HomeTab::Feed);
        assert_eq!(HomeTab::from_param(None), HomeTab::Feed);
        assert_eq!(HomeTab::from_param(Some("reels")), HomeTab::Reels);
    }
}
