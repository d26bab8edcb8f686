//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::content::Post;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::Shell;
use crate::routes::pages::not_found_page;
use crate::state::AppState;

/// Number of recent posts to show in sidebar.
const RECENT_POSTS_COUNT: usize = 3;

/// Post view for templates.
#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: NaiveDate,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub content_html: String,
    pub reading_time_minutes: usize,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            description: post.meta.description.clone(),
            author: post.meta.author.clone(),
            published_at: post.meta.published_at,
            image: post.meta.image.clone(),
            tags: post.meta.tags.clone(),
            content_html: post.content_html.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub shell: Shell,
    pub posts: Vec<PostView>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub shell: Shell,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
}

/// Display the blog index.
#[instrument(skip(state, auth))]
pub async fn index(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> BlogIndexTemplate {
    BlogIndexTemplate {
        shell: Shell::load(&state, auth.is_some()).await,
        posts: state.content().published_posts().map(PostView::from).collect(),
    }
}

/// Display a single post. Unknown slugs and drafts get the 404 page.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Response {
    let Some(post) = state.content().post(&slug).map(PostView::from) else {
        return not_found_page(&state, auth.is_some()).await;
    };

    BlogShowTemplate {
        shell: Shell::load(&state, auth.is_some()).await,
        recent_posts: state
            .content()
            .recent_posts(RECENT_POSTS_COUNT, Some(&slug))
            .into_iter()
            .map(PostView::from)
            .collect(),
        post,
    }
    .into_response()
}
