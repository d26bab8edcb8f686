//! Markdown content pages and the not-found page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::Shell;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub shell: Shell,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub content_html: String,
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub shell: Shell,
}

/// Render the 404 page with its status.
pub async fn not_found_page(state: &AppState, signed_in: bool) -> Response {
    let page = NotFoundTemplate {
        shell: Shell::load(state, signed_in).await,
    };
    (StatusCode::NOT_FOUND, page).into_response()
}

async fn content_page(state: &AppState, slug: &str, signed_in: bool) -> Response {
    let Some(page) = state.content().page(slug) else {
        return not_found_page(state, signed_in).await;
    };

    ContentPageTemplate {
        shell: Shell::load(state, signed_in).await,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        image: page.meta.image.clone(),
        content_html: page.content_html.clone(),
    }
    .into_response()
}

/// Display the About page.
#[instrument(skip(state, auth))]
pub async fn about(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> Response {
    content_page(&state, "about", auth.is_some()).await
}

/// Fallback for unmatched routes.
#[instrument(skip(state, auth))]
pub async fn not_found(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> Response {
    not_found_page(&state, auth.is_some()).await
}
