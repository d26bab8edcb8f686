//! Home page route handler.
//!
//! The page itself is a shell: the hero, category strip and product strip
//! arrive as separate fragments so one slow or failing section never holds
//! up or breaks the others.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::fragments::{CategoryStripTemplate, HeroTemplate, ProductStripTemplate};
use crate::routes::layout::Shell;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    /// Pre-rendered loading placeholders for the lazy sections.
    pub hero_html: String,
    pub categories_html: String,
    pub products_html: String,
}

/// Display the home page.
#[instrument(skip(state, auth))]
pub async fn home(State(state): State<AppState>, OptionalAuth(auth): OptionalAuth) -> Result<HomeTemplate> {
    Ok(HomeTemplate {
        shell: Shell::load(&state, auth.is_some()).await,
        hero_html: HeroTemplate::loading().render()?,
        categories_html: CategoryStripTemplate::loading().render()?,
        products_html: ProductStripTemplate::loading().render()?,
    })
}
