//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (sections load as fragments)
//!
//! # Catalog
//! GET  /shop                   - Product grid (?category=&page=)
//! GET  /category/{id}          - Shop filtered to a category subtree
//! GET  /products/{id}          - Product detail
//! POST /products/{id}/reviews  - Review form (returns form fragment)
//!
//! # Fragments (HTMX)
//! GET  /fragments/hero         - Hero carousel (?index=&nav=)
//! GET  /fragments/categories   - Category strip (?index=&nav=)
//! GET  /fragments/products     - Product tabs (?tab=&index=&nav=)
//! GET  /fragments/menu/{id}    - Mega-menu panel (?active=)
//! GET  /fragments/menu/{id}/closed - Empty panel after hover-out
//!
//! # Auth
//! GET  /login                  - Login and registration forms
//! POST /login                  - Login action (rate limited)
//! POST /register               - Register action (rate limited)
//! POST /logout                 - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//!
//! # Content
//! GET  /about                  - About page
//! GET  /blog                   - Blog index
//! GET  /blog/{slug}            - Blog post
//! ```

pub mod account;
pub mod auth;
pub mod blog;
pub mod fragments;
pub mod home;
pub mod layout;
pub mod pages;
pub mod products;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/shop", get(shop::index))
        .route("/category/{id}", get(shop::category))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/reviews", post(products::submit_review))
}

/// Create the fragment routes router.
pub fn fragment_routes() -> Router<AppState> {
    Router::new()
        .route("/hero", get(fragments::hero))
        .route("/categories", get(fragments::categories))
        .route("/products", get(fragments::products))
        .route("/menu/{id}", get(fragments::mega_menu))
        .route("/menu/{id}/closed", get(fragments::mega_menu_closed))
}

/// Create the auth routes router. Submissions are rate limited per client
/// when `rate_limited` is set.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));
    let submissions = if rate_limited {
        submissions.route_layer(auth_rate_limiter())
    } else {
        submissions
    };

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/account", get(account::index))
        .merge(submissions)
}

/// Create the content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes(auth_rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(catalog_routes())
        .nest("/fragments", fragment_routes())
        .merge(auth_routes(auth_rate_limit))
        .merge(content_routes())
        .fallback(pages::not_found)
}
