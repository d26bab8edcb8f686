//! End-to-end tests for the storefront router against a mock catalog API.

#![allow(clippy::unwrap_used)]

mod support;

use reqwest::StatusCode;
use support::{Hits, ProfileBody, Scenario, TestApp, location};

// ============================================================================
// Shell and Headers
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_home_renders_shell_with_lazy_sections() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers().clone();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("x-request-id").is_some());
    let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();
    assert!(csp.contains("https://assets.example.com"));

    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"hx-get="/fragments/hero" hx-trigger="load""#));
    assert!(body.contains(r#"hx-get="/fragments/categories" hx-trigger="load""#));
    assert!(body.contains(r#"hx-get="/fragments/products" hx-trigger="load""#));
    // Root categories open the mega-menu.
    assert!(body.contains(r#"hx-get="/fragments/menu/1""#));
    assert!(body.contains("Latest Posts"));
    // Sections are fetched lazily, not by the page.
    assert_eq!(Hits::get(&app.hits.banners), 0);
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/no/such/page").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("does not exist"));
}

// ============================================================================
// Fragments
// ============================================================================

#[tokio::test]
async fn test_hero_fragment_renders_first_banner_with_autoplay() {
    let app = TestApp::start(Scenario::default()).await;
    let body = app.get("/fragments/hero").await.text().await.unwrap();

    assert!(body.contains("Fresh <b>Organic</b> Food"));
    assert!(body.contains("https://assets.example.com/public/images/banner-1.jpg"));
    assert!(body.contains(r#"hx-trigger="every 5000ms""#));
    assert!(body.contains("index=0&amp;nav=next"));
}

#[tokio::test]
async fn test_hero_fragment_next_wraps_around() {
    let app = TestApp::start(Scenario::default()).await;

    let body = app.get("/fragments/hero?index=0&nav=next").await.text().await.unwrap();
    assert!(body.contains("Seasonal Fruit"));
    assert!(body.contains("/static/images/product-fallback.svg"));

    let body = app.get("/fragments/hero?index=1&nav=next").await.text().await.unwrap();
    assert!(body.contains("Fresh <b>Organic</b> Food"));
}

#[tokio::test]
async fn test_category_failure_shows_error_and_retries_on_next_request() {
    let app = TestApp::start(Scenario {
        categories_fail: true,
        ..Scenario::default()
    })
    .await;

    let resp = app.get("/fragments/categories").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Failed to load categories."));
    assert!(!body.contains("category-card"));
    assert_eq!(Hits::get(&app.hits.categories), 1);

    // Failures are not cached and nothing retries on its own.
    app.get("/fragments/categories").await;
    assert_eq!(Hits::get(&app.hits.categories), 2);
}

#[tokio::test]
async fn test_product_strip_tabs_filter_by_category() {
    let app = TestApp::start(Scenario::default()).await;

    let body = app.get("/fragments/products").await.text().await.unwrap();
    assert!(body.contains("All Products"));
    assert!(body.contains("Organic Lemons"));
    assert!(body.contains("Rolled Oats"));

    let body = app.get("/fragments/products?tab=2").await.text().await.unwrap();
    assert!(body.contains("Rolled Oats"));
    assert!(!body.contains("Organic Lemons"));
    // Negative stock reads as sold out.
    assert!(body.contains("Out of stock"));
}

#[tokio::test]
async fn test_mega_menu_shows_one_third_level_column() {
    let app = TestApp::start(Scenario::default()).await;

    let body = app.get("/fragments/menu/1").await.text().await.unwrap();
    assert!(body.contains("Citrus"));
    assert!(body.contains("Melons"));
    assert!(!body.contains("Lemons"));
    assert!(body.contains("delay:200ms"));
    // Hovers within one panel replace each other's in-flight requests.
    assert_eq!(
        body.matches(r#"hx-sync="closest .mega-panel:replace""#).count(),
        2
    );

    let body = app.get("/fragments/menu/1?active=11").await.text().await.unwrap();
    assert!(body.contains("Lemons"));
    assert_eq!(body.matches("mega-column third").count(), 1);

    // A leaf second-level entry opens no third column.
    let body = app.get("/fragments/menu/1?active=12").await.text().await.unwrap();
    assert!(!body.contains("mega-column third"));
}

#[tokio::test]
async fn test_mega_menu_closes() {
    let app = TestApp::start(Scenario::default()).await;

    // No children: nothing to open.
    let body = app.get("/fragments/menu/2").await.text().await.unwrap();
    assert!(body.contains(r#"<div class="mega-panel" id="mega-panel-2"></div>"#));

    let body = app.get("/fragments/menu/1/closed").await.text().await.unwrap();
    assert!(body.contains(r#"<div class="mega-panel" id="mega-panel-1"></div>"#));
}

// ============================================================================
// Catalog Pages
// ============================================================================

#[tokio::test]
async fn test_category_page_includes_descendants() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/category/1").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains("Organic Lemons"));
    assert!(!body.contains("Rolled Oats"));
    assert!(body.contains("1 products"));
}

#[tokio::test]
async fn test_product_detail() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/products/1").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains("Organic Lemons"));
    assert!(body.contains("$3.99"));
    assert!(body.contains("<del>$4.50</del>"));
    assert!(body.contains("Asha"));
    assert!(body.contains("★★★★★"));
    assert!(body.contains("Add a review"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestApp::start(Scenario::default()).await;

    for path in ["/products/999", "/products/not-a-number"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(resp.text().await.unwrap().contains("Product not found"));
    }
}

#[tokio::test]
async fn test_review_submission() {
    let app = TestApp::start(Scenario::default()).await;

    let resp = app
        .post_form("/products/1/reviews", &[("name", "Asha"), ("rating", "9")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Rating must be between 1 and 5."));
    assert!(body.contains("Email is required."));

    let resp = app
        .post_form(
            "/products/1/reviews",
            &[
                ("name", "Asha"),
                ("email", "asha@example.com"),
                ("rating", "4"),
                ("comment", "Really fresh and well packed."),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Thank you"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_short_password_is_rejected_without_calling_api() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app
        .post_form("/login", &[("email", "a@b.com"), ("password", "short")])
        .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Password must be at least 6 characters."));
    assert!(body.contains(r#"value="a@b.com""#));
    assert_eq!(Hits::get(&app.hits.login), 0);
}

#[tokio::test]
async fn test_rejected_login_shows_server_message() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app
        .post_form(
            "/login",
            &[("email", "ravi@example.com"), ("password", "wrong-password")],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    // The password is never echoed back.
    assert!(!body.contains("wrong-password"));
    assert_eq!(Hits::get(&app.hits.login), 1);
}

#[tokio::test]
async fn test_login_then_account_then_logout() {
    let app = TestApp::start(Scenario::default()).await;

    let resp = app
        .post_form("/login", &[("email", "ravi@example.com"), ("password", "secret-pass")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/account");

    let resp = app.get("/account").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Hello, Ravi"));
    assert!(body.contains("1 Orchard Lane"));

    // Signed-in visitors skip the login page.
    let resp = app.get("/login").await;
    assert_eq!(location(&resp), "/account");

    let resp = app.post_form("/logout", &[]).await;
    assert_eq!(location(&resp), "/login");

    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_expired_token_clears_session() {
    let app = TestApp::start(Scenario {
        profile_expired: true,
        ..Scenario::default()
    })
    .await;

    app.post_form("/login", &[("email", "ravi@example.com"), ("password", "secret-pass")])
        .await;

    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login?error=session_expired");
    assert_eq!(Hits::get(&app.hits.profile), 1);

    // The session is gone: no second profile call.
    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(Hits::get(&app.hits.profile), 1);

    let body = app.get("/login?error=session_expired").await.text().await.unwrap();
    assert!(body.contains("Your session has expired. Please log in again."));
}

async fn assert_profile_reply_ends_session(profile_body: ProfileBody) {
    let app = TestApp::start(Scenario {
        profile_body,
        ..Scenario::default()
    })
    .await;

    app.post_form("/login", &[("email", "ravi@example.com"), ("password", "secret-pass")])
        .await;

    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login?error=session_expired");

    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(Hits::get(&app.hits.profile), 1);
}

#[tokio::test]
async fn test_profile_rejected_in_body_clears_session() {
    assert_profile_reply_ends_session(ProfileBody::RejectedInBody).await;
}

#[tokio::test]
async fn test_profile_without_status_clears_session() {
    assert_profile_reply_ends_session(ProfileBody::MissingStatus).await;
}

#[tokio::test]
async fn test_account_requires_login() {
    let app = TestApp::start(Scenario::default()).await;
    let resp = app.get("/account").await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(Hits::get(&app.hits.profile), 0);
}

#[tokio::test]
async fn test_registration() {
    let app = TestApp::start(Scenario::default()).await;

    let resp = app
        .post_form(
            "/register",
            &[
                ("name", "Mina"),
                ("email", "mina@example.com"),
                ("phone_number", "555-0101"),
                ("address", "2 Orchard Lane"),
                ("password", "secret-pass"),
                ("confirm_password", "different"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Passwords must match."));
    assert_eq!(Hits::get(&app.hits.signup), 0);

    let resp = app
        .post_form(
            "/register",
            &[
                ("name", "Mina"),
                ("email", "taken@example.com"),
                ("phone_number", "555-0101"),
                ("address", "2 Orchard Lane"),
                ("password", "secret-pass"),
                ("confirm_password", "secret-pass"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Email already registered"));

    let resp = app
        .post_form(
            "/register",
            &[
                ("name", "Mina"),
                ("email", "mina@example.com"),
                ("phone_number", "555-0101"),
                ("address", "2 Orchard Lane"),
                ("password", "secret-pass"),
                ("confirm_password", "secret-pass"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/account");
}

// ============================================================================
// Content
// ============================================================================

#[tokio::test]
async fn test_content_pages() {
    let app = TestApp::start(Scenario::default()).await;

    let resp = app.get("/about").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("About Orfarm"));

    let body = app.get("/blog").await.text().await.unwrap();
    assert!(body.contains("Eating with the Seasons"));
    assert!(!body.contains("Summer Harvest Preview"));

    let resp = app.get("/blog/eating-with-the-seasons").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Stocking an Organic Pantry"));

    let resp = app.get("/blog/summer-harvest-preview").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
