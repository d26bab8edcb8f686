//! `ApiClient` against a live (mock) HTTP server.

#![allow(clippy::unwrap_used)]

mod support;

use std::time::Duration;

use orfarm_core::{CategoryId, Email, ProductId};
use orfarm_storefront::api::{ApiClient, ApiError, Credentials, NETWORK_ERROR_MESSAGE};
use orfarm_storefront::config::ApiConfig;
use secrecy::SecretString;
use support::{Hits, Scenario, start_mock_api};

fn client(base_url: &str, cache_ttl: Duration) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
        cache_ttl,
    })
    .unwrap()
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: Email::parse("ravi@example.com").unwrap(),
        password: SecretString::from(password.to_string()),
    }
}

#[tokio::test]
async fn test_catalog_is_cached() {
    let (base_url, hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::from_secs(60));

    let first = api.products().await.unwrap();
    let second = api.products().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(Hits::get(&hits.products), 1);
}

#[tokio::test]
async fn test_cache_disabled_with_zero_ttl() {
    let (base_url, hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::ZERO);

    api.banners().await.unwrap();
    api.banners().await.unwrap();
    assert_eq!(Hits::get(&hits.banners), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (base_url, hits) = start_mock_api(Scenario {
        categories_fail: true,
        ..Scenario::default()
    })
    .await;
    let api = client(&base_url, Duration::from_secs(60));

    let err = api.categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert!(api.categories().await.is_err());
    assert_eq!(Hits::get(&hits.categories), 2);
}

#[tokio::test]
async fn test_category_tree() {
    let (base_url, _hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::ZERO);

    let tree = api.category_tree().await.unwrap();
    assert_eq!(tree.roots().len(), 2);
    let ids = tree.descendant_ids(CategoryId::new(1));
    assert!(ids.contains(&CategoryId::new(111)));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (base_url, _hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::ZERO);

    let product = api.product(ProductId::new(1)).await.unwrap();
    assert_eq!(product.name, "Organic Lemons");

    let err = api.product(ProductId::new(999)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_login_rejection_message_is_verbatim() {
    let (base_url, _hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::ZERO);

    let err = api.login(&credentials("wrong-password")).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "Invalid email or password");

    let grant = api.login(&credentials("secret-pass")).await.unwrap();
    assert_eq!(grant.user_id.get(), 7);
}

#[tokio::test]
async fn test_profile_with_rejected_token() {
    let (base_url, _hits) = start_mock_api(Scenario::default()).await;
    let api = client(&base_url, Duration::ZERO);

    let err = api
        .profile(&SecretString::from("garbage".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));

    let profile = api
        .profile(&SecretString::from("token-7".to_string()))
        .await
        .unwrap();
    assert_eq!(profile.first_name(), "Ravi");
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}"), Duration::ZERO);
    let err = api.banners().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.user_message("fallback"), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    use axum::{Router, routing::get};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/banners", get(|| async { "<html>maintenance</html>" }));
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let api = client(&format!("http://{addr}"), Duration::ZERO);
    let err = api.banners().await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn test_banners_and_product_require_body_status() {
    use axum::{Json, Router, routing::get};
    use serde_json::json;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new()
        .route("/banners", get(|| async { Json(json!({"data": []})) }))
        .route(
            "/products/{id}",
            get(|| async {
                Json(json!({"data": {"product_id": 1, "name": "Kale", "price": "2.00", "category_id": 1}}))
            }),
        )
        .route("/category", get(|| async { Json(json!({"data": {"categories": []}})) }));
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let api = client(&format!("http://{addr}"), Duration::ZERO);
    assert!(matches!(api.banners().await, Err(ApiError::Malformed(_))));
    assert!(matches!(
        api.product(ProductId::new(1)).await,
        Err(ApiError::NotFound(_))
    ));
    // The category list may omit it.
    assert!(api.categories().await.unwrap().is_empty());
}
