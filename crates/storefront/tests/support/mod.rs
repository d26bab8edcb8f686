//! Test harness: a mock catalog API and a storefront wired to it, both on
//! ephemeral ports.

#![allow(dead_code, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use orfarm_storefront::config::StorefrontConfig;
use orfarm_storefront::state::AppState;
use serde_json::{Value, json};

/// How the mock API misbehaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scenario {
    /// `/category` answers 500.
    pub categories_fail: bool,
    /// `/customer/profile` rejects every token.
    pub profile_expired: bool,
    /// Shape of a successful-looking (HTTP 200) profile reply.
    pub profile_body: ProfileBody,
}

/// Body sent with an HTTP 200 from `/customer/profile`.
#[derive(Debug, Clone, Copy, Default)]
pub enum ProfileBody {
    #[default]
    Valid,
    /// `{"status": 401, ...}` inside a 200 reply.
    RejectedInBody,
    /// The profile without any `status` field.
    MissingStatus,
}

/// Request counters per endpoint.
#[derive(Debug, Default)]
pub struct Hits {
    pub categories: AtomicUsize,
    pub hierarchy: AtomicUsize,
    pub products: AtomicUsize,
    pub banners: AtomicUsize,
    pub login: AtomicUsize,
    pub signup: AtomicUsize,
    pub profile: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    scenario: Scenario,
    hits: Arc<Hits>,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn hierarchy() -> Value {
    json!([
        {"id": 1, "name": "Fruits", "image": "/uploads/fruits.png", "children": [
            {"id": 11, "name": "Citrus", "children": [{"id": 111, "name": "Lemons"}]},
            {"id": 12, "name": "Melons"}
        ]},
        {"id": 2, "name": "Pantry", "image": null}
    ])
}

fn products() -> Value {
    json!([
        {
            "product_id": 1,
            "name": "Organic Lemons",
            "description": "Sharp and juicy.",
            "price": "4.50",
            "sale_price": "3.99",
            "stock_quantity": 20,
            "category_id": 1,
            "subcategory_id": "11",
            "image_url": "/uploads/lemons.jpg",
            "reviews": [
                {"id": 1, "user_name": "Asha", "rating": 5, "comment": "Lovely", "date": "2024-05-01"}
            ]
        },
        {
            "product_id": 2,
            "name": "Rolled Oats",
            "price": 3,
            "stock_quantity": -4,
            "category_id": 2,
            "image_url": null
        }
    ])
}

async fn categories(State(state): State<MockState>) -> Response {
    bump(&state.hits.categories);
    if state.scenario.categories_fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "db down"})))
            .into_response();
    }
    Json(json!({"data": {"categories": [
        {"id": 1, "name": "Fruits", "image": "/uploads/fruits.png"},
        {"id": 2, "name": "Pantry"}
    ]}}))
    .into_response()
}

async fn all_nested(State(state): State<MockState>) -> Json<Value> {
    bump(&state.hits.hierarchy);
    Json(json!({"data": {"hierarchy": hierarchy()}}))
}

async fn product_list(State(state): State<MockState>) -> Json<Value> {
    bump(&state.hits.products);
    Json(json!({"status": 200, "message": "ok", "data": {"products": products()}}))
}

async fn product(axum::extract::Path(id): axum::extract::Path<i64>) -> Response {
    let found = products()
        .as_array()
        .and_then(|all| all.iter().find(|p| p["product_id"] == id).cloned());
    match found {
        Some(product) => Json(json!({"status": 200, "data": product})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Product not found"})))
            .into_response(),
    }
}

async fn banners(State(state): State<MockState>) -> Json<Value> {
    bump(&state.hits.banners);
    Json(json!({"status": 200, "data": [
        {"id": 1, "title": "Fresh <b>Organic</b> Food", "description": "Straight from the farm", "image_url": "banner-1.jpg"},
        {"id": 2, "title": "Seasonal Fruit", "description": "Picked this week", "image_url": null}
    ]}))
}

async fn login(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    bump(&state.hits.login);
    if body["password"] == "wrong-password" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
            .into_response();
    }
    Json(json!({"token": "token-7", "user_id": 7})).into_response()
}

async fn signup(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    bump(&state.hits.signup);
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "Email already registered"})),
        )
            .into_response();
    }
    Json(json!({"token": "token-8", "user_id": "8"})).into_response()
}

async fn profile(State(state): State<MockState>, headers: HeaderMap) -> Response {
    bump(&state.hits.profile);
    let authorized = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h.starts_with("Bearer token-"));
    if state.scenario.profile_expired || !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"})))
            .into_response();
    }
    let profile = json!({
        "customer_id": 7,
        "name": "Ravi Kumar",
        "email": "ravi@example.com",
        "phone_number": "555-0100",
        "address": "1 Orchard Lane"
    });
    let body = match state.scenario.profile_body {
        ProfileBody::Valid => json!({"status": 200, "profile": profile}),
        ProfileBody::RejectedInBody => json!({"status": 401, "error": "Token expired"}),
        ProfileBody::MissingStatus => json!({"profile": profile}),
    };
    Json(body).into_response()
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Start the mock catalog API.
pub async fn start_mock_api(scenario: Scenario) -> (String, Arc<Hits>) {
    let hits = Arc::new(Hits::default());
    let router = Router::new()
        .route("/category", get(categories))
        .route("/category/all-nested", get(all_nested))
        .route("/products", get(product_list))
        .route("/products/{id}", get(product))
        .route("/banners", get(banners))
        .route("/customer/login", post(login))
        .route("/customer/signup", post(signup))
        .route("/customer/profile", get(profile))
        .with_state(MockState {
            scenario,
            hits: hits.clone(),
        });

    let addr = serve(router).await;
    (format!("http://{addr}"), hits)
}

/// Configuration pointing at `api_base_url`.
pub fn test_config(api_base_url: &str) -> StorefrontConfig {
    let content_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
    let content_dir = content_dir.to_string_lossy().into_owned();
    let api_base_url = api_base_url.to_string();

    StorefrontConfig::from_lookup(move |key| match key {
        "STOREFRONT_BASE_URL" => Some("http://127.0.0.1".to_string()),
        "STOREFRONT_API_BASE_URL" => Some(api_base_url.clone()),
        "STOREFRONT_ASSET_BASE_URL" => Some("https://assets.example.com".to_string()),
        "STOREFRONT_AUTH_RATE_LIMIT" => Some("false".to_string()),
        "STOREFRONT_CONTENT_DIR" => Some(content_dir.clone()),
        _ => None,
    })
    .unwrap()
}

/// A running storefront backed by the mock API.
pub struct TestApp {
    pub base_url: String,
    pub hits: Arc<Hits>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn start(scenario: Scenario) -> Self {
        let (api_base_url, hits) = start_mock_api(scenario).await;
        let state = AppState::new(test_config(&api_base_url)).unwrap();
        let addr = serve(orfarm_storefront::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            hits,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client.post(self.url(path)).form(form).send().await.unwrap()
    }
}

/// The `Location` header of a redirect.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
}
