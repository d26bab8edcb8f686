//! Client for the Orfarm catalog and customer REST API.
//!
//! # Architecture
//!
//! - One `reqwest` client with a configurable base URL and timeout
//! - Every JSON body is an envelope (`{status, message, data, error}`);
//!   success needs a 2xx HTTP status and a 2xx body status. Product detail,
//!   banners and the profile must send the body status; the category and
//!   product-list endpoints may omit it
//! - Catalog reads are cached in `moka` for a configurable TTL; failures are
//!   never cached, so the next page request simply tries again
//! - No retry, backoff or circuit breaking
//!
//! # Example
//!
//! ```rust,ignore
//! use orfarm_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let (products, categories) = tokio::join!(client.products(), client.categories());
//! ```

mod cache;
mod conversions;
pub mod wire;

use std::sync::Arc;

use moka::future::Cache;
use orfarm_core::{
    Banner, Category, CategoryTree, CustomerId, Email, Product, ProductId, UserProfile,
};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use cache::{CacheKey, CacheValue};
use wire::{
    AuthResponse, BodyStatus, CategoriesData, Envelope, ErrorBody, HierarchyData, LoginRequest,
    ProductsData, ProfileResponse, RawBanner, RawProduct, SignupRequest,
};

/// Shown when the API could not be reached or answered with garbage.
pub const NETWORK_ERROR_MESSAGE: &str = "A network or server error occurred.";

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or completed (includes timeouts).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status or envelope status.
    #[error("API returned status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// Body was not JSON or lacked the expected payload.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A single requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Message suitable for showing to a shopper.
    ///
    /// Server-supplied messages are passed through verbatim; otherwise
    /// `fallback` is used for rejections and [`NETWORK_ERROR_MESSAGE`] for
    /// transport or decoding failures.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Status { .. } | Self::NotFound(_) => fallback.to_string(),
            Self::Transport(_) | Self::Malformed(_) => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Login credentials that passed form validation.
#[derive(Debug)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// Registration details that passed form validation.
#[derive(Debug)]
pub struct SignupDetails {
    pub name: String,
    pub email: Email,
    pub phone_number: String,
    pub address: String,
    pub password: SecretString,
}

/// Bearer token and customer id returned by login/signup.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: SecretString,
    pub user_id: CustomerId,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the catalog API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode(status, &body)
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        policy: BodyStatus,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.execute(self.inner.client.get(self.url(path))).await?;
        envelope.into_data(policy)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Flat category list from `/category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let data: CategoriesData = self.get_envelope("/category", BodyStatus::Optional).await?;
        let categories = Arc::new(
            data.categories
                .into_iter()
                .map(Category::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        );

        self.remember(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Nested category hierarchy from `/category/all-nested`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response is malformed or
    /// the hierarchy repeats an id.
    #[instrument(skip(self))]
    pub async fn category_tree(&self) -> Result<Arc<CategoryTree>, ApiError> {
        if let Some(CacheValue::CategoryTree(tree)) = self.cached(&CacheKey::CategoryTree).await {
            debug!("Cache hit for category tree");
            return Ok(tree);
        }

        let data: HierarchyData = self.get_envelope("/category/all-nested", BodyStatus::Optional)
            .await?;
        let tree = Arc::new(conversions::category_tree(data.hierarchy)?);
        debug!(roots = tree.roots().len(), depth = tree.depth(), "Fetched category tree");

        self.remember(CacheKey::CategoryTree, CacheValue::CategoryTree(tree.clone()))
            .await;
        Ok(tree)
    }

    /// All products from `/products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let data: ProductsData = self.get_envelope("/products", BodyStatus::Optional).await?;
        let products = Arc::new(
            data.products
                .into_iter()
                .map(Product::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        );

        self.remember(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// A single product from `/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an HTTP 404 or an empty payload.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let raw: RawProduct = match self
            .get_envelope(&format!("/products/{id}"), BodyStatus::Required)
            .await
        {
            Ok(raw) => raw,
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("product {id}")));
            }
            Err(ApiError::Malformed(_)) => {
                return Err(ApiError::NotFound(format!("product {id}")));
            }
            Err(e) => return Err(e),
        };
        let product = Product::try_from(raw)?;

        self.remember(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Hero banners from `/banners`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn banners(&self) -> Result<Arc<Vec<Banner>>, ApiError> {
        if let Some(CacheValue::Banners(banners)) = self.cached(&CacheKey::Banners).await {
            debug!("Cache hit for banners");
            return Ok(banners);
        }

        let raw: Vec<RawBanner> = self.get_envelope("/banners", BodyStatus::Required).await?;
        let banners = Arc::new(
            raw.into_iter()
                .map(Banner::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        );

        self.remember(CacheKey::Banners, CacheValue::Banners(banners.clone()))
            .await;
        Ok(banners)
    }

    // =========================================================================
    // Customer Methods (never cached)
    // =========================================================================

    /// Authenticate with `/customer/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the server's message when the
    /// credentials are rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        let body = LoginRequest {
            email: credentials.email.as_str(),
            password: credentials.password.expose_secret(),
        };
        let response: AuthResponse = self
            .execute(self.inner.client.post(self.url("/customer/login")).json(&body))
            .await?;
        auth_grant(response)
    }

    /// Register with `/customer/signup`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the server's message when the
    /// registration is rejected.
    #[instrument(skip(self, details), fields(email = %details.email))]
    pub async fn signup(&self, details: &SignupDetails) -> Result<AuthGrant, ApiError> {
        let body = SignupRequest {
            name: &details.name,
            email: details.email.as_str(),
            phone_number: &details.phone_number,
            address: &details.address,
            password: details.password.expose_secret(),
        };
        let response: AuthResponse = self
            .execute(self.inner.client.post(self.url("/customer/signup")).json(&body))
            .await?;
        auth_grant(response)
    }

    /// Current customer's profile from `/customer/profile`.
    ///
    /// # Errors
    ///
    /// Any error means the token should be treated as invalid.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &SecretString) -> Result<UserProfile, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/customer/profile"))
            .bearer_auth(token.expose_secret());
        let response: ProfileResponse = self.execute(request).await?;

        wire::check_body_status(
            response.status,
            BodyStatus::Required,
            response.error.or(response.message),
        )?;
        response
            .profile
            .ok_or_else(|| ApiError::Malformed("response has no profile".to_string()))
    }
}

/// Map a non-2xx status to [`ApiError::Status`], else decode the body.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message);
        tracing::warn!(status = %status, message = ?message, "Catalog API returned non-success status");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %String::from_utf8_lossy(body).chars().take(500).collect::<String>(),
            "Failed to parse catalog API response"
        );
        ApiError::Malformed(e.to_string())
    })
}

fn auth_grant(response: AuthResponse) -> Result<AuthGrant, ApiError> {
    let message = response.error.or(response.message);
    wire::check_body_status(response.status, BodyStatus::Optional, message.clone())?;

    let Some(token) = response.token.filter(|t| !t.is_empty()) else {
        // A 2xx answer carrying only an error is still a rejection.
        return Err(match message {
            Some(message) => ApiError::Status {
                status: 200,
                message: Some(message),
            },
            None => ApiError::Malformed("response has no token".to_string()),
        });
    };
    let user_id = response
        .user_id
        .ok_or_else(|| ApiError::Malformed("response has no user_id".to_string()))?
        .parse()?;

    Ok(AuthGrant {
        token: SecretString::from(token),
        user_id: CustomerId::new(user_id),
    })
}
