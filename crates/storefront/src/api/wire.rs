//! Raw JSON shapes returned by the catalog API.
//!
//! These mirror the backend's field names and laxness (string prices,
//! numeric-or-string ids, missing optional fields). Conversion into the
//! `orfarm_core` domain types lives in `conversions`.

use serde::{Deserialize, Serialize};

use super::ApiError;

/// The `{status, message, data, error}` wrapper used by catalog endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Check the in-body status and take the payload.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] for a non-2xx body status, [`ApiError::Malformed`]
    /// when `data` is absent or a required status is missing.
    pub fn into_data(self, policy: BodyStatus) -> Result<T, ApiError> {
        check_body_status(self.status, policy, self.error.or(self.message))?;
        self.data
            .ok_or_else(|| ApiError::Malformed("response has no data".to_string()))
    }
}

/// Whether an endpoint's JSON body must carry its own `status`.
///
/// The category and product-list endpoints sometimes omit it; product
/// detail, banners and the customer profile always send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStatus {
    Required,
    Optional,
}

/// Reject a body-level status outside 200-299, or a missing one when required.
pub(crate) fn check_body_status(
    status: Option<i64>,
    policy: BodyStatus,
    message: Option<String>,
) -> Result<(), ApiError> {
    match (status, policy) {
        (Some(code), _) if !(200..300).contains(&code) => Err(ApiError::Status {
            status: u16::try_from(code).unwrap_or_default(),
            message,
        }),
        (None, BodyStatus::Required) => {
            Err(ApiError::Malformed("response has no status".to_string()))
        }
        _ => Ok(()),
    }
}

/// Error body sent alongside non-2xx HTTP responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The server-supplied explanation, preferring `error` over `message`.
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Ids arrive as numbers, occasionally as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    pub fn parse(&self) -> Result<i64, ApiError> {
        match self {
            Self::Int(id) => Ok(*id),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| ApiError::Malformed(format!("invalid id {s:?}"))),
        }
    }
}

/// Prices arrive as decimal strings, occasionally as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDecimal {
    Str(String),
    Num(serde_json::Number),
}

impl RawDecimal {
    pub fn as_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => n.to_string(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoriesData {
    #[serde(default)]
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub struct HierarchyData {
    #[serde(default)]
    pub hierarchy: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategory {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<RawCategory>>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    #[serde(alias = "id")]
    pub product_id: RawId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    pub price: RawDecimal,
    #[serde(default)]
    pub sale_price: Option<RawDecimal>,
    #[serde(default)]
    pub base_price: Option<RawDecimal>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub base_stock: Option<i64>,
    pub category_id: RawId,
    #[serde(default)]
    pub subcategory_id: Option<RawId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Option<Vec<String>>,
    #[serde(default)]
    pub variations: Option<Vec<RawVariation>>,
    #[serde(default)]
    pub reviews: Option<Vec<RawReview>>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawVariation {
    pub variation_id: RawId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub price: RawDecimal,
    #[serde(default)]
    pub sale_price: Option<RawDecimal>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawReview {
    pub id: RawId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawBanner {
    pub id: RawId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// Body posted to `/customer/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body posted to `/customer/signup`.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub address: &'a str,
    pub password: &'a str,
}

/// `{token, user_id}` on success, `{error}` on failure.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<RawId>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{status, profile}` from `/customer/profile`.
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub profile: Option<orfarm_core::UserProfile>,
}
