//! Conversions from wire shapes into `orfarm_core` domain types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use orfarm_core::{
    Banner, BannerId, Category, CategoryId, CategoryTree, Price, Product, ProductId, Review,
    ReviewId, Variation, VariationId,
};

use super::ApiError;
use super::wire::{RawBanner, RawCategory, RawDecimal, RawProduct, RawReview, RawVariation};

impl TryFrom<RawCategory> for Category {
    type Error = ApiError;

    fn try_from(raw: RawCategory) -> Result<Self, Self::Error> {
        let children = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .map(Self::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: CategoryId::new(raw.id.parse()?),
            name: raw.name,
            image: raw.image,
            children,
        })
    }
}

/// Convert the nested hierarchy, rejecting repeated ids.
pub fn category_tree(raw: Vec<RawCategory>) -> Result<CategoryTree, ApiError> {
    let roots = raw
        .into_iter()
        .map(Category::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    CategoryTree::new(roots).map_err(|e| ApiError::Malformed(e.to_string()))
}

impl TryFrom<RawProduct> for Product {
    type Error = ApiError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let variations = raw
            .variations
            .unwrap_or_default()
            .into_iter()
            .map(Variation::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let reviews = raw
            .reviews
            .unwrap_or_default()
            .into_iter()
            .map(Review::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let subcategory_id = raw
            .subcategory_id
            .as_ref()
            .map(|id| id.parse().map(CategoryId::new))
            .transpose()?;

        Ok(Self {
            id: ProductId::new(raw.product_id.parse()?),
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            long_description: raw.long_description.unwrap_or_default(),
            price: price(&raw.price)?,
            sale_price: optional_price(raw.sale_price.as_ref())?,
            base_price: optional_price(raw.base_price.as_ref())?,
            stock: stock(raw.stock_quantity),
            base_stock: Some(stock(raw.base_stock)).filter(|s| *s > 0),
            category_id: CategoryId::new(raw.category_id.parse()?),
            subcategory_id,
            image: raw.image_url,
            gallery: raw.gallery_images.unwrap_or_default(),
            variations,
            reviews,
            brand: raw.brand.filter(|b| !b.trim().is_empty()),
            tags: raw.tags.unwrap_or_default(),
            created_at: raw.created_at.as_deref().and_then(timestamp),
            updated_at: raw.updated_at.as_deref().and_then(timestamp),
        })
    }
}

impl TryFrom<RawVariation> for Variation {
    type Error = ApiError;

    fn try_from(raw: RawVariation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VariationId::new(raw.variation_id.parse()?),
            size: raw.size,
            color: raw.color,
            price: price(&raw.price)?,
            sale_price: optional_price(raw.sale_price.as_ref())?,
            stock: stock(raw.stock_quantity),
            sku: raw.sku,
        })
    }
}

impl TryFrom<RawReview> for Review {
    type Error = ApiError;

    fn try_from(raw: RawReview) -> Result<Self, Self::Error> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rating = raw.rating.unwrap_or(0.0).round().clamp(1.0, 5.0) as u8;

        Ok(Self {
            id: ReviewId::new(raw.id.parse()?),
            user_name: raw
                .user_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            rating,
            comment: raw.comment.unwrap_or_default(),
            date: raw.date.unwrap_or_default(),
            avatar: raw.user_avatar,
        })
    }
}

impl TryFrom<RawBanner> for Banner {
    type Error = ApiError;

    fn try_from(raw: RawBanner) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BannerId::new(raw.id.parse()?),
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            image: raw.image_url,
            created_at: raw.created_at.as_deref().and_then(timestamp),
        })
    }
}

// =============================================================================
// Field helpers
// =============================================================================

fn price(raw: &RawDecimal) -> Result<Price, ApiError> {
    Price::parse(&raw.as_text()).map_err(|e| ApiError::Malformed(e.to_string()))
}

/// Empty strings stand for "no sale price".
fn optional_price(raw: Option<&RawDecimal>) -> Result<Option<Price>, ApiError> {
    match raw {
        Some(RawDecimal::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(raw) => price(raw).map(Some),
        None => Ok(None),
    }
}

/// Negative stock is reported by some endpoints for back-orders; treat as none.
fn stock(raw: Option<i64>) -> u32 {
    raw.and_then(|s| u32::try_from(s).ok()).unwrap_or(0)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare dates (all as UTC).
fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
