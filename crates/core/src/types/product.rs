//! Catalog products, their variations and customer reviews.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, ReviewId, VariationId};
use super::price::Price;

/// How long after its last update a product is flagged as "hot".
pub const HOT_WINDOW_DAYS: i64 = 7;

/// A purchasable variant of a product (size/colour combination).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub stock: u32,
    pub sku: Option<String>,
}

impl Variation {
    /// Human-readable label such as `"Large / Red"`.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.size.as_deref(), self.color.as_deref()) {
            (Some(size), Some(color)) => format!("{size} / {color}"),
            (Some(one), None) | (None, Some(one)) => one.to_owned(),
            (None, None) => format!("Variant {}", self.id),
        }
    }

    /// Sale price when it undercuts the regular price, otherwise the regular price.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        effective(self.price, self.sale_price)
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_name: String,
    /// Star rating, clamped to 1-5 when decoded.
    pub rating: u8,
    pub comment: String,
    pub date: String,
    pub avatar: Option<String>,
}

/// A product as shown in listings and on the detail page.
///
/// Image fields hold raw API paths; they are normalized at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    /// Overrides `price` when present.
    pub base_price: Option<Price>,
    pub stock: u32,
    /// Overrides `stock` when present.
    pub base_stock: Option<u32>,
    pub category_id: CategoryId,
    pub subcategory_id: Option<CategoryId>,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    pub variations: Vec<Variation>,
    pub reviews: Vec<Review>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The list price, honouring `base_price`.
    #[must_use]
    pub fn list_price(&self) -> Price {
        self.base_price.unwrap_or(self.price)
    }

    /// The price the customer pays: the sale price if it is lower than the
    /// list price, else the list price.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        effective(self.list_price(), self.sale_price)
    }

    /// Whether a lower sale price is in effect.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.effective_price() < self.list_price()
    }

    /// Units available. A zero `base_stock` falls back to `stock`.
    #[must_use]
    pub fn effective_stock(&self) -> u32 {
        self.base_stock.filter(|s| *s > 0).unwrap_or(self.stock)
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.effective_stock() > 0
    }

    /// Mean review rating, or `0.0` without reviews.
    #[must_use]
    pub fn average_rating(&self) -> f32 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)]
        let avg = total as f32 / self.reviews.len() as f32;
        avg
    }

    /// Updated within the last [`HOT_WINDOW_DAYS`] days.
    #[must_use]
    pub fn is_hot(&self, now: DateTime<Utc>) -> bool {
        self.updated_at
            .or(self.created_at)
            .is_some_and(|at| at <= now && now - at <= Duration::days(HOT_WINDOW_DAYS))
    }

    /// Whether the product sits in `category` either directly or through
    /// its subcategory.
    #[must_use]
    pub fn belongs_to_any(&self, categories: &[CategoryId]) -> bool {
        categories.contains(&self.category_id)
            || self
                .subcategory_id
                .is_some_and(|sub| categories.contains(&sub))
    }
}

fn effective(list: Price, sale: Option<Price>) -> Price {
    match sale {
        Some(sale) if sale < list => sale,
        _ => list,
    }
}
