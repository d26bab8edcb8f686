//! Page shell: header navigation, account link and footer data shared by
//! every full page.

use orfarm_core::Product;
use tracing::warn;

use crate::images::ImageNormalizer;
use crate::state::AppState;
use crate::ui::{MenuItem, MenuLink, build_menu};

/// One header navigation entry, flattened for templates.
#[derive(Debug, Clone)]
pub struct NavEntry {
    pub label: String,
    pub href: String,
    /// Simple dropdown links; empty for plain links and categories.
    pub links: Vec<MenuLink>,
    /// Category id for entries that open the mega-menu.
    pub mega_id: Option<i64>,
}

impl From<MenuItem> for NavEntry {
    fn from(item: MenuItem) -> Self {
        let href = item.href();
        match item {
            MenuItem::Link(link) => Self {
                label: link.label,
                href,
                links: Vec::new(),
                mega_id: None,
            },
            MenuItem::Dropdown { link, items } => Self {
                label: link.label,
                href,
                links: items,
                mega_id: None,
            },
            MenuItem::MegaCategory(category) => Self {
                mega_id: Some(category.id.get()),
                label: category.name,
                href,
                links: Vec::new(),
            },
        }
    }
}

/// Data every full-page template needs.
#[derive(Debug, Clone)]
pub struct Shell {
    pub nav: Vec<NavEntry>,
    pub signed_in: bool,
}

impl Shell {
    /// Build the shell. A failed category fetch leaves only the fixed links.
    pub async fn load(state: &AppState, signed_in: bool) -> Self {
        let tree = match state.api().category_tree().await {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!(error = %e, "Navigation categories unavailable");
                None
            }
        };

        Self {
            nav: build_menu(tree.as_deref())
                .into_iter()
                .map(NavEntry::from)
                .collect(),
            signed_in,
        }
    }
}

// =============================================================================
// Product Cards
// =============================================================================

/// Product summary for grids and strips.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub price: String,
    /// List price when the product is on sale.
    pub was_price: Option<String>,
    pub in_stock: bool,
    pub hot: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, images: &ImageNormalizer, currency: &str) -> Self {
        Self {
            id: product.id.get(),
            name: product.name.clone(),
            image: images.normalize(product.image.as_deref()),
            price: product.effective_price().display_with(currency),
            was_price: product
                .on_sale()
                .then(|| product.list_price().display_with(currency)),
            in_stock: product.in_stock(),
            hot: product.is_hot(chrono::Utc::now()),
        }
    }
}
