//! Shop listing: product grid with a category sidebar and pagination.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use orfarm_core::{Category, CategoryId, CategoryTree, Product};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::{ProductCard, Shell};
use crate::state::AppState;
use crate::ui::ViewState;

/// Products per shop page.
pub const PRODUCTS_PER_PAGE: usize = 12;

const SHOP_ERROR: &str = "Failed to load products.";

/// Shop query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    pub category: Option<i64>,
    pub page: Option<usize>,
}

/// Sidebar category link.
#[derive(Debug, Clone)]
pub struct SidebarEntry {
    pub name: String,
    pub href: String,
    pub depth: usize,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Crumb {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

#[derive(Debug, Clone)]
pub struct ShopView {
    pub cards: Vec<ProductCard>,
    pub total: usize,
    pub pages: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub shell: Shell,
    pub title: String,
    pub breadcrumb: Vec<Crumb>,
    pub sidebar: Vec<SidebarEntry>,
    pub all_active: bool,
    pub state: ViewState<ShopView>,
}

/// One page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number, clamped into range.
    pub page: usize,
    pub pages: usize,
    pub start: usize,
    pub end: usize,
}

impl Pagination {
    /// Paginate `total` items. Out-of-range pages clamp to the nearest page.
    #[must_use]
    pub fn new(total: usize, requested: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(per_page).max(1);
        let page = requested.clamp(1, pages);
        let start = (page - 1) * per_page;
        Self {
            page,
            pages,
            start,
            end: (start + per_page).min(total),
        }
    }
}

fn sidebar(tree: &CategoryTree, active: Option<CategoryId>) -> Vec<SidebarEntry> {
    fn walk(nodes: &[Category], depth: usize, active: Option<CategoryId>, out: &mut Vec<SidebarEntry>) {
        for node in nodes {
            out.push(SidebarEntry {
                name: node.name.clone(),
                href: format!("/category/{}", node.id),
                depth,
                active: active == Some(node.id),
            });
            walk(&node.children, depth + 1, active, out);
        }
    }

    let mut entries = Vec::new();
    walk(tree.roots(), 0, active, &mut entries);
    entries
}

fn shop_href(category: Option<CategoryId>, page: usize) -> String {
    match category {
        Some(id) => format!("/shop?category={id}&page={page}"),
        None => format!("/shop?page={page}"),
    }
}

fn shop_view(
    state: &AppState,
    products: &[Product],
    filter: Option<&[CategoryId]>,
    category: Option<CategoryId>,
    requested_page: usize,
) -> Option<ShopView> {
    let matching: Vec<&Product> = products
        .iter()
        .filter(|p| filter.is_none_or(|ids| p.belongs_to_any(ids)))
        .collect();
    if matching.is_empty() {
        return None;
    }

    let pagination = Pagination::new(matching.len(), requested_page, PRODUCTS_PER_PAGE);
    let cards = matching
        .get(pagination.start..pagination.end)
        .unwrap_or_default()
        .iter()
        .map(|p| ProductCard::new(p, state.images(), state.currency()))
        .collect();

    Some(ShopView {
        cards,
        total: matching.len(),
        pages: (1..=pagination.pages)
            .map(|number| PageLink {
                number,
                href: shop_href(category, number),
                current: number == pagination.page,
            })
            .collect(),
        prev_href: (pagination.page > 1).then(|| shop_href(category, pagination.page - 1)),
        next_href: (pagination.page < pagination.pages)
            .then(|| shop_href(category, pagination.page + 1)),
    })
}

/// Display the shop, optionally filtered to a category and its descendants.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let category = query.category.map(CategoryId::new);
    let (products, tree, shell) = tokio::join!(
        state.api().products(),
        state.api().category_tree(),
        Shell::load(&state, auth.is_some()),
    );

    let tree = tree
        .inspect_err(|e| warn!(error = %e, "Shop sidebar unavailable"))
        .unwrap_or_default();

    // Without the tree the filter still matches the category itself.
    let filter = category.map(|id| {
        let ids = tree.descendant_ids(id);
        if ids.is_empty() { vec![id] } else { ids }
    });

    let (title, breadcrumb) = match category {
        Some(id) => {
            let path = tree.path_to(id).unwrap_or_default();
            let title = path.last().map_or_else(|| "Shop".to_string(), |c| c.name.clone());
            let crumbs = path
                .iter()
                .map(|c| Crumb {
                    name: c.name.clone(),
                    href: format!("/category/{}", c.id),
                })
                .collect();
            (title, crumbs)
        }
        None => ("Shop".to_string(), Vec::new()),
    };

    let page = query.page.unwrap_or(1);
    Ok(ShopTemplate {
        shell,
        title,
        breadcrumb,
        sidebar: sidebar(&tree, category),
        all_active: category.is_none(),
        state: ViewState::from_fetch(products, SHOP_ERROR, |products| {
            shop_view(&state, &products, filter.as_deref(), category, page)
        }),
    })
}

/// `/category/{id}`: the shop filtered to one category subtree.
#[instrument(skip(state, auth))]
pub async fn category(
    State(state): State<AppState>,
    auth: OptionalAuth,
    Path(id): Path<i64>,
) -> Result<ShopTemplate> {
    index(
        State(state),
        auth,
        Query(ShopQuery {
            category: Some(id),
            page: None,
        }),
    )
    .await
}
