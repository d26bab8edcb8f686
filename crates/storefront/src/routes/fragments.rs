//! HTMX fragments for the lazily loaded and interactive page sections.
//!
//! Every carousel fragment is self-contained: it carries its own index in
//! the control URLs and, when autoplay is on, a polling trigger that asks
//! for the next slide. Replacing the element restarts the timer phase;
//! removing it stops polling.

use std::time::{Duration, Instant};

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use orfarm_core::{Banner, Category, CategoryId, CategoryTree, Product};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::routes::layout::ProductCard;
use crate::state::AppState;
use crate::ui::{Carousel, MegaMenu, Nav, ViewState};

/// Category cards visible at once in the strip.
pub const CATEGORY_STRIP_PER_VIEW: usize = 8;

/// Product cards visible at once in the home page strip.
pub const PRODUCT_STRIP_PER_VIEW: usize = 6;

const HERO_ERROR: &str = "Failed to connect to the banner API. Check server status.";
const CATEGORIES_ERROR: &str = "Failed to load categories.";
const PRODUCTS_ERROR: &str = "Failed to load products.";

/// Query for carousel fragments.
#[derive(Debug, Default, Deserialize)]
pub struct CarouselQuery {
    #[serde(default)]
    pub index: usize,
    pub nav: Option<Nav>,
}

/// Query for the product strip: [`CarouselQuery`] plus the selected tab.
#[derive(Debug, Default, Deserialize)]
pub struct ProductStripQuery {
    pub tab: Option<i64>,
    #[serde(default)]
    pub index: usize,
    pub nav: Option<Nav>,
}

/// Query for the mega-menu panel.
#[derive(Debug, Default, Deserialize)]
pub struct MegaMenuQuery {
    pub active: Option<i64>,
}

/// Control URLs shared by every carousel view.
#[derive(Debug, Clone)]
pub struct CarouselControls {
    pub prev_href: String,
    pub next_href: String,
    /// Polling URL when autoplay is active.
    pub autoplay_href: Option<String>,
    pub autoplay_ms: u128,
    pub visible: bool,
}

impl CarouselControls {
    fn new(carousel: &Carousel, base: &str) -> Self {
        let index = carousel.index();
        Self {
            prev_href: format!("{base}index={index}&nav=prev"),
            next_href: format!("{base}index={index}&nav=next"),
            autoplay_href: carousel
                .autoplay()
                .map(|_| format!("{base}index={index}&nav=auto")),
            autoplay_ms: carousel.autoplay().map_or(0, |interval| interval.as_millis()),
            visible: carousel.controls_visible(),
        }
    }
}

/// Position a carousel from the query and apply the requested move.
fn positioned(
    len: usize,
    index: usize,
    nav: Option<Nav>,
    autoplay: Option<Duration>,
) -> Carousel {
    let now = Instant::now();
    let mut carousel = Carousel::at(len, index, autoplay, now);
    if let Some(nav) = nav {
        carousel.navigate(nav, now);
    }
    carousel
}

// =============================================================================
// Hero Banners
// =============================================================================

#[derive(Debug, Clone)]
pub struct HeroSlide {
    pub subtitle: &'static str,
    /// Banner title; HTML from the catalog.
    pub title_html: String,
    pub description_html: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct DotView {
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct HeroView {
    pub slide: HeroSlide,
    pub dots: Vec<DotView>,
    pub controls: CarouselControls,
}

/// Hero banner carousel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/hero.html")]
pub struct HeroTemplate {
    pub state: ViewState<HeroView>,
}

impl HeroTemplate {
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            state: ViewState::Loading,
        }
    }
}

fn hero_view(state: &AppState, banners: &[Banner], query: &CarouselQuery) -> Option<HeroView> {
    let carousel = positioned(
        banners.len(),
        query.index,
        query.nav,
        Some(state.config().ui.hero_autoplay),
    );
    let banner = banners.get(carousel.index())?;

    Some(HeroView {
        slide: HeroSlide {
            subtitle: Banner::subtitle_for(carousel.index()),
            title_html: banner.title.clone(),
            description_html: banner.description.clone(),
            image: state.images().normalize(banner.image.as_deref()),
        },
        dots: (0..banners.len())
            .map(|i| DotView {
                href: format!("/fragments/hero?index={i}"),
                active: i == carousel.index(),
            })
            .collect(),
        controls: CarouselControls::new(&carousel, "/fragments/hero?"),
    })
}

/// Render the hero carousel.
#[instrument(skip(state))]
pub async fn hero(State(state): State<AppState>, Query(query): Query<CarouselQuery>) -> HeroTemplate {
    let banners = state.api().banners().await;
    HeroTemplate {
        state: ViewState::from_fetch(banners, HERO_ERROR, |banners| {
            hero_view(&state, &banners, &query)
        }),
    }
}

// =============================================================================
// Category Strip
// =============================================================================

#[derive(Debug, Clone)]
pub struct CategoryCard {
    pub name: String,
    pub image: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct CategoryStripView {
    pub cards: Vec<CategoryCard>,
    pub controls: CarouselControls,
}

/// Category strip fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/categories.html")]
pub struct CategoryStripTemplate {
    pub state: ViewState<CategoryStripView>,
}

impl CategoryStripTemplate {
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            state: ViewState::Loading,
        }
    }
}

fn category_strip_view(
    state: &AppState,
    categories: &[Category],
    query: &CarouselQuery,
) -> Option<CategoryStripView> {
    if categories.is_empty() {
        return None;
    }
    let carousel = positioned(
        categories.len(),
        query.index,
        query.nav,
        Some(state.config().ui.strip_autoplay),
    );

    let cards = carousel
        .window(CATEGORY_STRIP_PER_VIEW)
        .into_iter()
        .filter_map(|i| categories.get(i))
        .map(|category| CategoryCard {
            name: category.name.clone(),
            image: state.images().normalize(category.image.as_deref()),
            href: format!("/shop?category={}", category.id),
        })
        .collect();

    Some(CategoryStripView {
        cards,
        controls: CarouselControls::new(&carousel, "/fragments/categories?"),
    })
}

/// Render the category strip.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    Query(query): Query<CarouselQuery>,
) -> CategoryStripTemplate {
    let categories = state.api().categories().await;
    CategoryStripTemplate {
        state: ViewState::from_fetch(categories, CATEGORIES_ERROR, |categories| {
            category_strip_view(&state, &categories, &query)
        }),
    }
}

// =============================================================================
// Product Strip
// =============================================================================

#[derive(Debug, Clone)]
pub struct TabView {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ProductStripView {
    pub tabs: Vec<TabView>,
    pub cards: Vec<ProductCard>,
    pub controls: CarouselControls,
}

/// Tabbed product strip fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/products.html")]
pub struct ProductStripTemplate {
    pub state: ViewState<ProductStripView>,
}

impl ProductStripTemplate {
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            state: ViewState::Loading,
        }
    }
}

fn product_strip_view(
    state: &AppState,
    products: &[Product],
    categories: &[Category],
    query: &ProductStripQuery,
) -> Option<ProductStripView> {
    if products.is_empty() {
        return None;
    }

    // A tab for a category that no longer exists falls back to "All".
    let tab = query
        .tab
        .map(CategoryId::new)
        .filter(|id| categories.iter().any(|c| c.id == *id));

    let mut tabs = vec![TabView {
        label: "All Products".to_string(),
        href: "/fragments/products".to_string(),
        active: tab.is_none(),
    }];
    tabs.extend(categories.iter().map(|c| TabView {
        label: c.name.clone(),
        href: format!("/fragments/products?tab={}", c.id),
        active: tab == Some(c.id),
    }));

    let visible: Vec<&Product> = products
        .iter()
        .filter(|p| tab.is_none_or(|id| p.belongs_to_any(&[id])))
        .collect();

    let carousel = positioned(visible.len(), query.index, query.nav, None);
    let cards = carousel
        .window(PRODUCT_STRIP_PER_VIEW)
        .into_iter()
        .filter_map(|i| visible.get(i))
        .map(|p| ProductCard::new(p, state.images(), state.currency()))
        .collect();

    let base = tab.map_or_else(
        || "/fragments/products?".to_string(),
        |id| format!("/fragments/products?tab={id}&"),
    );

    Some(ProductStripView {
        tabs,
        cards,
        controls: CarouselControls::new(&carousel, &base),
    })
}

/// Render the product strip. Products and categories are fetched
/// concurrently; without categories only the "All Products" tab is shown.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductStripQuery>,
) -> ProductStripTemplate {
    let (products, categories) = tokio::join!(state.api().products(), state.api().categories());

    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Product tabs limited to all products");
        std::sync::Arc::default()
    });

    ProductStripTemplate {
        state: ViewState::from_fetch(products, PRODUCTS_ERROR, |products| {
            product_strip_view(&state, &products, &categories, &query)
        }),
    }
}

// =============================================================================
// Mega-Menu
// =============================================================================

#[derive(Debug, Clone)]
pub struct MegaLink {
    pub name: String,
    pub href: String,
    /// Panel URL with this entry active, for second-level hover.
    pub hover_href: String,
    pub active: bool,
    pub has_children: bool,
}

/// Open mega-menu panel.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/mega_menu.html")]
pub struct MegaPanelTemplate {
    pub top_id: i64,
    pub close_href: String,
    pub grace_ms: u128,
    pub second: Vec<MegaLink>,
    pub third: Vec<MegaLink>,
    pub third_title: Option<String>,
}

/// Closed (empty) mega-menu panel.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/mega_menu_closed.html")]
pub struct MegaPanelClosedTemplate {
    pub top_id: i64,
}

fn link(top: CategoryId, category: &Category, active: bool) -> MegaLink {
    MegaLink {
        name: category.name.clone(),
        href: format!("/category/{}", category.id),
        hover_href: format!("/fragments/menu/{top}?active={}", category.id),
        active,
        has_children: category.has_children(),
    }
}

fn mega_panel(tree: &CategoryTree, menu: &MegaMenu) -> Option<MegaPanelTemplate> {
    let top = menu.open_top()?;
    let second = menu.second_column(tree);
    if second.is_empty() {
        return None;
    }

    let active = menu.active_second();
    let third = menu
        .third_column(tree)
        .unwrap_or_default()
        .iter()
        .map(|c| link(top, c, false))
        .collect();

    Some(MegaPanelTemplate {
        top_id: top.get(),
        close_href: format!("/fragments/menu/{top}/closed"),
        grace_ms: menu.grace().as_millis(),
        second: second
            .iter()
            .map(|c| link(top, c, active == Some(c.id)))
            .collect(),
        third,
        third_title: active
            .and_then(|id| tree.find(id))
            .filter(|c| c.has_children())
            .map(|c| c.name.clone()),
    })
}

/// Mega-menu panel response: open or closed.
pub enum MegaPanel {
    Open(MegaPanelTemplate),
    Closed(MegaPanelClosedTemplate),
}

impl axum::response::IntoResponse for MegaPanel {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Open(panel) => panel.into_response(),
            Self::Closed(panel) => panel.into_response(),
        }
    }
}

/// Open the panel for top-level category `id`, optionally with a
/// second-level entry active.
#[instrument(skip(state))]
pub async fn mega_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<MegaMenuQuery>,
) -> MegaPanel {
    let tree = match state.api().category_tree().await {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "Mega-menu unavailable");
            return MegaPanel::Closed(MegaPanelClosedTemplate { top_id: id });
        }
    };

    let mut menu = MegaMenu::new(state.config().ui.menu_hide_grace);
    menu.enter_top(CategoryId::new(id));
    if let Some(active) = query.active {
        menu.enter_second(&tree, CategoryId::new(active));
    }

    mega_panel(&tree, &menu).map_or(
        MegaPanel::Closed(MegaPanelClosedTemplate { top_id: id }),
        MegaPanel::Open,
    )
}

/// Hide the panel. Requested by the client once the grace delay after the
/// pointer left has elapsed; a re-entry in the meantime replaces the element
/// that would have sent this request.
#[instrument]
pub async fn mega_menu_closed(Path(id): Path<i64>) -> MegaPanelClosedTemplate {
    MegaPanelClosedTemplate { top_id: id }
}
