//! Product detail and review submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orfarm_core::{Product, ProductId};
use tracing::{debug, info, instrument};

use crate::api::ApiError;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::{FieldErrors, ReviewForm};
use crate::images::ImageNormalizer;
use crate::middleware::OptionalAuth;
use crate::routes::layout::Shell;
use crate::state::AppState;
use crate::ui::ViewState;

const PRODUCT_NOT_FOUND: &str = "Product not found";

#[derive(Debug, Clone)]
pub struct VariationView {
    pub label: String,
    pub price: String,
    pub sku: Option<String>,
    pub in_stock: bool,
}

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub date: String,
    pub avatar: Option<String>,
}

/// Product display data for the detail page.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub price: String,
    pub was_price: Option<String>,
    pub stock: u32,
    pub in_stock: bool,
    pub hot: bool,
    pub image: String,
    pub gallery: Vec<String>,
    pub variations: Vec<VariationView>,
    pub reviews: Vec<ReviewView>,
    /// Average rating, one decimal.
    pub rating: String,
    pub category_href: String,
}

impl ProductDetail {
    fn new(product: &Product, images: &ImageNormalizer, currency: &str) -> Self {
        Self {
            id: product.id.get(),
            name: product.name.clone(),
            description: product.description.clone(),
            long_description: product.long_description.clone(),
            brand: product.brand.clone(),
            tags: product.tags.clone(),
            price: product.effective_price().display_with(currency),
            was_price: product
                .on_sale()
                .then(|| product.list_price().display_with(currency)),
            stock: product.effective_stock(),
            in_stock: product.in_stock(),
            hot: product.is_hot(chrono::Utc::now()),
            image: images.normalize(product.image.as_deref()),
            gallery: images.normalize_all(&product.gallery),
            variations: product
                .variations
                .iter()
                .map(|v| VariationView {
                    label: v.label(),
                    price: v.effective_price().display_with(currency),
                    sku: v.sku.clone(),
                    in_stock: v.stock > 0,
                })
                .collect(),
            reviews: product
                .reviews
                .iter()
                .map(|r| ReviewView {
                    user_name: r.user_name.clone(),
                    rating: r.rating,
                    comment: r.comment.clone(),
                    date: r.date.clone(),
                    avatar: r.avatar.as_deref().map(|a| images.normalize(Some(a))),
                })
                .collect(),
            rating: format!("{:.1}", product.average_rating()),
            category_href: format!("/category/{}", product.category_id),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub shell: Shell,
    /// The id as requested, echoed on the error view.
    pub requested_id: String,
    pub state: ViewState<ProductDetail>,
    pub review_form_html: String,
}

/// Review form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/review_form.html")]
pub struct ReviewFormTemplate {
    pub action: String,
    pub form: ReviewForm,
    pub errors: FieldErrors,
    pub thanks: bool,
}

impl ReviewFormTemplate {
    fn blank(product_id: &str) -> Self {
        Self {
            action: format!("/products/{product_id}/reviews"),
            form: ReviewForm::default(),
            errors: FieldErrors::default(),
            thanks: false,
        }
    }
}

/// Display a product.
///
/// Unknown or non-numeric ids render the not-found view with a 404 status.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let product = match raw_id.parse::<ProductId>() {
        Ok(id) => state.api().product(id).await,
        Err(_) => Err(ApiError::NotFound(format!("product {raw_id}"))),
    };

    let status = match &product {
        Err(ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };

    let detail = match product {
        Ok(product) => {
            add_breadcrumb("catalog", "Viewed product", Some(&[("product_id", raw_id.as_str())]));
            ViewState::Ready(ProductDetail::new(&product, state.images(), state.currency()))
        }
        Err(e) => {
            tracing::warn!(error = %e, product_id = %raw_id, "Product unavailable");
            ViewState::Error(e.user_message(PRODUCT_NOT_FOUND))
        }
    };

    let page = ProductTemplate {
        shell: Shell::load(&state, auth.is_some()).await,
        review_form_html: ReviewFormTemplate::blank(&raw_id).render()?,
        requested_id: raw_id,
        state: detail,
    };
    Ok((status, page).into_response())
}

/// Validate a review. There is no review endpoint in the catalog API, so a
/// valid review is acknowledged and logged.
#[instrument(skip(form), fields(rating = %form.rating))]
pub async fn submit_review(Path(raw_id): Path<String>, Form(form): Form<ReviewForm>) -> Response {
    let mut template = ReviewFormTemplate::blank(&raw_id);

    match form.validate() {
        Ok(()) => {
            info!(product_id = %raw_id, stars = form.stars(), "Review received");
            add_breadcrumb("catalog", "Submitted review", Some(&[("product_id", raw_id.as_str())]));
            template.thanks = true;
            template.into_response()
        }
        Err(errors) => {
            debug!(fields = ?errors.keys(), "Review form rejected");
            template.form = form;
            template.errors = errors;
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}
