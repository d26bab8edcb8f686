//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a 1-5 rating as filled and empty stars.
///
/// Usage in templates: `{{ review.rating|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = rating
        .to_string()
        .parse::<f32>()
        .map_or(0, |r| r.round().clamp(0.0, 5.0) as usize);
    Ok(format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)))
}
