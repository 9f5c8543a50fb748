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

/// Renders a rating as a row of star icons.
///
/// Values that aren't integers render no stars.
///
/// The output is markup, so pipe it through `safe`:
/// `{{ review.rating|stars|safe }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = rating.to_string().trim().parse::<i64>().unwrap_or(0);
    Ok(washboard_core::stars(count))
}
