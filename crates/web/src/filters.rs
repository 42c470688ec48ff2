//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders an average rating as filled and hollow stars.
///
/// Rounds to the nearest whole star. Usage: `{{ 4.3|stars }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(render_stars(value.to_string().parse().unwrap_or(0.0)))
}

/// Formats a longitude/latitude value for display.
///
/// Usage: `{{ store.location.lng|coord }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn coord(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let v: f64 = value.to_string().parse().unwrap_or(0.0);
    Ok(format!("{v:.6}"))
}

fn render_stars(rating: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_rounding() {
        assert_eq!(render_stars(4.3), "★★★★☆");
        assert_eq!(render_stars(4.5), "★★★★★");
        assert_eq!(render_stars(0.0), "☆☆☆☆☆");
        assert_eq!(render_stars(5.0), "★★★★★");
        assert_eq!(render_stars(7.2), "★★★★★");
    }
}
