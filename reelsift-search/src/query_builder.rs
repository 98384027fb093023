//! Filter state → catalog query

use crate::models::{FilterState, SearchQuery};
use chrono::Datelike;

/// Number of years offered by the year filter
pub const YEAR_CHOICE_COUNT: i32 = 30;

/// Derive the catalog query from the current filters
///
/// Blank title or year and an empty genre set are omitted entirely.
pub fn build_query(filters: &FilterState) -> SearchQuery {
    let genres = if filters.genres.is_empty() {
        None
    } else {
        Some(
            filters
                .genres
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("|"),
        )
    };

    SearchQuery {
        title: non_blank(filters.title.as_deref()),
        year: non_blank(filters.year.as_deref()),
        genres,
    }
}

/// Blank values are dropped; non-blank values are sent as entered
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Years offered by the year filter, newest first
pub fn year_choices(current_year: i32) -> Vec<i32> {
    (0..YEAR_CHOICE_COUNT).map(|i| current_year - i).collect()
}

/// [`year_choices`] anchored at the local clock
pub fn current_year_choices() -> Vec<i32> {
    year_choices(chrono::Local::now().year())
}
